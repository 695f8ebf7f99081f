//! Referential integrity across a batch of tickets.

use anyhow::Result;
use serde_json::Value;
use std::collections::HashSet;

use super::dependency::DependencyGraph;
use crate::result::{ValidationResult, Violation};
use crate::ticket::{Ticket, REFERENCE_FIELDS};

fn ticket_id(ticket: &Value) -> Option<&str> {
    ticket
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// Target IDs held by a reference field, which may be a single ID or a list.
fn references<'a>(ticket: &'a Value, field: &str) -> Vec<&'a str> {
    match ticket.get(field) {
        Some(Value::String(id)) => vec![id.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Check IDs, references and dependency cycles across `tickets`.
///
/// Reports, in order: missing and duplicate IDs, references to tickets not
/// in the batch, then one error per dependency cycle.
pub fn validate_relationships(tickets: &[Value]) -> ValidationResult {
    let mut result = ValidationResult::new();
    let mut ids = HashSet::new();

    for (index, ticket) in tickets.iter().enumerate() {
        match ticket_id(ticket) {
            None => result.record(Violation::MissingId { index }),
            Some(id) => {
                if !ids.insert(id) {
                    result.record(Violation::DuplicateId(id.to_string()));
                }
            }
        }
    }

    for ticket in tickets {
        let Some(source) = ticket_id(ticket) else {
            continue;
        };
        for field in REFERENCE_FIELDS {
            for target in references(ticket, field) {
                if !ids.contains(target) {
                    result.record(Violation::DanglingReference {
                        source: source.to_string(),
                        field: field.to_string(),
                        target: target.to_string(),
                    });
                }
            }
        }
    }

    let graph = DependencyGraph::new(tickets.iter().filter_map(|ticket| {
        let id = ticket_id(ticket)?;
        let deps = references(ticket, "dependencies")
            .into_iter()
            .map(str::to_string)
            .collect();
        Some((id.to_string(), deps))
    }));
    for cycle in graph.detect_cycles() {
        result.record(Violation::DependencyCycle(cycle));
    }

    result
}

/// [`validate_relationships`] over typed tickets.
pub fn validate_ticket_relationships(tickets: &[Ticket]) -> Result<ValidationResult> {
    let values = tickets
        .iter()
        .map(|ticket| ticket.to_fields().map(Value::Object))
        .collect::<Result<Vec<_>>>()?;
    Ok(validate_relationships(&values))
}
