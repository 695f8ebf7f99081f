//! JSON Schema validation of ticket frontmatter.
//!
//! Each ticket type has a draft-07 schema. [`SchemaValidator`] compiles the
//! schema for a type once, checks a ticket's fields against it, then applies
//! the rules a schema cannot express: no self-dependency, `updated_at` not
//! before `created_at`, and warnings for fields the schema does not describe.

mod store;

pub use store::{BundledSchemaStore, DirSchemaStore, SchemaStore};

use anyhow::{anyhow, Result};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use crate::result::{ValidationResult, Violation};
use crate::ticket::{parse_date_or_timestamp, parse_timestamp, Ticket};

struct CompiledSchema {
    validator: jsonschema::Validator,
    /// Top-level keys listed under the schema's `properties`.
    properties: BTreeSet<String>,
}

/// Validates ticket mappings against per-type schemas.
///
/// Compiled schemas are cached, so one validator can be shared across calls
/// and threads.
pub struct SchemaValidator {
    store: Box<dyn SchemaStore + Send + Sync>,
    compiled: Mutex<HashMap<String, Arc<CompiledSchema>>>,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaValidator {
    /// A validator over the bundled schemas.
    pub fn new() -> Self {
        Self::with_store(BundledSchemaStore)
    }

    pub fn with_store(store: impl SchemaStore + Send + Sync + 'static) -> Self {
        Self {
            store: Box::new(store),
            compiled: Mutex::new(HashMap::new()),
        }
    }

    /// Validate `fields` as a ticket of type `ticket_type`.
    ///
    /// Data problems are reported in the returned result. `Err` is reserved
    /// for the schema store failing or a schema that does not compile.
    pub fn validate_ticket(&self, fields: &Value, ticket_type: &str) -> Result<ValidationResult> {
        let Some(schema) = self.compiled(ticket_type)? else {
            return Ok(ValidationResult::from_violation(
                Violation::UnknownTicketType(ticket_type.to_string()),
            ));
        };

        let mut result: ValidationResult = schema
            .validator
            .iter_errors(fields)
            .map(|error| Violation::Schema {
                path: error.instance_path.to_string(),
                message: error.to_string(),
            })
            .collect();

        if let Value::Object(map) = fields {
            check_self_dependency(map, &mut result);
            check_timestamp_order(map, &mut result);

            if !schema.properties.is_empty() {
                for key in map.keys() {
                    if !schema.properties.contains(key) {
                        result.record(Violation::UnknownField(key.clone()));
                    }
                }
            }
        }

        Ok(result)
    }

    /// Validate a typed ticket through its serialized fields.
    pub fn validate_ticket_model(&self, ticket: &Ticket) -> Result<ValidationResult> {
        let fields = Value::Object(ticket.to_fields()?);
        self.validate_ticket(&fields, ticket.ticket_type().as_str())
    }

    /// The values the schema's `status` property allows, if it lists them.
    pub fn status_values(&self, ticket_type: &str) -> Result<Option<Vec<String>>> {
        let Some(document) = self.store.schema(&ticket_type.to_lowercase())? else {
            return Ok(None);
        };
        let values = document
            .pointer("/properties/status/enum")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            });
        Ok(values)
    }

    fn compiled(&self, ticket_type: &str) -> Result<Option<Arc<CompiledSchema>>> {
        let key = ticket_type.to_lowercase();
        let mut cache = self.compiled.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(schema) = cache.get(&key) {
            return Ok(Some(Arc::clone(schema)));
        }

        let Some(document) = self.store.schema(&key)? else {
            return Ok(None);
        };

        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft7)
            .should_validate_formats(true)
            .with_format("date-time", is_date_time)
            .with_format("date-or-date-time", is_date_or_date_time)
            .build(&document)
            .map_err(|e| anyhow!("Failed to compile JSON schema for {}: {}", key, e))?;

        let properties = document
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default();

        tracing::debug!("Compiled schema for {}", key);
        let schema = Arc::new(CompiledSchema {
            validator,
            properties,
        });
        cache.insert(key, Arc::clone(&schema));
        Ok(Some(schema))
    }
}

fn is_date_time(value: &str) -> bool {
    parse_timestamp(value).is_some()
}

fn is_date_or_date_time(value: &str) -> bool {
    parse_date_or_timestamp(value).is_some()
}

fn check_self_dependency(map: &serde_json::Map<String, Value>, result: &mut ValidationResult) {
    let Some(id) = map.get("id").and_then(Value::as_str) else {
        return;
    };
    let depends_on_self = map
        .get("dependencies")
        .and_then(Value::as_array)
        .is_some_and(|deps| deps.iter().any(|dep| dep.as_str() == Some(id)));
    if depends_on_self {
        result.record(Violation::SelfDependency { id: id.to_string() });
    }
}

fn check_timestamp_order(map: &serde_json::Map<String, Value>, result: &mut ValidationResult) {
    let raw = |key: &str| map.get(key).and_then(Value::as_str);
    let (Some(created_raw), Some(updated_raw)) = (raw("created_at"), raw("updated_at")) else {
        return;
    };
    // Unparseable values are already reported by the format check.
    let (Some(created), Some(updated)) = (parse_timestamp(created_raw), parse_timestamp(updated_raw))
    else {
        return;
    };
    if updated < created {
        result.record(Violation::TimestampOrder {
            created_at: created_raw.to_string(),
            updated_at: updated_raw.to_string(),
        });
    }
}
