//! Status workflows for each ticket type.
//!
//! A workflow is a directed graph from each status to the statuses it may
//! move to. [`StatusWorkflowValidator`] answers whether a change is legal and
//! [`TransitionBuilder`] applies one to a [`Ticket`].

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::result::{ValidationResult, Violation};
use crate::ticket::{Ticket, TicketType};

/// Status name to the statuses reachable from it in one step.
pub type TransitionGraph = BTreeMap<String, Vec<String>>;

/// What a transition from a status to itself means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfTransitionPolicy {
    /// Accepted as a no-op.
    #[default]
    Allow,
    /// Reported as an illegal transition.
    Reject,
}

const TASK_FLOW: &[(&str, &[&str])] = &[
    ("open", &["in_progress", "blocked", "cancelled"]),
    ("in_progress", &["completed", "blocked", "open", "cancelled"]),
    ("blocked", &["open", "in_progress", "cancelled"]),
    ("completed", &[]),
    ("cancelled", &["open"]),
];

const ISSUE_FLOW: &[(&str, &[&str])] = &[
    ("open", &["in_progress", "blocked", "cancelled"]),
    ("in_progress", &["resolved", "blocked", "open"]),
    ("blocked", &["open", "in_progress", "cancelled"]),
    ("resolved", &["closed", "open"]),
    ("closed", &[]),
    ("cancelled", &[]),
];

const EPIC_FLOW: &[(&str, &[&str])] = &[
    ("planning", &["in_progress", "on_hold", "cancelled"]),
    ("in_progress", &["on_hold", "completed", "cancelled"]),
    ("on_hold", &["planning", "in_progress", "cancelled"]),
    ("completed", &[]),
    ("cancelled", &[]),
];

const PR_FLOW: &[(&str, &[&str])] = &[
    ("draft", &["ready_for_review", "closed"]),
    ("ready_for_review", &["in_review", "draft", "closed"]),
    ("in_review", &["changes_requested", "approved", "closed"]),
    ("changes_requested", &["ready_for_review", "draft", "closed"]),
    ("approved", &["merged", "changes_requested", "closed"]),
    ("merged", &[]),
    ("closed", &["draft"]),
];

const PROJECT_FLOW: &[(&str, &[&str])] = &[
    ("planning", &["active", "cancelled"]),
    ("active", &["on_hold", "completed", "cancelled"]),
    ("on_hold", &["active", "cancelled"]),
    ("completed", &["archived"]),
    ("cancelled", &["archived"]),
    ("archived", &[]),
];

fn builtin_flow(ticket_type: TicketType) -> &'static [(&'static str, &'static [&'static str])] {
    match ticket_type {
        TicketType::Task => TASK_FLOW,
        TicketType::Issue => ISSUE_FLOW,
        TicketType::Epic => EPIC_FLOW,
        TicketType::Pr => PR_FLOW,
        TicketType::Project => PROJECT_FLOW,
    }
}

#[derive(Debug, Clone)]
pub struct StatusWorkflowValidator {
    graphs: BTreeMap<TicketType, TransitionGraph>,
    self_transition: SelfTransitionPolicy,
}

impl Default for StatusWorkflowValidator {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StatusWorkflowValidator {
    /// The built-in workflows with self-transitions allowed.
    pub fn builtin() -> Self {
        let graphs = TicketType::ALL
            .into_iter()
            .map(|ticket_type| {
                let graph = builtin_flow(ticket_type)
                    .iter()
                    .map(|(from, targets)| {
                        (
                            from.to_string(),
                            targets.iter().map(|t| t.to_string()).collect(),
                        )
                    })
                    .collect();
                (ticket_type, graph)
            })
            .collect();

        Self {
            graphs,
            self_transition: SelfTransitionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SelfTransitionPolicy) -> Self {
        self.self_transition = policy;
        self
    }

    /// Replace the graphs of the types named in `overrides`.
    ///
    /// Statuses that only appear as targets become statuses with no outgoing
    /// transitions.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, TransitionGraph>) -> Result<Self> {
        for (type_name, graph) in overrides {
            let Ok(ticket_type) = type_name.parse::<TicketType>() else {
                bail!("Unknown ticket type '{}' in workflow overrides", type_name);
            };
            if graph.is_empty() {
                bail!("Workflow override for {} defines no statuses", ticket_type);
            }

            let mut full = graph.clone();
            for target in graph.values().flatten() {
                full.entry(target.clone()).or_default();
            }
            tracing::debug!("Using custom workflow for {}", ticket_type);
            self.graphs.insert(ticket_type, full);
        }
        Ok(self)
    }

    pub fn policy(&self) -> SelfTransitionPolicy {
        self.self_transition
    }

    pub fn statuses(&self, ticket_type: TicketType) -> Vec<&str> {
        self.graphs
            .get(&ticket_type)
            .map(|graph| graph.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn is_known_status(&self, ticket_type: TicketType, status: &str) -> bool {
        self.graphs
            .get(&ticket_type)
            .is_some_and(|graph| graph.contains_key(status))
    }

    /// Statuses reachable from `from` in one step, if `from` is known.
    pub fn allowed_targets(&self, ticket_type: TicketType, from: &str) -> Option<&[String]> {
        self.graphs
            .get(&ticket_type)
            .and_then(|graph| graph.get(from))
            .map(Vec::as_slice)
    }

    pub fn is_terminal(&self, ticket_type: TicketType, status: &str) -> bool {
        self.allowed_targets(ticket_type, status)
            .is_some_and(|targets| targets.is_empty())
    }

    /// Check a status change for a ticket type given by name.
    pub fn validate_status_transition(
        &self,
        ticket_type: &str,
        from: &str,
        to: &str,
    ) -> ValidationResult {
        let Ok(parsed) = ticket_type.parse::<TicketType>() else {
            return ValidationResult::from_violation(Violation::UnknownTicketType(
                ticket_type.to_string(),
            ));
        };
        match self.check(parsed, from, to) {
            Ok(()) => ValidationResult::new(),
            Err(violation) => ValidationResult::from_violation(violation),
        }
    }

    fn check(&self, ticket_type: TicketType, from: &str, to: &str) -> Result<(), Violation> {
        let unknown = |status: &str| Violation::UnknownStatus {
            ticket_type: ticket_type.to_string(),
            status: status.to_string(),
        };

        let targets = self.allowed_targets(ticket_type, from).ok_or_else(|| unknown(from))?;
        if !self.is_known_status(ticket_type, to) {
            return Err(unknown(to));
        }

        let allowed = if from == to {
            self.self_transition == SelfTransitionPolicy::Allow
        } else {
            targets.iter().any(|t| t == to)
        };

        if allowed {
            Ok(())
        } else {
            Err(Violation::IllegalTransition {
                ticket_type: ticket_type.to_string(),
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }
}

#[derive(Debug)]
pub enum TransitionError {
    InvalidTransition {
        ticket_type: String,
        from: String,
        to: String,
    },
    UnknownStatus {
        ticket_type: String,
        status: String,
    },
    Other(String),
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::InvalidTransition {
                ticket_type,
                from,
                to,
            } => write!(
                f,
                "Invalid transition for {} from {} to {} (use --force to override)",
                ticket_type, from, to
            ),
            TransitionError::UnknownStatus {
                ticket_type,
                status,
            } => write!(f, "Unknown status '{}' for {}", status, ticket_type),
            TransitionError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TransitionError {}

impl From<Violation> for TransitionError {
    fn from(violation: Violation) -> Self {
        match violation {
            Violation::IllegalTransition {
                ticket_type,
                from,
                to,
            } => TransitionError::InvalidTransition {
                ticket_type,
                from,
                to,
            },
            Violation::UnknownStatus {
                ticket_type,
                status,
            } => TransitionError::UnknownStatus {
                ticket_type,
                status,
            },
            other => TransitionError::Other(other.to_string()),
        }
    }
}

/// Builder for validated status changes on a ticket.
pub struct TransitionBuilder<'a> {
    ticket: &'a mut Ticket,
    workflow: &'a StatusWorkflowValidator,
    force: bool,
}

impl<'a> TransitionBuilder<'a> {
    pub fn new(ticket: &'a mut Ticket, workflow: &'a StatusWorkflowValidator) -> Self {
        Self {
            ticket,
            workflow,
            force: false,
        }
    }

    /// Skip the workflow graph. The target must still be a status the type defines.
    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }

    /// Move the ticket to `target`. Returns whether the status changed.
    pub fn to(self, target: &str) -> Result<bool, TransitionError> {
        let ticket_type = self.ticket.ticket_type();
        if !self.workflow.is_known_status(ticket_type, target) {
            return Err(TransitionError::UnknownStatus {
                ticket_type: ticket_type.to_string(),
                status: target.to_string(),
            });
        }

        let current = self.ticket.status().to_string();
        if !self.force {
            self.workflow.check(ticket_type, &current, target)?;
        }

        if current == target {
            return Ok(false);
        }

        tracing::debug!(
            "{}: {} -> {}{}",
            self.ticket.id(),
            current,
            target,
            if self.force { " (forced)" } else { "" }
        );
        self.ticket.base_mut().status = target.to_string();
        self.ticket.touch();
        Ok(true)
    }
}
