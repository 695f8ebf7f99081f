//! Uniform validation result and the violation taxonomy behind it.
//!
//! Every validator in this crate reports data-quality problems by recording
//! [`Violation`]s into a [`ValidationResult`]. Errors make a result invalid;
//! warnings never do.

use serde::Serialize;
use std::fmt;

/// Whether a violation blocks validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single problem found while validating ticket data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Malformed frontmatter or YAML.
    Parse(String),
    /// A JSON Schema rule was broken at `path` (a JSON pointer, empty for the root).
    Schema { path: String, message: String },
    /// Malformed ticket identifier.
    IdFormat { id: String, message: String },
    /// A ticket lists itself in `dependencies`.
    SelfDependency { id: String },
    /// `updated_at` is earlier than `created_at`.
    TimestampOrder { created_at: String, updated_at: String },
    /// No schema or workflow is registered for the ticket type.
    UnknownTicketType(String),
    /// A status that the ticket type does not define.
    UnknownStatus { ticket_type: String, status: String },
    /// A top-level field the schema does not describe.
    UnknownField(String),
    /// A status change that is not an edge of the workflow graph.
    IllegalTransition {
        ticket_type: String,
        from: String,
        to: String,
    },
    /// Two tickets in a batch share an ID.
    DuplicateId(String),
    /// A ticket in a batch carries no usable `id`.
    MissingId { index: usize },
    /// A reference field points at a ticket that is not in the batch.
    DanglingReference {
        source: String,
        field: String,
        target: String,
    },
    /// A closed chain of `dependencies`; the first ID is repeated at the end.
    DependencyCycle(Vec<String>),
}

impl Violation {
    pub fn severity(&self) -> Severity {
        match self {
            Violation::UnknownField(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Short stable name of the violation kind, used in JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Violation::Parse(_) => "parse_error",
            Violation::Schema { .. } => "schema_violation",
            Violation::IdFormat { .. } => "id_format",
            Violation::SelfDependency { .. }
            | Violation::TimestampOrder { .. }
            | Violation::UnknownTicketType(_)
            | Violation::UnknownStatus { .. } => "semantic_violation",
            Violation::UnknownField(_) => "unknown_field",
            Violation::IllegalTransition { .. } => "illegal_transition",
            Violation::DuplicateId(_) | Violation::MissingId { .. } => "duplicate_id",
            Violation::DanglingReference { .. } => "dangling_reference",
            Violation::DependencyCycle(_) => "dependency_cycle",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Parse(msg) => write!(f, "Failed to parse frontmatter: {}", msg),
            Violation::Schema { path, message } if path.is_empty() => write!(f, "{}", message),
            Violation::Schema { path, message } => write!(f, "{}: {}", path, message),
            Violation::IdFormat { id, message } => write!(f, "Invalid ID '{}': {}", id, message),
            Violation::SelfDependency { id } => {
                write!(f, "Ticket {} cannot depend on itself", id)
            }
            Violation::TimestampOrder {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({}) must not be earlier than created_at ({})",
                updated_at, created_at
            ),
            Violation::UnknownTicketType(t) => write!(f, "Unknown ticket type: {}", t),
            Violation::UnknownStatus {
                ticket_type,
                status,
            } => write!(f, "Unknown status '{}' for {}", status, ticket_type),
            Violation::UnknownField(name) => write!(f, "Unknown field '{}'", name),
            Violation::IllegalTransition {
                ticket_type,
                from,
                to,
            } => write!(
                f,
                "Invalid status transition for {}: {} -> {}",
                ticket_type, from, to
            ),
            Violation::DuplicateId(id) => write!(f, "Duplicate ticket ID: {}", id),
            Violation::MissingId { index } => write!(f, "Ticket at position {} has no id", index),
            Violation::DanglingReference {
                source,
                field,
                target,
            } => write!(
                f,
                "{} references missing ticket {} in '{}'",
                source, target, field
            ),
            Violation::DependencyCycle(path) => {
                write!(f, "Circular dependency detected: {}", path.join(" -> "))
            }
        }
    }
}

impl std::error::Error for Violation {}

/// Outcome of a validation call: `valid` is true exactly when `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    /// An empty, valid result.
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// A result holding a single violation.
    pub fn from_violation(violation: Violation) -> Self {
        let mut result = Self::new();
        result.record(violation);
        result
    }

    /// Record a violation as an error or warning according to its severity.
    pub fn record(&mut self, violation: Violation) {
        match violation.severity() {
            Severity::Error => self.add_error(violation.to_string()),
            Severity::Warning => self.add_warning(violation.to_string()),
        }
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.valid = false;
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Append another result's errors and warnings after this one's.
    pub fn merge(&mut self, other: ValidationResult) {
        self.valid = self.valid && other.valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

impl FromIterator<Violation> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        let mut result = Self::new();
        for violation in iter {
            result.record(violation);
        }
        result
    }
}
