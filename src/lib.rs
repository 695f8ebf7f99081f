//! # AI Trackdown - markdown ticket tracking
//!
//! AI Trackdown keeps tasks, issues, epics, pull requests and projects as
//! markdown files with YAML frontmatter, and validates them: per-type JSON
//! schemas, ID formats, status workflows and the relationships between
//! tickets.
//!
//! ## Modules
//!
//! - [`ticket`] - Ticket models, frontmatter parsing and ticket files
//! - [`result`] - The uniform validation result and violation kinds
//! - [`id`] - ID format checks and ID allocation
//! - [`schema`] - JSON Schema validation with semantic rules
//! - [`workflow`] - Per-type status transition graphs
//! - [`domain`] - Dependency graphs and relationship integrity
//! - [`validation`] - File and directory validation
//! - [`repository`] - Ticket storage
//! - [`config`] - Project and global configuration
//! - [`interchange`] - Ticket import and export formats
//! - [`health`] - Project and system health checks
//!
//! ## Example
//!
//! ```no_run
//! use trackdown::schema::SchemaValidator;
//! use trackdown::validation::validate_ticket_file;
//! use std::path::Path;
//!
//! let schemas = SchemaValidator::new();
//! let result = validate_ticket_file(Path::new("tasks/tsk/TSK-0001.md"), &schemas)
//!     .expect("Failed to read ticket");
//! for error in result.errors() {
//!     eprintln!("{}", error);
//! }
//! ```

pub mod config;
pub mod domain;
pub mod health;
pub mod id;
pub mod interchange;
pub mod repository;
pub mod result;
pub mod schema;
pub mod ticket;
pub mod validation;
pub mod workflow;

/// Default path constants for the aitrackdown directory structure.
pub mod paths {
    /// Project metadata directory: `.aitrackdown`
    pub const CONFIG_DIR: &str = ".aitrackdown";
    /// Project config file: `.aitrackdown/config.md`
    pub const CONFIG_FILE: &str = ".aitrackdown/config.md";
    /// Ticket body templates: `.aitrackdown/templates`
    pub const TEMPLATES_DIR: &str = ".aitrackdown/templates";
    /// Tickets directory when the config does not name one
    pub const DEFAULT_TICKETS_DIR: &str = "tasks";
}
