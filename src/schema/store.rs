use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

use crate::ticket::TicketType;

const TASK_SCHEMA: &str = include_str!("../../schemas/task.json");
const ISSUE_SCHEMA: &str = include_str!("../../schemas/issue.json");
const EPIC_SCHEMA: &str = include_str!("../../schemas/epic.json");
const PR_SCHEMA: &str = include_str!("../../schemas/pr.json");
const PROJECT_SCHEMA: &str = include_str!("../../schemas/project.json");

/// A source of JSON Schema documents, keyed by ticket type name.
pub trait SchemaStore {
    /// Return the schema for `ticket_type`, or `None` when there is none.
    fn schema(&self, ticket_type: &str) -> Result<Option<Value>>;
}

/// The schemas compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledSchemaStore;

impl BundledSchemaStore {
    pub fn raw(ticket_type: TicketType) -> &'static str {
        match ticket_type {
            TicketType::Task => TASK_SCHEMA,
            TicketType::Issue => ISSUE_SCHEMA,
            TicketType::Epic => EPIC_SCHEMA,
            TicketType::Pr => PR_SCHEMA,
            TicketType::Project => PROJECT_SCHEMA,
        }
    }
}

impl SchemaStore for BundledSchemaStore {
    fn schema(&self, ticket_type: &str) -> Result<Option<Value>> {
        let Ok(ticket_type) = ticket_type.parse::<TicketType>() else {
            return Ok(None);
        };
        let schema = serde_json::from_str(Self::raw(ticket_type))
            .with_context(|| format!("Bundled {} schema is not valid JSON", ticket_type))?;
        Ok(Some(schema))
    }
}

/// Schemas read from `<dir>/<type>.json`, falling back to the bundled ones
/// for types the directory does not cover.
#[derive(Debug, Clone)]
pub struct DirSchemaStore {
    dir: PathBuf,
}

impl DirSchemaStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SchemaStore for DirSchemaStore {
    fn schema(&self, ticket_type: &str) -> Result<Option<Value>> {
        if !self.dir.is_dir() {
            anyhow::bail!("Schema directory not found: {}", self.dir.display());
        }

        let path = self.dir.join(format!("{}.json", ticket_type.to_lowercase()));
        if !path.exists() {
            return BundledSchemaStore.schema(ticket_type);
        }

        tracing::debug!("Loading schema {}", path.display());
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
        let schema = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse schema as JSON: {}", path.display()))?;
        Ok(Some(schema))
    }
}
