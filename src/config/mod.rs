//! Configuration management for aitrackdown projects.
//!
//! A project is configured by the YAML frontmatter of
//! `.aitrackdown/config.md`. A global config with the same layout is merged
//! underneath it; project values win.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::schema::{DirSchemaStore, SchemaValidator};
use crate::ticket::{split_frontmatter, FrontmatterSplit, Priority, TicketType};
use crate::workflow::{SelfTransitionPolicy, StatusWorkflowValidator, TransitionGraph};

pub mod defaults;
pub mod edit;
pub mod validation;

pub use defaults::*;

/// Environment variable naming an alternative global config file.
pub const GLOBAL_CONFIG_ENV: &str = "AITRACKDOWN_GLOBAL_CONFIG";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub tickets: TicketsConfig,
    #[serde(default)]
    pub schemas: SchemasConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

fn frontmatter_yaml(content: &str) -> Result<&str> {
    match split_frontmatter(content) {
        FrontmatterSplit::Delimited { yaml, .. } => Ok(yaml),
        _ => bail!("Failed to extract frontmatter from config"),
    }
}

impl Config {
    /// Load the merged configuration for the project rooted at `root`.
    pub fn load(root: &Path) -> Result<Self> {
        let config = Self::load_merged_from(
            global_config_path().as_deref(),
            &root.join(crate::paths::CONFIG_FILE),
        )?;
        config.workflow_validator(root)?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(frontmatter_yaml(content)?)
            .context("Failed to parse config frontmatter")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.tickets.validate()?;
        self.workflow.validate()
    }

    /// Load merged configuration from a global and a project config path.
    /// The global file is optional; the project file must exist.
    pub fn load_merged_from(global_path: Option<&Path>, project_path: &Path) -> Result<Self> {
        let global_config = global_path
            .filter(|p| p.exists())
            .map(PartialConfig::load_from)
            .transpose()?
            .unwrap_or_default();

        let project_config = PartialConfig::load_from(project_path)?;

        let config = global_config.merge_with(project_config);
        config.validate()?;
        Ok(config)
    }

    pub fn tickets_dir(&self, root: &Path) -> PathBuf {
        root.join(shellexpand::tilde(&self.tickets.dir).into_owned())
    }

    pub fn templates_dir(&self, root: &Path) -> PathBuf {
        root.join(crate::paths::TEMPLATES_DIR)
    }

    /// A schema validator reading from `schemas.dir` when it is set.
    pub fn schema_validator(&self, root: &Path) -> SchemaValidator {
        match &self.schemas.dir {
            Some(dir) => SchemaValidator::with_store(DirSchemaStore::new(
                root.join(shellexpand::tilde(dir).into_owned()),
            )),
            None => SchemaValidator::new(),
        }
    }

    /// The configured workflows, checked against the schemas in effect
    /// under `root`. A custom workflow may only use statuses its type's
    /// schema accepts.
    pub fn workflow_validator(&self, root: &Path) -> Result<StatusWorkflowValidator> {
        let workflow = self.workflow.validator()?;
        if self.workflow.transitions.is_empty() {
            return Ok(workflow);
        }

        let schemas = self.schema_validator(root);
        for type_name in self.workflow.transitions.keys() {
            let ticket_type = type_name.parse::<TicketType>().map_err(|e| anyhow!("{}", e))?;
            let Some(allowed) = schemas.status_values(ticket_type.as_str())? else {
                continue;
            };
            for status in workflow.statuses(ticket_type) {
                if !allowed.iter().any(|s| s == status) {
                    bail!(
                        "Workflow for {} uses status '{}', which the {} schema does not allow (allowed: {})",
                        ticket_type,
                        status,
                        ticket_type,
                        allowed.join(", ")
                    );
                }
            }
        }
        Ok(workflow)
    }

    /// Look up a dotted key such as `tickets.dir`.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut value = serde_json::to_value(self)?;
        for part in key.split('.') {
            match value.get_mut(part) {
                Some(next) => value = next.take(),
                None => return Ok(None),
            }
        }
        Ok(Some(value))
    }

    /// Every leaf value keyed by its dotted path, in key order.
    pub fn entries(&self) -> Result<Vec<(String, Value)>> {
        fn walk(prefix: &str, value: Value, out: &mut Vec<(String, Value)>) {
            match value {
                Value::Object(map) if !map.is_empty() => {
                    for (key, inner) in map {
                        let path = if prefix.is_empty() {
                            key
                        } else {
                            format!("{}.{}", prefix, key)
                        };
                        walk(&path, inner, out);
                    }
                }
                leaf => out.push((prefix.to_string(), leaf)),
            }
        }

        let mut out = Vec::new();
        walk("", serde_json::to_value(self)?, &mut out);
        Ok(out)
    }

    /// The config file written by `aitrackdown init`.
    pub fn render_default(project_name: &str) -> String {
        format!(
            r#"---
project:
  name: {name}

tickets:
  dir: {dir}
  id_width: 4
  default_priority: medium

workflow:
  self_transition: allow
---

# AI Trackdown Configuration

Ticket files live under `{dir}/<prefix>/<ID>.md`.

Set `schemas.dir` to a directory of `<type>.json` files to replace the
bundled ticket schemas, and `workflow.transitions.<type>` to replace a
ticket type's status workflow.
"#,
            name = serde_json::to_string(project_name).unwrap_or_default(),
            dir = crate::paths::DEFAULT_TICKETS_DIR
        )
    }
}

/// Returns the path to the global config file: `$AITRACKDOWN_GLOBAL_CONFIG`
/// if set, otherwise `<config_dir>/aitrackdown/config.md`.
pub fn global_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(GLOBAL_CONFIG_ENV) {
        return Some(PathBuf::from(shellexpand::tilde(&path).into_owned()));
    }
    dirs::config_dir().map(|p| p.join("aitrackdown").join("config.md"))
}

/// Partial config for merging - all fields optional
#[derive(Debug, Deserialize, Default)]
struct PartialConfig {
    pub project: Option<PartialProjectConfig>,
    pub tickets: Option<PartialTicketsConfig>,
    pub schemas: Option<SchemasConfig>,
    pub workflow: Option<PartialWorkflowConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct PartialProjectConfig {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct PartialTicketsConfig {
    pub dir: Option<String>,
    pub id_width: Option<usize>,
    pub default_priority: Option<Priority>,
    pub default_assignee: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct PartialWorkflowConfig {
    pub self_transition: Option<SelfTransitionPolicy>,
    pub transitions: Option<BTreeMap<String, TransitionGraph>>,
}

impl PartialConfig {
    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(frontmatter_yaml(content)?)
            .context("Failed to parse config frontmatter")
    }

    /// Merge this global config with a project config.
    /// Values from the project config take precedence over global.
    fn merge_with(self, project: PartialConfig) -> Config {
        let global_project = self.project.unwrap_or_default();
        let global_tickets = self.tickets.unwrap_or_default();
        let global_workflow = self.workflow.unwrap_or_default();
        let project_project = project.project.unwrap_or_default();
        let project_tickets = project.tickets.unwrap_or_default();
        let project_workflow = project.workflow.unwrap_or_default();

        // Per-type workflow graphs: project replaces global type by type
        let mut transitions = global_workflow.transitions.unwrap_or_default();
        transitions.extend(project_workflow.transitions.unwrap_or_default());

        Config {
            project: ProjectConfig {
                name: project_project
                    .name
                    .or(global_project.name)
                    .unwrap_or_default(),
                description: project_project.description.or(global_project.description),
            },
            tickets: TicketsConfig {
                dir: project_tickets
                    .dir
                    .or(global_tickets.dir)
                    .unwrap_or_else(default_tickets_dir),
                id_width: project_tickets
                    .id_width
                    .or(global_tickets.id_width)
                    .unwrap_or_else(default_id_width),
                default_priority: project_tickets
                    .default_priority
                    .or(global_tickets.default_priority)
                    .unwrap_or_default(),
                default_assignee: project_tickets
                    .default_assignee
                    .or(global_tickets.default_assignee),
            },
            schemas: project.schemas.or(self.schemas).unwrap_or_default(),
            workflow: WorkflowConfig {
                self_transition: project_workflow
                    .self_transition
                    .or(global_workflow.self_transition)
                    .unwrap_or_default(),
                transitions,
            },
        }
    }
}

#[cfg(test)]
mod tests;
