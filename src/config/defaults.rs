//! Default values and configuration structs with default implementations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ticket::Priority;
use crate::workflow::{SelfTransitionPolicy, TransitionGraph};

/// Macro to generate default functions for serde attributes
macro_rules! default_fn {
    ($name:ident, $type:ty, $value:expr) => {
        pub(crate) fn $name() -> $type {
            $value
        }
    };
}

default_fn!(default_tickets_dir, String, crate::paths::DEFAULT_TICKETS_DIR.to_string());
default_fn!(default_id_width, usize, 4);

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Where tickets live and how new ones are created.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TicketsConfig {
    /// Tickets directory, relative to the project root (default: tasks)
    #[serde(default = "default_tickets_dir")]
    pub dir: String,
    /// Digits in the numeric part of new IDs (default: 4)
    #[serde(default = "default_id_width")]
    pub id_width: usize,
    #[serde(default)]
    pub default_priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_assignee: Option<String>,
}

impl Default for TicketsConfig {
    fn default() -> Self {
        Self {
            dir: default_tickets_dir(),
            id_width: default_id_width(),
            default_priority: Priority::default(),
            default_assignee: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SchemasConfig {
    /// Directory of `<type>.json` files overriding the bundled schemas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub self_transition: SelfTransitionPolicy,
    /// Per-type replacement graphs, keyed by ticket type name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub transitions: BTreeMap<String, TransitionGraph>,
}
