//! Validation logic for configuration values.

use anyhow::Result;

use super::defaults::{TicketsConfig, WorkflowConfig};
use crate::workflow::StatusWorkflowValidator;

impl TicketsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dir.trim().is_empty() {
            anyhow::bail!("tickets.dir must not be empty");
        }
        if !(crate::id::MIN_ID_DIGITS..=10).contains(&self.id_width) {
            anyhow::bail!(
                "tickets.id_width must be between {} and 10, got {}",
                crate::id::MIN_ID_DIGITS,
                self.id_width
            );
        }
        Ok(())
    }
}

impl WorkflowConfig {
    /// Build the workflow validator this configuration describes.
    pub fn validator(&self) -> Result<StatusWorkflowValidator> {
        StatusWorkflowValidator::builtin()
            .with_policy(self.self_transition)
            .with_overrides(&self.transitions)
    }

    pub fn validate(&self) -> Result<()> {
        self.validator().map(|_| ())
    }
}
