//! Command module structure for the aitrackdown CLI

use anyhow::Result;
use std::path::{Path, PathBuf};

use trackdown::config::Config;
use trackdown::repository::FileTicketRepository;

pub mod config;
pub mod doctor;
pub mod exchange;
pub mod init;
pub mod search;
pub mod ticket;
pub mod validate;

/// An initialized project: its root directory and merged configuration.
pub struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    pub fn tickets_dir(&self) -> PathBuf {
        self.config.tickets_dir(&self.root)
    }

    pub fn repository(&self) -> FileTicketRepository {
        FileTicketRepository::new(self.tickets_dir())
    }
}

/// Ensure aitrackdown is initialized under `root` and load its configuration.
pub fn ensure_initialized(root: &Path) -> Result<Project> {
    if !root.join(trackdown::paths::CONFIG_FILE).exists() {
        anyhow::bail!(
            "aitrackdown not initialized in {}. Run `aitrackdown init` first.",
            root.display()
        );
    }
    let config = Config::load(root)?;
    tracing::debug!("Loaded config for project '{}'", config.project.name);
    Ok(Project {
        root: root.to_path_buf(),
        config,
    })
}
