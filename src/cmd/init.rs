//! Initialize aitrackdown in a project directory
//!
//! Creates `.aitrackdown/config.md`, the templates directory and the tickets
//! directory.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use trackdown::config::Config;
use trackdown::paths;
use trackdown::ticket::TicketType;

fn default_project_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "aitrackdown".to_string())
}

pub fn cmd_init(root: &Path, name: Option<String>, force: bool) -> Result<()> {
    let config_path = root.join(paths::CONFIG_FILE);
    if config_path.exists() && !force {
        anyhow::bail!(
            "Already initialized: {} exists (use --force to overwrite)",
            config_path.display()
        );
    }

    let name = name.unwrap_or_else(|| default_project_name(root));
    fs::create_dir_all(root.join(paths::TEMPLATES_DIR))
        .with_context(|| format!("Failed to create {}", paths::TEMPLATES_DIR))?;
    let content = Config::render_default(&name);
    let config = Config::parse(&content)?;
    fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let tickets_dir = config.tickets_dir(root);
    for ticket_type in TicketType::ALL {
        fs::create_dir_all(tickets_dir.join(ticket_type.prefix().to_lowercase()))
            .with_context(|| format!("Failed to create {}", tickets_dir.display()))?;
    }
    tracing::info!("Initialized project '{}' at {}", name, root.display());

    if !crate::ui::is_quiet() {
        println!(
            "{} Initialized aitrackdown project '{}'",
            "Done!".green(),
            name
        );
        println!("  config:  {}", config_path.display());
        println!("  tickets: {}", tickets_dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_layout() {
        let tmp = TempDir::new().unwrap();
        cmd_init(tmp.path(), Some("demo".to_string()), false).unwrap();

        let config = Config::load_from(&tmp.path().join(paths::CONFIG_FILE)).unwrap();
        assert_eq!(config.project.name, "demo");
        assert!(tmp.path().join("tasks/tsk").is_dir());
        assert!(tmp.path().join("tasks/proj").is_dir());
        assert!(tmp.path().join(paths::TEMPLATES_DIR).is_dir());
    }

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        cmd_init(tmp.path(), Some("one".to_string()), false).unwrap();
        let err = cmd_init(tmp.path(), Some("two".to_string()), false).unwrap_err();
        assert!(err.to_string().contains("--force"));

        cmd_init(tmp.path(), Some("two".to_string()), true).unwrap();
        let config = Config::load_from(&tmp.path().join(paths::CONFIG_FILE)).unwrap();
        assert_eq!(config.project.name, "two");
    }

    #[test]
    fn test_default_project_name_is_directory_name() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("my-app");
        fs::create_dir(&dir).unwrap();
        assert_eq!(default_project_name(&dir), "my-app");
    }
}
