//! Health checks behind the `health` and `doctor` commands.

use serde_json::json;
use std::path::Path;
use std::process::Command;

use crate::config::{global_config_path, Config};
use crate::schema::SchemaValidator;
use crate::ticket::TicketType;
use crate::validation::{ticket_files, validate_directory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    /// Worth fixing, but does not fail the run.
    Warn,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub name: &'static str,
    pub status: CheckStatus,
    pub message: String,
}

impl Check {
    fn pass(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Pass,
            message: message.into(),
        }
    }

    fn warn(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Warn,
            message: message.into(),
        }
    }

    fn fail(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Fail,
            message: message.into(),
        }
    }
}

/// True when no check failed. Warnings do not count.
pub fn all_passed(checks: &[Check]) -> bool {
    checks.iter().all(|c| c.status != CheckStatus::Fail)
}

/// Every schema in `schemas` compiles.
fn schema_check(schemas: &SchemaValidator) -> Check {
    for ticket_type in TicketType::ALL {
        if let Err(e) = schemas.validate_ticket(&json!({}), ticket_type.as_str()) {
            return Check::fail("Schemas", format!("{:#}", e));
        }
    }
    Check::pass("Schemas", format!("{} ticket schemas compile", TicketType::ALL.len()))
}

/// Checks that do not need a project: bundled schemas, the global config and git.
pub fn system_checks() -> Vec<Check> {
    let mut checks = vec![schema_check(&SchemaValidator::new())];

    checks.push(match global_config_path() {
        Some(path) if path.exists() => match Config::load_from(&path) {
            Ok(_) => Check::pass("Global config", path.display().to_string()),
            Err(e) => Check::fail("Global config", format!("{}: {:#}", path.display(), e)),
        },
        Some(path) => Check::pass("Global config", format!("none at {}", path.display())),
        None => Check::pass("Global config", "no config directory on this platform"),
    });

    checks.push(match git_output(Path::new("."), &["--version"]) {
        Some(version) => Check::pass("Git", version),
        None => Check::warn("Git", "git not found in PATH"),
    });

    checks
}

/// Checks for the project rooted at `root`.
pub fn project_checks(root: &Path) -> Vec<Check> {
    let config = match Config::load(root) {
        Ok(config) => config,
        Err(e) => return vec![Check::fail("Config", format!("{:#}", e))],
    };
    let mut checks = vec![Check::pass(
        "Config",
        root.join(crate::paths::CONFIG_FILE).display().to_string(),
    )];

    let templates = config.templates_dir(root);
    checks.push(if templates.is_dir() {
        Check::pass("Templates", templates.display().to_string())
    } else {
        Check::warn("Templates", format!("{} is missing", templates.display()))
    });

    let schemas = config.schema_validator(root);
    checks.push(schema_check(&schemas));

    let tickets_dir = config.tickets_dir(root);
    if !tickets_dir.is_dir() {
        checks.push(Check::fail(
            "Tickets",
            format!("{} does not exist", tickets_dir.display()),
        ));
        return checks;
    }

    checks.push(match validate_directory(&tickets_dir, &schemas) {
        Ok(report) if report.is_valid() && report.warning_count() == 0 => {
            Check::pass("Tickets", format!("{} ticket file(s) valid", report.files.len()))
        }
        Ok(report) if report.is_valid() => Check::warn(
            "Tickets",
            format!(
                "{} ticket file(s) valid, {} warning(s)",
                report.files.len(),
                report.warning_count()
            ),
        ),
        Ok(report) => {
            let failing = report.files.iter().filter(|f| !f.result.is_valid()).count();
            Check::fail(
                "Tickets",
                format!(
                    "{} error(s): {} invalid file(s), relationships {}",
                    report.error_count(),
                    failing,
                    if report.relationships.is_valid() {
                        "ok"
                    } else {
                        "broken"
                    }
                ),
            )
        }
        Err(e) => Check::fail("Tickets", format!("{:#}", e)),
    });

    checks
}

/// Run git in `dir` and return its trimmed stdout, or `None` if it failed.
pub fn git_output(dir: &Path, args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}

/// Branch and count of changed files, when `dir` is inside a git work tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitStatus {
    pub branch: String,
    pub changed_files: usize,
}

pub fn git_status(dir: &Path) -> Option<GitStatus> {
    let inside = git_output(dir, &["rev-parse", "--is-inside-work-tree"])?;
    if inside != "true" {
        return None;
    }
    let branch = git_output(dir, &["rev-parse", "--abbrev-ref", "HEAD"])
        .unwrap_or_else(|| "unknown".to_string());
    let changed_files = git_output(dir, &["status", "--porcelain"])
        .map(|out| out.lines().filter(|l| !l.is_empty()).count())
        .unwrap_or(0);
    Some(GitStatus {
        branch,
        changed_files,
    })
}

/// Number of markdown files under the tickets directory.
pub fn ticket_file_count(dir: &Path) -> usize {
    ticket_files(dir).map(|files| files.len()).unwrap_or(0)
}
