//! Diagnostics: info, health and doctor

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use trackdown::config::{global_config_path, Config};
use trackdown::health::{
    all_passed, git_status, project_checks, system_checks, ticket_file_count, Check, CheckStatus,
};

use crate::ui::colors;

fn print_check(check: &Check) {
    let icon = match check.status {
        CheckStatus::Pass => "✓".green(),
        CheckStatus::Warn => "⚠".yellow(),
        CheckStatus::Fail => "✗".red(),
    };
    println!("  {} {}: {}", icon, check.name, check.message);
}

fn print_section(title: &str, checks: &[Check]) {
    println!("{}", colors::heading(title));
    for check in checks {
        print_check(check);
    }
}

fn is_initialized(root: &Path) -> bool {
    root.join(trackdown::paths::CONFIG_FILE).exists()
}

/// Installation checks only. Returns false if any check failed.
pub fn cmd_health() -> Result<bool> {
    let checks = system_checks();
    print_section("System", &checks);

    let passed = all_passed(&checks);
    println!();
    if passed {
        println!("{} aitrackdown is healthy", "✓".green());
    } else {
        println!("{} aitrackdown has problems", "✗".red());
    }
    Ok(passed)
}

/// Installation, project, configuration and git checks. Returns false if any
/// check failed.
pub fn cmd_doctor(root: &Path) -> Result<bool> {
    let mut passed = true;

    let system = system_checks();
    passed &= all_passed(&system);
    print_section("System", &system);
    println!();

    if is_initialized(root) {
        let project = project_checks(root);
        passed &= all_passed(&project);
        print_section("Project", &project);
    } else {
        println!("{}", colors::heading("Project"));
        println!(
            "  {} No aitrackdown project found in {}",
            "⚠".yellow(),
            root.display()
        );
    }
    println!();

    println!("{}", colors::heading("Configuration"));
    println!(
        "  Project config: {}",
        root.join(trackdown::paths::CONFIG_FILE).display()
    );
    match global_config_path() {
        Some(path) => println!(
            "  Global config: {}{}",
            path.display(),
            if path.exists() { "" } else { " (not present)" }
        ),
        None => println!("  Global config: none"),
    }
    println!();

    println!("{}", colors::heading("Git"));
    match git_status(root) {
        Some(git) => {
            println!("  Branch: {}", git.branch);
            println!("  Modified files: {}", git.changed_files);
        }
        None => println!("  Not a git repository"),
    }

    println!();
    if passed {
        println!("{} No problems found", "✓".green());
    } else {
        println!("{} Problems found", "✗".red());
    }
    Ok(passed)
}

pub fn cmd_info(root: &Path) -> Result<()> {
    println!("aitrackdown {}", env!("CARGO_PKG_VERSION"));
    println!(
        "Platform: {} {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    println!("Working directory: {}", root.display());
    println!(
        "Git repository: {}",
        if git_status(root).is_some() { "yes" } else { "no" }
    );
    match global_config_path() {
        Some(path) => println!("Global config: {}", path.display()),
        None => println!("Global config: none"),
    }

    if !is_initialized(root) {
        println!("Project: not initialized");
        return Ok(());
    }

    println!(
        "Project config: {}",
        root.join(trackdown::paths::CONFIG_FILE).display()
    );
    match Config::load(root) {
        Ok(config) => {
            let tickets_dir = config.tickets_dir(root);
            println!("Project: {}", config.project.name);
            println!(
                "Tickets: {} ({} file(s))",
                tickets_dir.display(),
                ticket_file_count(&tickets_dir)
            );
            println!("Templates: {}", config.templates_dir(root).display());
            match &config.schemas.dir {
                Some(dir) => println!("Schemas: {}", root.join(dir).display()),
                None => println!("Schemas: bundled"),
            }
        }
        Err(e) => println!("Project: config error: {:#}", e),
    }
    Ok(())
}
