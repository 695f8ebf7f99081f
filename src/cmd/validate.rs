//! Validate command: ticket files, relationships, transitions and IDs
//!
//! Every handler returns whether validation passed; the caller turns a
//! failure into a non-zero exit code.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use trackdown::id::validate_id_format;
use trackdown::result::ValidationResult;
use trackdown::schema::SchemaValidator;
use trackdown::validation::{validate_directory, validate_ticket_file, DirectoryReport};
use trackdown::workflow::StatusWorkflowValidator;

use super::{ensure_initialized, Project};
use crate::cli::ValidateCommands;
use crate::ui;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report_result(label: &str, result: &ValidationResult, json: bool) -> Result<bool> {
    if json {
        print_json(result)?;
    } else if !ui::is_quiet() || !result.is_valid() {
        ui::print_result(label, result);
    }
    Ok(result.is_valid())
}

/// The project under `root` if it has been initialized.
fn optional_project(root: &Path) -> Result<Option<Project>> {
    if root.join(trackdown::paths::CONFIG_FILE).exists() {
        ensure_initialized(root).map(Some)
    } else {
        Ok(None)
    }
}

pub fn cmd_validate(root: &Path, command: Option<ValidateCommands>, json: bool) -> Result<bool> {
    match command.unwrap_or(ValidateCommands::All) {
        ValidateCommands::File { path } => validate_file(root, &path, json),
        ValidateCommands::All => validate_all(&ensure_initialized(root)?, json),
        ValidateCommands::Relationships => {
            validate_relationships(&ensure_initialized(root)?, json)
        }
        ValidateCommands::Transition {
            ticket_type,
            from,
            to,
        } => {
            let workflow = match optional_project(root)? {
                Some(project) => project.config.workflow_validator(&project.root)?,
                None => StatusWorkflowValidator::builtin(),
            };
            let result = workflow.validate_status_transition(&ticket_type, &from, &to);
            report_result(&format!("{}: {} -> {}", ticket_type, from, to), &result, json)
        }
        ValidateCommands::Id { id, ticket_type } => {
            let result = validate_id_format(&id, &ticket_type);
            report_result(&id, &result, json)
        }
    }
}

fn validate_file(root: &Path, path: &Path, json: bool) -> Result<bool> {
    let schemas = match optional_project(root)? {
        Some(project) => project.config.schema_validator(&project.root),
        None => SchemaValidator::new(),
    };
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };
    let result = validate_ticket_file(&path, &schemas)?;
    report_result(&path.display().to_string(), &result, json)
}

fn directory_report(project: &Project) -> Result<DirectoryReport> {
    let schemas = project.config.schema_validator(&project.root);
    validate_directory(&project.tickets_dir(), &schemas)
}

fn validate_all(project: &Project, json: bool) -> Result<bool> {
    let report = directory_report(project)?;
    if json {
        print_json(&report)?;
        return Ok(report.is_valid());
    }

    let tickets_dir = project.tickets_dir();
    for file in &report.files {
        if ui::is_quiet() && file.result.is_valid() {
            continue;
        }
        let label = file.path.strip_prefix(&tickets_dir).unwrap_or(&file.path);
        ui::print_result(&label.display().to_string(), &file.result);
    }
    if !ui::is_quiet() || !report.relationships.is_valid() {
        ui::print_result("relationships", &report.relationships);
    }
    if !ui::is_quiet() {
        println!();
        println!("{} ticket file(s) checked", report.files.len());
        ui::print_summary(report.error_count(), report.warning_count());
    }
    Ok(report.is_valid())
}

fn validate_relationships(project: &Project, json: bool) -> Result<bool> {
    let report = directory_report(project)?;
    report_result("relationships", &report.relationships, json)
}
