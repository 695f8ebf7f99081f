//! Validation of ticket files and ticket directories.
//!
//! A ticket file goes through the frontmatter parser, the ID format check and
//! the schema validator; a directory additionally goes through the
//! relationship validator across all of its tickets.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::validate_relationships;
use crate::id::validate_id_format;
use crate::result::{ValidationResult, Violation};
use crate::schema::SchemaValidator;
use crate::ticket::{FrontmatterParser, TicketType};

/// Parsed fields of a ticket document together with their validation result.
#[derive(Debug, Clone)]
pub struct TicketCheck {
    pub fields: Map<String, Value>,
    /// Type inferred from the ID prefix, if the prefix is known.
    pub ticket_type: Option<TicketType>,
    pub result: ValidationResult,
}

/// Parse and validate the text of a ticket file.
pub fn check_ticket_document(content: &str, schemas: &SchemaValidator) -> Result<TicketCheck> {
    let parsed = FrontmatterParser::new().require_frontmatter().parse(content);
    let mut result = parsed.result;
    if !result.is_valid() {
        return Ok(TicketCheck {
            fields: parsed.fields,
            ticket_type: None,
            result,
        });
    }

    let raw_id = parsed.fields.get("id");
    let id = raw_id.and_then(Value::as_str);
    let ticket_type = id.and_then(TicketType::from_id);

    match (id, ticket_type) {
        (None, _) => result.record(match raw_id {
            Some(value) => Violation::Schema {
                path: "/id".to_string(),
                message: format!("{} is not of type \"string\"", value),
            },
            None => Violation::Schema {
                path: String::new(),
                message: "\"id\" is a required property".to_string(),
            },
        }),
        (Some(id), None) => result.record(Violation::IdFormat {
            id: id.to_string(),
            message: "unknown ticket type prefix".to_string(),
        }),
        (Some(id), Some(ticket_type)) => {
            result.merge(validate_id_format(id, ticket_type.as_str()));
            let fields = Value::Object(parsed.fields.clone());
            result.merge(schemas.validate_ticket(&fields, ticket_type.as_str())?);
        }
    }

    Ok(TicketCheck {
        fields: parsed.fields,
        ticket_type,
        result,
    })
}

pub fn validate_ticket_document(content: &str, schemas: &SchemaValidator) -> Result<ValidationResult> {
    Ok(check_ticket_document(content, schemas)?.result)
}

pub fn validate_ticket_file(path: &Path, schemas: &SchemaValidator) -> Result<ValidationResult> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read ticket file {}", path.display()))?;
    validate_ticket_document(&content, schemas)
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub result: ValidationResult,
}

/// Outcome of validating every ticket file under a directory.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryReport {
    pub files: Vec<FileReport>,
    pub relationships: ValidationResult,
}

impl DirectoryReport {
    pub fn is_valid(&self) -> bool {
        self.relationships.is_valid() && self.files.iter().all(|f| f.result.is_valid())
    }

    pub fn error_count(&self) -> usize {
        self.relationships.errors().len()
            + self.files.iter().map(|f| f.result.errors().len()).sum::<usize>()
    }

    pub fn warning_count(&self) -> usize {
        self.relationships.warnings().len()
            + self.files.iter().map(|f| f.result.warnings().len()).sum::<usize>()
    }
}

/// Markdown files anywhere under `dir`, sorted by path.
pub fn ticket_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/**/*.md", glob::Pattern::escape(&dir.to_string_lossy()));
    let mut files = glob::glob(&pattern)
        .with_context(|| format!("Invalid ticket directory pattern: {}", pattern))?
        .collect::<Result<Vec<_>, _>>()?;
    files.sort();
    Ok(files)
}

/// Validate each ticket file under `dir`, then the relationships between
/// all tickets whose frontmatter could be parsed.
pub fn validate_directory(dir: &Path, schemas: &SchemaValidator) -> Result<DirectoryReport> {
    let mut files = Vec::new();
    let mut tickets = Vec::new();

    for path in ticket_files(dir)? {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read ticket file {}", path.display()))?;
        let check = check_ticket_document(&content, schemas)?;
        if !check.fields.is_empty() {
            tickets.push(Value::Object(check.fields));
        }
        tracing::debug!(
            "Validated {}: {} errors",
            path.display(),
            check.result.errors().len()
        );
        files.push(FileReport {
            path,
            result: check.result,
        });
    }

    Ok(DirectoryReport {
        files,
        relationships: validate_relationships(&tickets),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TASK: &str = r#"---
id: TSK-0001
title: "Implement comprehensive validation system"
status: in_progress
priority: high
created_at: 2025-07-11T10:00:00
updated_at: 2025-07-11T11:30:00
estimated_hours: 24.0
---

# Implement Comprehensive Validation System
"#;

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_valid_document() {
        let result = validate_ticket_document(TASK, &SchemaValidator::new()).unwrap();
        assert!(result.is_valid(), "{:?}", result.errors());
    }

    #[test]
    fn test_document_without_frontmatter() {
        let result = validate_ticket_document("# Title\n", &SchemaValidator::new()).unwrap();
        assert_eq!(result.errors().len(), 1);
    }

    #[test]
    fn test_document_with_unknown_prefix() {
        let doc = TASK.replace("TSK-0001", "BUG-0001");
        let result = validate_ticket_document(&doc, &SchemaValidator::new()).unwrap();
        assert_eq!(
            result.errors(),
            &["Invalid ID 'BUG-0001': unknown ticket type prefix".to_string()]
        );
    }

    #[test]
    fn test_document_without_id() {
        let doc = TASK.replace("id: TSK-0001\n", "");
        let result = validate_ticket_document(&doc, &SchemaValidator::new()).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors()[0].contains("\"id\""));
    }

    #[test]
    fn test_document_with_non_string_id() {
        let doc = TASK.replace("id: TSK-0001", "id: 7");
        let result = validate_ticket_document(&doc, &SchemaValidator::new()).unwrap();
        assert_eq!(result.errors(), &["/id: 7 is not of type \"string\"".to_string()]);
    }

    #[test]
    fn test_short_id_reported_by_both_checks() {
        let doc = TASK.replace("TSK-0001", "TSK-01");
        let result = validate_ticket_document(&doc, &SchemaValidator::new()).unwrap();
        assert!(result.errors().iter().any(|e| e.starts_with("Invalid ID 'TSK-01'")));
        assert!(result.errors().iter().any(|e| e.starts_with("/id")));
    }

    #[test]
    fn test_validate_file_missing() {
        let tmp = TempDir::new().unwrap();
        assert!(validate_ticket_file(&tmp.path().join("nope.md"), &SchemaValidator::new()).is_err());
    }

    #[test]
    fn test_validate_directory() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "tsk/TSK-0001.md", TASK);
        write(
            tmp.path(),
            "tsk/TSK-0002.md",
            &TASK
                .replace("TSK-0001", "TSK-0002")
                .replace("estimated_hours: 24.0\n", "dependencies: [TSK-0001, TSK-0404]\n"),
        );
        write(tmp.path(), "notes/README.md", "# not a ticket\n");

        let report = validate_directory(tmp.path(), &SchemaValidator::new()).unwrap();
        assert_eq!(report.files.len(), 3);
        assert!(!report.is_valid());
        assert_eq!(
            report.relationships.errors(),
            &["TSK-0002 references missing ticket TSK-0404 in 'dependencies'".to_string()]
        );

        let readme = report
            .files
            .iter()
            .find(|f| f.path.ends_with("README.md"))
            .unwrap();
        assert!(!readme.result.is_valid());
        assert_eq!(report.error_count(), 2);
    }

    #[test]
    fn test_ticket_files_under_glob_metacharacters() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("team [a]*");
        write(&dir, "tsk/TSK-0001.md", TASK);

        let files = ticket_files(&dir).unwrap();
        assert_eq!(files, vec![dir.join("tsk/TSK-0001.md")]);
    }

    #[test]
    fn test_validate_empty_directory() {
        let tmp = TempDir::new().unwrap();
        let report = validate_directory(tmp.path(), &SchemaValidator::new()).unwrap();
        assert!(report.files.is_empty());
        assert!(report.is_valid());
    }
}
