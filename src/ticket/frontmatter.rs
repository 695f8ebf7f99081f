//! YAML frontmatter extraction.
//!
//! A ticket file starts with a line holding only `---`, then YAML, then
//! another `---` line. Everything after the closing line is the body and is
//! returned untouched.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::result::{ValidationResult, Violation};

/// How a text splits around its frontmatter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterSplit<'a> {
    /// No leading `---` line.
    Absent,
    /// A leading `---` line with no closing one.
    Unterminated,
    Delimited { yaml: &'a str, body: &'a str },
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Locate the frontmatter block without parsing it. A leading byte order
/// mark is skipped.
pub fn split_frontmatter(content: &str) -> FrontmatterSplit<'_> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let (first_line, yaml_start) = match content.find('\n') {
        Some(end) => (&content[..end], end + 1),
        None => (content, content.len()),
    };

    if !is_delimiter(first_line) {
        return FrontmatterSplit::Absent;
    }

    let mut offset = yaml_start;
    while offset < content.len() {
        let line_end = content[offset..].find('\n').map(|i| offset + i);
        let line = &content[offset..line_end.unwrap_or(content.len())];

        if is_delimiter(line) {
            let body = match line_end {
                Some(end) => &content[end + 1..],
                None => "",
            };
            return FrontmatterSplit::Delimited {
                yaml: &content[yaml_start..offset],
                body,
            };
        }

        match line_end {
            Some(end) => offset = end + 1,
            None => break,
        }
    }

    FrontmatterSplit::Unterminated
}

/// Parse frontmatter YAML into a string-keyed mapping.
///
/// Duplicate keys and non-mapping documents are rejected.
pub fn parse_yaml_mapping(yaml: &str) -> Result<Map<String, Value>, String> {
    if yaml.trim().is_empty() {
        return Ok(Map::new());
    }

    let value: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;
    match value {
        serde_yaml::Value::Null => Ok(Map::new()),
        serde_yaml::Value::Mapping(_) => match serde_json::to_value(&value) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err("frontmatter must be a YAML mapping".to_string()),
            Err(e) => Err(e.to_string()),
        },
        _ => Err("frontmatter must be a YAML mapping".to_string()),
    }
}

/// Serialize a mapping and a body back into the delimited file format.
pub fn render_frontmatter(fields: &Map<String, Value>, body: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(fields).context("Failed to serialize frontmatter")?;
    Ok(format!("---\n{}---\n{}", yaml, body))
}

/// Output of [`FrontmatterParser::parse`].
#[derive(Debug, Clone)]
pub struct ParsedFrontmatter {
    pub fields: Map<String, Value>,
    pub body: String,
    pub result: ValidationResult,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FrontmatterParser {
    require_frontmatter: bool,
}

impl FrontmatterParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat a missing frontmatter block as an error.
    pub fn require_frontmatter(mut self) -> Self {
        self.require_frontmatter = true;
        self
    }

    /// Split and parse `content`. Problems are reported in the result, never raised.
    pub fn parse(&self, content: &str) -> ParsedFrontmatter {
        match split_frontmatter(content) {
            FrontmatterSplit::Absent => {
                let mut result = ValidationResult::new();
                if self.require_frontmatter {
                    result.record(Violation::Parse("no YAML frontmatter found".to_string()));
                }
                ParsedFrontmatter {
                    fields: Map::new(),
                    body: content.to_string(),
                    result,
                }
            }
            FrontmatterSplit::Unterminated => ParsedFrontmatter {
                fields: Map::new(),
                body: content.to_string(),
                result: ValidationResult::from_violation(Violation::Parse(
                    "missing closing '---' delimiter".to_string(),
                )),
            },
            FrontmatterSplit::Delimited { yaml, body } => match parse_yaml_mapping(yaml) {
                Ok(fields) => ParsedFrontmatter {
                    fields,
                    body: body.to_string(),
                    result: ValidationResult::new(),
                },
                Err(msg) => ParsedFrontmatter {
                    fields: Map::new(),
                    body: body.to_string(),
                    result: ValidationResult::from_violation(Violation::Parse(msg)),
                },
            },
        }
    }

    /// Read a file and parse it. Only I/O failures are returned as errors.
    pub fn parse_file(&self, path: &Path) -> Result<ParsedFrontmatter> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(self.parse(&content))
    }
}
