//! Ticket import and export in JSON, CSV and GitHub issue JSON.
//!
//! Exports are rendered from typed tickets. Imports produce
//! [`ImportRecord`]s; the caller allocates IDs and writes the tickets.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::ticket::{format_timestamp, Priority, Ticket, TicketType};

/// Statuses exported to GitHub as `closed`.
const CLOSED_STATUSES: &[&str] = &[
    "completed",
    "resolved",
    "closed",
    "cancelled",
    "merged",
    "archived",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    GithubJson,
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "github-json" => Ok(ExportFormat::GithubJson),
            _ => bail!(
                "Unsupported export format: {}. Supported formats: json, csv, github-json",
                s
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportSource {
    GithubJson,
    Csv,
}

impl FromStr for ImportSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "github-json" => Ok(ImportSource::GithubJson),
            "csv" => Ok(ImportSource::Csv),
            _ => bail!(
                "Unsupported import source: {}. Supported sources: github-json, csv",
                s
            ),
        }
    }
}

impl fmt::Display for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportSource::GithubJson => write!(f, "github"),
            ImportSource::Csv => write!(f, "csv"),
        }
    }
}

/// One ticket read from an import file, before it has an ID.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRecord {
    pub ticket_type: TicketType,
    pub title: String,
    pub description: String,
    /// `None` means the type's initial status.
    pub status: Option<String>,
    pub priority: Option<Priority>,
    pub tags: Vec<String>,
    pub metadata: BTreeMap<String, Value>,
}

#[derive(Serialize)]
struct ExportRow<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    ticket_type: &'a str,
    title: &'a str,
    description: &'a str,
    status: &'a str,
    priority: &'a str,
    tags: String,
    assignees: String,
    created_at: String,
    updated_at: String,
}

fn export_json(tickets: &[Ticket]) -> Result<String> {
    let items: Vec<Value> = tickets
        .iter()
        .map(|ticket| {
            let base = ticket.base();
            json!({
                "id": base.id,
                "type": ticket.ticket_type().as_str(),
                "title": base.title,
                "description": base.description,
                "status": base.status,
                "priority": base.priority.to_string(),
                "tags": base.tags,
                "assignees": base.assignees,
                "created_at": format_timestamp(&base.created_at),
                "updated_at": format_timestamp(&base.updated_at),
                "metadata": base.metadata,
            })
        })
        .collect();
    Ok(serde_json::to_string_pretty(&items)?)
}

const CSV_HEADER: [&str; 10] = [
    "id",
    "type",
    "title",
    "description",
    "status",
    "priority",
    "tags",
    "assignees",
    "created_at",
    "updated_at",
];

fn export_csv(tickets: &[Ticket]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for ticket in tickets {
        let base = ticket.base();
        let priority = base.priority.to_string();
        writer.serialize(ExportRow {
            id: &base.id,
            ticket_type: ticket.ticket_type().as_str(),
            title: &base.title,
            description: &base.description,
            status: &base.status,
            priority: &priority,
            tags: base.tags.join(", "),
            assignees: base.assignees.join(", "),
            created_at: format_timestamp(&base.created_at),
            updated_at: format_timestamp(&base.updated_at),
        })?;
    }
    let bytes = writer.into_inner().context("Failed to flush CSV output")?;
    Ok(String::from_utf8(bytes)?)
}

/// Issues and pull requests in the shape of GitHub's issues API.
fn export_github_json(tickets: &[Ticket]) -> Result<String> {
    let items: Vec<Value> = tickets
        .iter()
        .filter(|t| matches!(t.ticket_type(), TicketType::Issue | TicketType::Pr))
        .map(|ticket| {
            let base = ticket.base();
            let state = if CLOSED_STATUSES.contains(&base.status.as_str()) {
                "closed"
            } else {
                "open"
            };
            let labels: Vec<Value> = base.tags.iter().map(|tag| json!({ "name": tag })).collect();
            let mut item = json!({
                "title": base.title,
                "body": base.description,
                "state": state,
                "labels": labels,
            });
            if ticket.ticket_type() == TicketType::Pr {
                item["pull_request"] = json!({});
            }
            item
        })
        .collect();
    Ok(serde_json::to_string_pretty(&items)?)
}

/// Render `tickets` in `format`.
pub fn export_tickets(tickets: &[Ticket], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => export_json(tickets),
        ExportFormat::Csv => export_csv(tickets),
        ExportFormat::GithubJson => export_github_json(tickets),
    }
}

/// Parse a GitHub issues export: an array of issues, or a single issue.
///
/// Items with a `pull_request` key become PRs, the rest issues.
pub fn parse_github_json(content: &str) -> Result<Vec<ImportRecord>> {
    let data: Value = serde_json::from_str(content).context("Import file is not valid JSON")?;
    let items = match data {
        Value::Array(items) => items,
        item @ Value::Object(_) => vec![item],
        _ => bail!("GitHub import must be a JSON object or array"),
    };

    items
        .iter()
        .enumerate()
        .map(|(n, item)| {
            let Some(item) = item.as_object() else {
                bail!("Item {} is not a JSON object", n + 1);
            };
            Ok(github_record(item))
        })
        .collect()
}

fn github_record(item: &Map<String, Value>) -> ImportRecord {
    let text = |key: &str| item.get(key).and_then(Value::as_str).unwrap_or_default();
    let ticket_type = if item.contains_key("pull_request") {
        TicketType::Pr
    } else {
        TicketType::Issue
    };
    let tags = item
        .get("labels")
        .and_then(Value::as_array)
        .map(|labels| {
            labels
                .iter()
                .filter_map(|label| match label {
                    Value::String(name) => Some(name.clone()),
                    other => other.get("name").and_then(Value::as_str).map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default();
    let status = (text("state") == "closed").then(|| "closed".to_string());

    let mut metadata = BTreeMap::new();
    for (key, source) in [
        ("github_id", "id"),
        ("github_number", "number"),
        ("github_url", "html_url"),
    ] {
        if let Some(value) = item.get(source).filter(|v| !v.is_null()) {
            metadata.insert(key.to_string(), value.clone());
        }
    }
    metadata.insert("imported_from".to_string(), json!("github"));

    let title = text("title");
    ImportRecord {
        ticket_type,
        title: if title.is_empty() { "Untitled" } else { title }.to_string(),
        description: text("body").to_string(),
        status,
        priority: None,
        tags,
        metadata,
    }
}

/// Parse CSV with a header row. Column names are matched case-insensitively;
/// `title`, `description`, `status`, `priority`, `type` and `tags` are read
/// and the full row is kept under `metadata.original_data`.
pub fn parse_csv(content: &str, default_type: TicketType) -> Result<Vec<ImportRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(str::to_lowercase)
        .collect();

    let mut records = Vec::new();
    for (n, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("Failed to read CSV row {}", n + 1))?;
        let fields: BTreeMap<&str, &str> = headers
            .iter()
            .map(String::as_str)
            .zip(row.iter())
            .collect();
        let field = |name: &str| fields.get(name).copied().filter(|v| !v.is_empty());

        let ticket_type = match field("type") {
            Some(name) => name
                .parse::<TicketType>()
                .with_context(|| format!("CSV row {}", n + 1))?,
            None => default_type,
        };
        let priority = field("priority")
            .map(str::parse::<Priority>)
            .transpose()
            .with_context(|| format!("CSV row {}", n + 1))?;
        let tags = field("tags")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let original: Map<String, Value> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();
        let mut metadata = BTreeMap::new();
        metadata.insert("imported_from".to_string(), json!("csv"));
        metadata.insert("original_data".to_string(), Value::Object(original));

        records.push(ImportRecord {
            ticket_type,
            title: field("title").unwrap_or("Untitled").to_string(),
            description: field("description").unwrap_or_default().to_string(),
            status: field("status").map(str::to_string),
            priority,
            tags,
            metadata,
        });
    }
    Ok(records)
}

/// Parse an import file's content from `source`.
pub fn parse_import(
    source: ImportSource,
    content: &str,
    default_type: TicketType,
) -> Result<Vec<ImportRecord>> {
    match source {
        ImportSource::GithubJson => parse_github_json(content),
        ImportSource::Csv => parse_csv(content, default_type),
    }
}

impl ImportRecord {
    /// Build the ticket this record describes under `id`.
    pub fn into_ticket(self, id: &str) -> Ticket {
        let mut ticket = Ticket::new(self.ticket_type, id, self.title);
        let base = ticket.base_mut();
        base.description = self.description;
        if let Some(status) = self.status {
            base.status = status;
        }
        if let Some(priority) = self.priority {
            base.priority = priority;
        }
        base.tags = self.tags;
        base.metadata = self.metadata;
        ticket
    }
}
