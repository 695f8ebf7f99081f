//! Typed ticket records.
//!
//! Each ticket type is its own struct sharing a flattened [`TicketBase`].
//! Keys a variant does not know about are kept in its `extra` map so that
//! loading and saving a file never drops data.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The five kinds of record the tracker manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    Task,
    Issue,
    Epic,
    Pr,
    Project,
}

impl TicketType {
    pub const ALL: [TicketType; 5] = [
        TicketType::Task,
        TicketType::Issue,
        TicketType::Epic,
        TicketType::Pr,
        TicketType::Project,
    ];

    /// Canonical ID prefix, e.g. `TSK` for tasks.
    pub fn prefix(self) -> &'static str {
        match self {
            TicketType::Task => "TSK",
            TicketType::Issue => "ISS",
            TicketType::Epic => "EP",
            TicketType::Pr => "PR",
            TicketType::Project => "PROJ",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TicketType::Task => "task",
            TicketType::Issue => "issue",
            TicketType::Epic => "epic",
            TicketType::Pr => "pr",
            TicketType::Project => "project",
        }
    }

    /// Status a freshly created ticket starts in.
    pub fn initial_status(self) -> &'static str {
        match self {
            TicketType::Task | TicketType::Issue => "open",
            TicketType::Epic | TicketType::Project => "planning",
            TicketType::Pr => "draft",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            TicketType::Task => 0,
            TicketType::Issue => 1,
            TicketType::Epic => 2,
            TicketType::Pr => 3,
            TicketType::Project => 4,
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.prefix() == prefix)
    }

    /// Infer the type from an ID's prefix (the text before the first `-`).
    pub fn from_id(id: &str) -> Option<Self> {
        id.split_once('-')
            .and_then(|(prefix, _)| Self::from_prefix(prefix))
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a string names no known ticket type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketTypeError(pub String);

impl fmt::Display for TicketTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown ticket type '{}' (expected task, issue, epic, pr or project)",
            self.0
        )
    }
}

impl std::error::Error for TicketTypeError {}

impl FromStr for TicketType {
    type Err = TicketTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "task" => Ok(TicketType::Task),
            "issue" => Ok(TicketType::Issue),
            "epic" => Ok(TicketType::Epic),
            "pr" => Ok(TicketType::Pr),
            "project" => Ok(TicketType::Project),
            _ => Err(TicketTypeError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Critical => write!(f, "critical"),
        }
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(anyhow!(
                "Invalid priority '{}' (expected low, medium, high or critical)",
                s
            )),
        }
    }
}

/// Parse an RFC 3339 timestamp, or a naive ISO 8601 one taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Parse a `YYYY-MM-DD` date or any timestamp accepted by [`parse_timestamp`].
pub fn parse_date_or_timestamp(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(s).map(|dt| dt.date_naive()))
}

/// A due or target date: a calendar day, or a full timestamp when one was
/// given. Written back in the same form it was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDate {
    Day(NaiveDate),
    At(DateTime<Utc>),
}

impl DueDate {
    pub fn parse(s: &str) -> Option<Self> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(DueDate::Day)
            .or_else(|| parse_timestamp(s).map(DueDate::At))
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            DueDate::Day(day) => *day,
            DueDate::At(at) => at.date_naive(),
        }
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueDate::Day(day) => write!(f, "{}", day.format("%Y-%m-%d")),
            DueDate::At(at) => write!(f, "{}", at.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

/// Render a timestamp the way ticket files store it.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw)))
    }
}

mod optional_date {
    use super::DueDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<DueDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_str(&d.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DueDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => DueDate::parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date '{}'", raw))),
        }
    }
}

/// Fields every ticket type carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketBase {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(
        default,
        with = "optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<DueDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl TicketBase {
    /// A base for a new ticket with both timestamps set to now.
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: status.into(),
            priority: Priority::default(),
            assignees: Vec::new(),
            tags: Vec::new(),
            labels: Vec::new(),
            created_at: now,
            updated_at: now,
            due_date: None,
            dependencies: Vec::new(),
            parent: None,
            metadata: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTicket {
    #[serde(flatten)]
    pub base: TicketBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_hours: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpicTicket {
    #[serde(flatten)]
    pub base: TicketBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_criteria: Option<String>,
    #[serde(
        default,
        with = "optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_date: Option<DueDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_issues: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Bug,
    Feature,
    Enhancement,
    Documentation,
    Question,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueTicket {
    #[serde(flatten)]
    pub base: TicketBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<IssueKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Priority>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_tasks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_prs: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrTicket {
    #[serde(flatten)]
    pub base: TicketBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviewers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub closes_issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_issues: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTicket {
    #[serde(flatten)]
    pub base: TicketBase,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub epics: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team_members: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A ticket of any type.
#[derive(Debug, Clone, PartialEq)]
pub enum Ticket {
    Task(TaskTicket),
    Issue(IssueTicket),
    Epic(EpicTicket),
    Pr(PrTicket),
    Project(ProjectTicket),
}

impl Ticket {
    /// An empty ticket of the given type, in the type's initial status.
    pub fn new(ticket_type: TicketType, id: impl Into<String>, title: impl Into<String>) -> Self {
        let base = TicketBase::new(id, title, ticket_type.initial_status());
        match ticket_type {
            TicketType::Task => Ticket::Task(TaskTicket {
                base,
                estimated_hours: None,
                actual_hours: None,
                extra: BTreeMap::new(),
            }),
            TicketType::Issue => Ticket::Issue(IssueTicket {
                base,
                issue_type: None,
                severity: None,
                child_tasks: Vec::new(),
                related_prs: Vec::new(),
                extra: BTreeMap::new(),
            }),
            TicketType::Epic => Ticket::Epic(EpicTicket {
                base,
                goal: None,
                business_value: None,
                success_criteria: None,
                target_date: None,
                child_issues: Vec::new(),
                extra: BTreeMap::new(),
            }),
            TicketType::Pr => Ticket::Pr(PrTicket {
                base,
                source_branch: None,
                target_branch: None,
                reviewers: Vec::new(),
                closes_issues: Vec::new(),
                related_issues: Vec::new(),
                extra: BTreeMap::new(),
            }),
            TicketType::Project => Ticket::Project(ProjectTicket {
                base,
                epics: Vec::new(),
                team_members: Vec::new(),
                extra: BTreeMap::new(),
            }),
        }
    }

    /// Build a typed ticket from a frontmatter mapping, inferring the type
    /// from the ID prefix.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self> {
        let id = fields
            .get("id")
            .and_then(Value::as_str)
            .context("Ticket has no 'id' field")?;
        let ticket_type = TicketType::from_id(id)
            .ok_or_else(|| anyhow!("Cannot determine ticket type from ID '{}'", id))?;
        Self::from_fields_as(ticket_type, fields)
    }

    pub fn from_fields_as(ticket_type: TicketType, fields: &Map<String, Value>) -> Result<Self> {
        let value = Value::Object(fields.clone());
        let ticket = match ticket_type {
            TicketType::Task => Ticket::Task(serde_json::from_value(value)?),
            TicketType::Issue => Ticket::Issue(serde_json::from_value(value)?),
            TicketType::Epic => Ticket::Epic(serde_json::from_value(value)?),
            TicketType::Pr => Ticket::Pr(serde_json::from_value(value)?),
            TicketType::Project => Ticket::Project(serde_json::from_value(value)?),
        };
        Ok(ticket)
    }

    /// The frontmatter mapping this ticket serializes to.
    pub fn to_fields(&self) -> Result<Map<String, Value>> {
        let value = match self {
            Ticket::Task(t) => serde_json::to_value(t)?,
            Ticket::Issue(t) => serde_json::to_value(t)?,
            Ticket::Epic(t) => serde_json::to_value(t)?,
            Ticket::Pr(t) => serde_json::to_value(t)?,
            Ticket::Project(t) => serde_json::to_value(t)?,
        };
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(anyhow!("Ticket did not serialize to a mapping")),
        }
    }

    pub fn ticket_type(&self) -> TicketType {
        match self {
            Ticket::Task(_) => TicketType::Task,
            Ticket::Issue(_) => TicketType::Issue,
            Ticket::Epic(_) => TicketType::Epic,
            Ticket::Pr(_) => TicketType::Pr,
            Ticket::Project(_) => TicketType::Project,
        }
    }

    pub fn base(&self) -> &TicketBase {
        match self {
            Ticket::Task(t) => &t.base,
            Ticket::Issue(t) => &t.base,
            Ticket::Epic(t) => &t.base,
            Ticket::Pr(t) => &t.base,
            Ticket::Project(t) => &t.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut TicketBase {
        match self {
            Ticket::Task(t) => &mut t.base,
            Ticket::Issue(t) => &mut t.base,
            Ticket::Epic(t) => &mut t.base,
            Ticket::Pr(t) => &mut t.base,
            Ticket::Project(t) => &mut t.base,
        }
    }

    /// Fields present in the file that no variant field describes.
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        match self {
            Ticket::Task(t) => &t.extra,
            Ticket::Issue(t) => &t.extra,
            Ticket::Epic(t) => &t.extra,
            Ticket::Pr(t) => &t.extra,
            Ticket::Project(t) => &t.extra,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn title(&self) -> &str {
        &self.base().title
    }

    pub fn status(&self) -> &str {
        &self.base().status
    }

    /// Mark the ticket as modified now. Never moves `updated_at` before `created_at`.
    pub fn touch(&mut self) {
        let base = self.base_mut();
        base.updated_at = Utc::now().max(base.created_at);
    }
}
