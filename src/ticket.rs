//! Ticket records, frontmatter handling and ticket files.
//!
//! A ticket lives in a markdown file whose YAML frontmatter holds the
//! structured fields. [`FrontmatterParser`] extracts that block, the typed
//! [`Ticket`] variants give it shape, and [`TicketDocument`] ties a ticket to
//! its body and file.

mod document;
mod frontmatter;
mod model;
mod template;

pub use document::TicketDocument;
pub use frontmatter::{
    parse_yaml_mapping, render_frontmatter, split_frontmatter, FrontmatterParser,
    FrontmatterSplit, ParsedFrontmatter,
};
pub use model::{
    format_timestamp, parse_date_or_timestamp, parse_timestamp, DueDate, EpicTicket, IssueKind,
    IssueTicket, PrTicket, Priority, ProjectTicket, TaskTicket, Ticket, TicketBase, TicketType,
    TicketTypeError,
};
pub use template::render_body;

/// Frontmatter fields that hold references to other tickets.
pub const REFERENCE_FIELDS: [&str; 7] = [
    "parent",
    "dependencies",
    "child_issues",
    "child_tasks",
    "related_prs",
    "closes_issues",
    "epics",
];
