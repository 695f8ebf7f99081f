//! Search command handler for searching tickets by title, description and tags

use anyhow::Result;

use trackdown::repository::{search_tickets, TicketFilter};

use super::ticket::{parse_ticket_type, print_tickets};
use super::Project;

pub fn cmd_search(
    project: &Project,
    query: &str,
    ticket_type: Option<&str>,
    status: Option<String>,
    limit: Option<usize>,
) -> Result<()> {
    if query.trim().is_empty() {
        anyhow::bail!("Search query must not be empty");
    }

    let filter = TicketFilter {
        ticket_type: ticket_type.map(parse_ticket_type).transpose()?,
        status,
        ..TicketFilter::default()
    };
    let mut docs = search_tickets(&project.repository(), query, &filter)?;
    if let Some(limit) = limit {
        docs.truncate(limit);
    }
    tracing::debug!("Search '{}' matched {} tickets", query, docs.len());

    print_tickets(&docs);
    Ok(())
}
