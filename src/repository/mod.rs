//! Ticket storage backends and queries over them.

mod in_memory;
mod ticket_repository;

pub use in_memory::InMemoryTicketRepository;
pub use ticket_repository::{FileTicketRepository, TicketRepository};

use anyhow::Result;

use crate::ticket::{Ticket, TicketDocument, TicketType};

/// Criteria for listing tickets. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub ticket_type: Option<TicketType>,
    pub status: Option<String>,
    pub tag: Option<String>,
    pub assignee: Option<String>,
}

impl TicketFilter {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        let base = ticket.base();
        self.ticket_type.map_or(true, |t| ticket.ticket_type() == t)
            && self.status.as_deref().map_or(true, |s| base.status == s)
            && self
                .tag
                .as_deref()
                .map_or(true, |tag| base.tags.iter().any(|t| t == tag))
            && self
                .assignee
                .as_deref()
                .map_or(true, |who| base.assignees.iter().any(|a| a == who))
    }
}

/// Tickets matching `filter`, newest first by creation time.
pub fn list_tickets(
    repo: &dyn TicketRepository,
    filter: &TicketFilter,
) -> Result<Vec<TicketDocument>> {
    let mut docs: Vec<_> = repo
        .list_all()?
        .into_iter()
        .filter(|doc| filter.matches(&doc.ticket))
        .collect();
    docs.sort_by(|a, b| {
        b.ticket
            .base()
            .created_at
            .cmp(&a.ticket.base().created_at)
            .then_with(|| b.ticket.id().cmp(a.ticket.id()))
    });
    Ok(docs)
}

/// The `limit` most recently updated tickets matching `filter`.
pub fn recent_tickets(
    repo: &dyn TicketRepository,
    filter: &TicketFilter,
    limit: usize,
) -> Result<Vec<TicketDocument>> {
    let mut docs = list_tickets(repo, filter)?;
    docs.sort_by(|a, b| b.ticket.base().updated_at.cmp(&a.ticket.base().updated_at));
    docs.truncate(limit);
    Ok(docs)
}

/// Case-insensitive substring search over title, description and tags.
pub fn search_tickets(
    repo: &dyn TicketRepository,
    query: &str,
    filter: &TicketFilter,
) -> Result<Vec<TicketDocument>> {
    let needle = query.to_lowercase();
    Ok(list_tickets(repo, filter)?
        .into_iter()
        .filter(|doc| {
            let base = doc.ticket.base();
            base.title.to_lowercase().contains(&needle)
                || base.description.to_lowercase().contains(&needle)
                || base.tags.iter().any(|t| t.to_lowercase().contains(&needle))
        })
        .collect())
}
