use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};

use crate::ticket::TicketDocument;

use super::ticket_repository::TicketRepository;

/// In-memory implementation of TicketRepository for testing.
#[derive(Default)]
pub struct InMemoryTicketRepository {
    tickets: Mutex<BTreeMap<String, TicketDocument>>,
}

impl InMemoryTicketRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with `docs`.
    pub fn with_tickets(docs: Vec<TicketDocument>) -> Self {
        let map = docs
            .into_iter()
            .map(|doc| (doc.ticket.id().to_string(), doc))
            .collect();
        Self {
            tickets: Mutex::new(map),
        }
    }

    fn tickets(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, TicketDocument>> {
        self.tickets.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TicketRepository for InMemoryTicketRepository {
    fn load(&self, id: &str) -> Result<TicketDocument> {
        self.tickets()
            .get(id)
            .cloned()
            .with_context(|| format!("Ticket not found: {}", id))
    }

    fn save(&self, doc: &TicketDocument) -> Result<()> {
        self.tickets()
            .insert(doc.ticket.id().to_string(), doc.clone());
        Ok(())
    }

    fn create(&self, doc: &TicketDocument) -> Result<()> {
        let mut tickets = self.tickets();
        let id = doc.ticket.id();
        if tickets.contains_key(id) {
            bail!("Ticket {} already exists", id);
        }
        tickets.insert(id.to_string(), doc.clone());
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<TicketDocument>> {
        Ok(self.tickets().values().cloned().collect())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.tickets().remove(id).is_some())
    }
}
