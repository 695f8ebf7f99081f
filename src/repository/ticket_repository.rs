use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::ticket::{TicketDocument, TicketType};
use crate::validation::ticket_files;

/// A trait for loading and saving tickets from a storage backend.
pub trait TicketRepository {
    /// Load a ticket by its ID.
    fn load(&self, id: &str) -> Result<TicketDocument>;

    /// Save a ticket, replacing any stored ticket with the same ID.
    fn save(&self, doc: &TicketDocument) -> Result<()>;

    /// Store a new ticket. Fails if a ticket with the same ID already exists.
    fn create(&self, doc: &TicketDocument) -> Result<()>;

    /// List all tickets from storage.
    fn list_all(&self) -> Result<Vec<TicketDocument>>;

    /// Remove a ticket. Returns `false` when there was nothing to remove.
    fn delete(&self, id: &str) -> Result<bool>;
}

/// Reject IDs that name no ticket type or could escape the tickets directory.
fn check_id(id: &str) -> Result<TicketType> {
    if id.contains(|c: char| c == '/' || c == '\\') || id.contains("..") {
        bail!("Invalid ticket ID: {}", id);
    }
    TicketType::from_id(id).with_context(|| format!("Invalid ticket ID: {}", id))
}

/// File-based implementation of TicketRepository.
///
/// Tickets live at `<root>/<prefix lowercase>/<ID>.md`. Files found elsewhere
/// under the root are still read, and updated in place.
pub struct FileTicketRepository {
    root: PathBuf,
}

impl FileTicketRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where a new ticket with this ID is written.
    pub fn canonical_path(&self, id: &str) -> Result<PathBuf> {
        let ticket_type = check_id(id)?;
        Ok(self
            .root
            .join(ticket_type.prefix().to_lowercase())
            .join(format!("{}.md", id)))
    }

    /// The file currently holding `id`, if any.
    pub fn find(&self, id: &str) -> Result<Option<PathBuf>> {
        let canonical = self.canonical_path(id)?;
        if canonical.exists() {
            return Ok(Some(canonical));
        }
        if !self.root.exists() {
            return Ok(None);
        }

        let file_name = format!("{}.md", id);
        Ok(ticket_files(&self.root)?
            .into_iter()
            .find(|path| path.file_name().is_some_and(|name| name == file_name.as_str())))
    }
}

impl TicketRepository for FileTicketRepository {
    fn load(&self, id: &str) -> Result<TicketDocument> {
        let path = self
            .find(id)?
            .with_context(|| format!("Ticket not found: {}", id))?;
        TicketDocument::load(&path)
    }

    fn save(&self, doc: &TicketDocument) -> Result<()> {
        let id = doc.ticket.id();
        let path = match self.find(id)? {
            Some(existing) => existing,
            None => self.canonical_path(id)?,
        };
        tracing::debug!("Saving {} to {}", id, path.display());
        doc.save(&path)
    }

    fn create(&self, doc: &TicketDocument) -> Result<()> {
        let id = doc.ticket.id();
        if let Some(existing) = self.find(id)? {
            bail!("Ticket {} already exists at {}", id, existing.display());
        }
        let path = self.canonical_path(id)?;
        tracing::debug!("Creating {} at {}", id, path.display());
        doc.save_new(&path).map_err(|e| {
            let clobbered = e
                .root_cause()
                .downcast_ref::<io::Error>()
                .is_some_and(|io| io.kind() == io::ErrorKind::AlreadyExists);
            if clobbered {
                anyhow!("Ticket {} was created by another process; retry the command", id)
            } else {
                e
            }
        })
    }

    fn list_all(&self) -> Result<Vec<TicketDocument>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut docs = Vec::new();
        for path in ticket_files(&self.root)? {
            match TicketDocument::load(&path) {
                Ok(doc) => docs.push(doc),
                Err(e) => tracing::warn!("Skipping {}: {:#}", path.display(), e),
            }
        }
        Ok(docs)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let Some(path) = self.find(id)? else {
            return Ok(false);
        };
        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete ticket file {}", path.display()))?;
        Ok(true)
    }
}
