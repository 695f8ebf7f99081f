//! A ticket together with its markdown body, as stored on disk.

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::frontmatter::{render_frontmatter, FrontmatterParser};
use super::model::Ticket;

#[derive(Debug, Clone, PartialEq)]
pub struct TicketDocument {
    pub ticket: Ticket,
    pub body: String,
    /// File the document was loaded from, if any.
    pub path: Option<PathBuf>,
}

impl TicketDocument {
    pub fn new(ticket: Ticket, body: impl Into<String>) -> Self {
        Self {
            ticket,
            body: body.into(),
            path: None,
        }
    }

    /// Parse a ticket file's content. The frontmatter block is required.
    pub fn parse(content: &str) -> Result<Self> {
        let parsed = FrontmatterParser::new().require_frontmatter().parse(content);
        if !parsed.result.is_valid() {
            bail!("{}", parsed.result.errors().join("; "));
        }

        let ticket = Ticket::from_fields(&parsed.fields).context("Failed to read ticket fields")?;

        Ok(Self {
            ticket,
            body: parsed.body,
            path: None,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read ticket from {}", path.display()))?;

        let mut doc = Self::parse(&content)
            .with_context(|| format!("Failed to parse ticket file {}", path.display()))?;
        doc.path = Some(path.to_path_buf());
        Ok(doc)
    }

    pub fn to_markdown(&self) -> Result<String> {
        render_frontmatter(&self.ticket.to_fields()?, &self.body)
    }

    /// Write the document atomically: a temp file in the same directory is
    /// renamed over the target.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.write_temp(path)?
            .persist(path)
            .with_context(|| format!("Failed to write ticket to {}", path.display()))?;
        Ok(())
    }

    /// Write the document to a path that must not exist yet.
    ///
    /// Fails with [`std::io::ErrorKind::AlreadyExists`] in the error chain when
    /// another writer got there first.
    pub fn save_new(&self, path: &Path) -> Result<()> {
        self.write_temp(path)?
            .persist_noclobber(path)
            .map_err(|e| anyhow::Error::new(e.error))
            .with_context(|| format!("Failed to create ticket file {}", path.display()))?;
        Ok(())
    }

    fn write_temp(&self, path: &Path) -> Result<tempfile::NamedTempFile> {
        let content = self.to_markdown()?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        Ok(tmp)
    }
}
