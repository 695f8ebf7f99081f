//! Import and export commands

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use trackdown::id::{IdAllocator, SequenceAllocator};
use trackdown::interchange::{export_tickets, parse_import, ExportFormat, ImportSource};
use trackdown::repository::{list_tickets, TicketFilter, TicketRepository};
use trackdown::ticket::{render_body, Ticket, TicketDocument};

use super::ticket::{ensure_valid, parse_ticket_type};
use super::Project;
use crate::ui::{self, colors};

/// Import every record in `file`. Nothing is written unless all records
/// produce valid tickets.
pub fn cmd_import(
    project: &Project,
    source: &str,
    file: &Path,
    default_type: &str,
    dry_run: bool,
) -> Result<()> {
    let source: ImportSource = source.parse()?;
    let default_type = parse_ticket_type(default_type)?;
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read import file {}", file.display()))?;
    let records = parse_import(source, &content, default_type)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    if dry_run {
        for record in &records {
            println!("Would import: {} ({})", record.title, record.ticket_type);
        }
        return Ok(());
    }

    let allocator =
        SequenceAllocator::seeded_from_dir(&project.tickets_dir(), project.config.tickets.id_width)?;
    let tickets: Vec<Ticket> = records
        .into_iter()
        .map(|record| {
            let id = allocator.next_id(record.ticket_type);
            record.into_ticket(&id)
        })
        .collect();
    for ticket in &tickets {
        ensure_valid(project, ticket)?;
    }

    let templates_dir = project.config.templates_dir(&project.root);
    let repo = project.repository();
    let count = tickets.len();
    for ticket in tickets {
        let body = render_body(&ticket, Some(templates_dir.as_path()))?;
        let doc = TicketDocument::new(ticket, body);
        repo.create(&doc)?;
        tracing::debug!("Imported {} from {}", doc.ticket.id(), source);
        if ui::is_quiet() {
            println!("{}", doc.ticket.id());
        }
    }

    tracing::info!("Imported {} ticket(s) from {}", count, file.display());
    if !ui::is_quiet() {
        println!("{} {} ticket(s)", colors::success("Imported"), count);
    }
    Ok(())
}

pub fn cmd_export(
    project: &Project,
    format: &str,
    output: Option<&Path>,
    ticket_type: Option<&str>,
    status: Option<String>,
) -> Result<()> {
    let format: ExportFormat = format.parse()?;
    let filter = TicketFilter {
        ticket_type: ticket_type.map(parse_ticket_type).transpose()?,
        status,
        ..Default::default()
    };

    let mut tickets: Vec<Ticket> = list_tickets(&project.repository(), &filter)?
        .into_iter()
        .map(|doc| doc.ticket)
        .collect();
    tickets.sort_by(|a, b| {
        a.ticket_type()
            .as_str()
            .cmp(b.ticket_type().as_str())
            .then_with(|| a.id().cmp(b.id()))
    });
    let rendered = export_tickets(&tickets, format)?;

    match output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
            if !ui::is_quiet() {
                println!("Export written to: {}", path.display());
            }
        }
        None => {
            print!("{}", rendered);
            if !rendered.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
