//! Ticket command handlers: create, list, show, update, transition, delete
//! and deps.

use anyhow::{anyhow, Result};
use colored::Colorize;

use trackdown::domain::DependencyGraph;
use trackdown::id::{IdAllocator, SequenceAllocator};
use trackdown::repository::{list_tickets, recent_tickets, TicketFilter, TicketRepository};
use trackdown::ticket::{
    render_body, DueDate, Priority, Ticket, TicketDocument, TicketType,
};
use trackdown::workflow::TransitionBuilder;

use super::Project;
use crate::ui::{self, colors, format};

/// Fields for a new ticket, as given on the command line.
#[derive(Debug, Default)]
pub struct NewTicket {
    pub ticket_type: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub assignees: Vec<String>,
    pub tags: Vec<String>,
    pub labels: Vec<String>,
    pub parent: Option<String>,
    pub depends_on: Vec<String>,
    pub due: Option<String>,
}

/// Changes requested by `aitrackdown update`.
#[derive(Debug, Default)]
pub struct TicketUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub add_tags: Vec<String>,
    pub assignees: Vec<String>,
}

pub(crate) fn parse_ticket_type(s: &str) -> Result<TicketType> {
    s.parse::<TicketType>().map_err(|e| anyhow!("{}", e))
}

/// Fail unless every referenced ticket exists.
fn require_tickets(repo: &dyn TicketRepository, ids: &[String]) -> Result<()> {
    for id in ids {
        repo.load(id)
            .map_err(|_| anyhow!("Referenced ticket not found: {}", id))?;
    }
    Ok(())
}

/// Schema-check a ticket before it is written.
pub(crate) fn ensure_valid(project: &Project, ticket: &Ticket) -> Result<()> {
    let result = project
        .config
        .schema_validator(&project.root)
        .validate_ticket_model(ticket)?;
    for warning in result.warnings() {
        tracing::warn!("{}: {}", ticket.id(), warning);
    }
    if !result.is_valid() {
        anyhow::bail!("Invalid ticket {}:\n  {}", ticket.id(), result.errors().join("\n  "));
    }
    Ok(())
}

pub fn cmd_create(project: &Project, new: NewTicket) -> Result<()> {
    let ticket_type = parse_ticket_type(&new.ticket_type)?;
    let repo = project.repository();

    let mut references = new.depends_on.clone();
    references.extend(new.parent.iter().cloned());
    require_tickets(&repo, &references)?;

    let allocator =
        SequenceAllocator::seeded_from_dir(&project.tickets_dir(), project.config.tickets.id_width)?;
    let id = allocator.next_id(ticket_type);

    let mut ticket = Ticket::new(ticket_type, &id, new.title);
    {
        let base = ticket.base_mut();
        base.description = new.description.unwrap_or_default();
        base.priority = match new.priority {
            Some(p) => p.parse::<Priority>()?,
            None => project.config.tickets.default_priority,
        };
        base.assignees = if new.assignees.is_empty() {
            project.config.tickets.default_assignee.iter().cloned().collect()
        } else {
            new.assignees
        };
        base.tags = new.tags;
        base.labels = new.labels;
        base.parent = new.parent;
        base.dependencies = new.depends_on;
        base.due_date = new
            .due
            .map(|d| DueDate::parse(&d).ok_or_else(|| anyhow!("Invalid due date: {}", d)))
            .transpose()?;
    }
    ensure_valid(project, &ticket)?;

    let templates_dir = project.config.templates_dir(&project.root);
    let body = render_body(&ticket, Some(templates_dir.as_path()))?;
    let doc = TicketDocument::new(ticket, body);
    repo.create(&doc)?;
    tracing::info!("Created {}", id);

    if ui::is_quiet() {
        println!("{}", id);
    } else {
        println!(
            "{} {} {}",
            colors::success("Created"),
            colors::identifier(&id),
            doc.ticket.title()
        );
    }
    Ok(())
}

fn print_ticket_line(ticket: &Ticket) {
    let base = ticket.base();
    println!(
        "{} {:<10} {:<18} {}",
        ui::status_icon(&base.status),
        colors::identifier(&base.id),
        colors::secondary(&base.status),
        format::truncate_title(&base.title, 60)
    );
}

pub(crate) fn print_tickets(docs: &[TicketDocument]) {
    if docs.is_empty() {
        if !ui::is_quiet() {
            println!("No tickets found.");
        }
        return;
    }
    for doc in docs {
        if ui::is_quiet() {
            println!("{}", doc.ticket.id());
        } else {
            print_ticket_line(&doc.ticket);
        }
    }
}

pub fn cmd_list(
    project: &Project,
    ticket_type: Option<&str>,
    status: Option<String>,
    tag: Option<String>,
    recent: Option<usize>,
) -> Result<()> {
    let filter = TicketFilter {
        ticket_type: ticket_type.map(parse_ticket_type).transpose()?,
        status,
        tag,
        assignee: None,
    };
    let repo = project.repository();
    let docs = match recent {
        Some(limit) => recent_tickets(&repo, &filter, limit)?,
        None => list_tickets(&repo, &filter)?,
    };
    print_tickets(&docs);
    Ok(())
}

pub fn cmd_show(project: &Project, id: &str) -> Result<()> {
    let doc = project.repository().load(id)?;
    let base = doc.ticket.base();

    println!(
        "{} {} {}",
        ui::status_icon(&base.status),
        colors::identifier(&base.id),
        colors::heading(&base.title)
    );
    if let Some(path) = &doc.path {
        println!("{}", colors::secondary(&path.display().to_string()));
    }
    println!("{}", format::separator(40));
    print!("{}", doc.to_markdown()?);
    Ok(())
}

pub fn cmd_update(project: &Project, id: &str, update: TicketUpdate) -> Result<()> {
    let repo = project.repository();
    let mut doc = repo.load(id)?;
    {
        let base = doc.ticket.base_mut();
        if let Some(title) = update.title {
            base.title = title;
        }
        if let Some(description) = update.description {
            base.description = description;
        }
        if let Some(priority) = update.priority {
            base.priority = priority.parse()?;
        }
        for tag in update.add_tags {
            if !base.tags.contains(&tag) {
                base.tags.push(tag);
            }
        }
        if !update.assignees.is_empty() {
            base.assignees = update.assignees;
        }
    }
    doc.ticket.touch();
    ensure_valid(project, &doc.ticket)?;
    repo.save(&doc)?;

    if !ui::is_quiet() {
        println!("{} {}", colors::success("Updated"), colors::identifier(id));
    }
    Ok(())
}

pub fn cmd_transition(project: &Project, id: &str, status: &str, force: bool) -> Result<()> {
    let repo = project.repository();
    let workflow = project.config.workflow_validator(&project.root)?;
    let mut doc = repo.load(id)?;
    let from = doc.ticket.status().to_string();

    let mut builder = TransitionBuilder::new(&mut doc.ticket, &workflow);
    if force {
        builder = builder.force();
    }
    let changed = builder.to(status)?;

    if !changed {
        if !ui::is_quiet() {
            println!("{} is already {}", colors::identifier(id), status);
        }
        return Ok(());
    }

    ensure_valid(project, &doc.ticket)?;
    repo.save(&doc)?;
    if !ui::is_quiet() {
        println!(
            "{} {} {} {}",
            colors::identifier(id),
            from,
            "→".bold(),
            status
        );
    }
    Ok(())
}

pub fn cmd_delete(project: &Project, id: &str) -> Result<()> {
    if !project.repository().delete(id)? {
        anyhow::bail!("Ticket not found: {}", id);
    }
    if !ui::is_quiet() {
        println!("{} {}", colors::success("Deleted"), colors::identifier(id));
    }
    Ok(())
}

/// Print `id`'s transitive dependencies in the order they must be done.
pub fn cmd_deps(project: &Project, id: &str) -> Result<()> {
    let tickets: Vec<Ticket> = project
        .repository()
        .list_all()?
        .into_iter()
        .map(|doc| doc.ticket)
        .collect();
    let graph = DependencyGraph::from_tickets(&tickets);
    let order = graph.dependency_closure(id)?;

    if order.len() == 1 {
        if !ui::is_quiet() {
            println!("{} has no dependencies", colors::identifier(id));
        }
        return Ok(());
    }

    for (n, dep) in order.iter().enumerate() {
        let ticket = tickets.iter().find(|t| t.id() == dep);
        match ticket {
            Some(t) if !ui::is_quiet() => println!(
                "{:>3}. {} {} {}",
                n + 1,
                ui::status_icon(t.status()),
                colors::identifier(dep),
                t.title()
            ),
            _ => println!("{}", dep),
        }
    }
    Ok(())
}
