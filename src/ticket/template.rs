//! Markdown body templates for new tickets.
//!
//! Bodies are rendered with Tera from an embedded template. A project can
//! override the template for a type by placing `<type>.md` in its templates
//! directory.

use anyhow::{Context, Result};
use std::path::Path;
use tera::Tera;

use super::model::{format_timestamp, Ticket};

const DEFAULT_TEMPLATE: &str = r#"
# {{ title }}

## Description
{% if description %}{{ description }}{% else %}No description provided.{% endif %}

## Details
- **Type**: {{ ticket_type }}
- **Status**: {{ status }}
- **Priority**: {{ priority }}
- **Assignees**: {% if assignees %}{{ assignees | join(sep=", ") }}{% else %}None{% endif %}
- **Tags**: {% if tags %}{{ tags | join(sep=", ") }}{% else %}None{% endif %}
- **Created**: {{ created_at }}
{% if parent %}- **Parent**: {{ parent }}
{% endif %}{% if dependencies %}- **Depends on**: {{ dependencies | join(sep=", ") }}
{% endif %}{% if goal %}
## Goal
{{ goal }}
{% endif %}
## Tasks
- [ ] Add task items here

## Notes
_Add any additional notes or context here._
"#;

/// Render the body of a newly created ticket.
pub fn render_body(ticket: &Ticket, templates_dir: Option<&Path>) -> Result<String> {
    let ticket_type = ticket.ticket_type();
    let mut tera = Tera::default();

    let custom = templates_dir
        .map(|dir| dir.join(format!("{}.md", ticket_type.as_str())))
        .filter(|path| path.exists());

    match custom {
        Some(path) => {
            tracing::debug!("Using ticket template {}", path.display());
            tera.add_template_file(&path, Some("ticket"))
                .with_context(|| format!("Failed to load template {}", path.display()))?;
        }
        None => tera.add_raw_template("ticket", DEFAULT_TEMPLATE)?,
    }

    let base = ticket.base();
    let mut context = tera::Context::new();
    context.insert("id", &base.id);
    context.insert("title", &base.title);
    context.insert("description", &base.description);
    context.insert("ticket_type", ticket_type.as_str());
    context.insert("status", &base.status);
    context.insert("priority", &base.priority.to_string());
    context.insert("assignees", &base.assignees);
    context.insert("tags", &base.tags);
    context.insert("created_at", &format_timestamp(&base.created_at));
    context.insert("parent", &base.parent);
    context.insert("dependencies", &base.dependencies);
    let goal = match ticket {
        Ticket::Epic(epic) => epic.goal.clone(),
        _ => None,
    };
    context.insert("goal", &goal);

    tera.render("ticket", &context)
        .context("Failed to render ticket body")
}
