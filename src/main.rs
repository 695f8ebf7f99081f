//! aitrackdown - markdown ticket tracking with validation
//!
//! Command-line entry point: argument parsing, logging setup and dispatch to
//! the command handlers in [`cmd`].

mod cli;
mod cmd;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use cmd::config::ConfigArgs;
use cmd::ticket::{NewTicket, TicketUpdate};

fn main() -> Result<()> {
    // Debug builds recurse deeply through serde and jsonschema; give the
    // worker the 8 MB stack Linux uses by default on every platform.
    const STACK_SIZE: usize = 8 * 1024 * 1024; // 8 MB

    let thread = std::thread::Builder::new()
        .stack_size(STACK_SIZE)
        .spawn(run)?;

    match thread.join() {
        Ok(result) => result,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.project_dir {
        Some(dir) => Ok(PathBuf::from(
            shellexpand::tilde(&dir.to_string_lossy()).into_owned(),
        )),
        None => Ok(std::env::current_dir()?),
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);
    ui::set_quiet(cli.quiet);

    let root = project_root(&cli)?;
    tracing::debug!("Project root: {}", root.display());

    match cli.command {
        Commands::Init { name, force } => cmd::init::cmd_init(&root, name, force),
        Commands::Create {
            ticket_type,
            title,
            description,
            priority,
            assignees,
            tags,
            labels,
            parent,
            depends_on,
            due,
        } => cmd::ticket::cmd_create(
            &cmd::ensure_initialized(&root)?,
            NewTicket {
                ticket_type,
                title,
                description,
                priority,
                assignees,
                tags,
                labels,
                parent,
                depends_on,
                due,
            },
        ),
        Commands::List {
            ticket_type,
            status,
            tag,
            recent,
        } => cmd::ticket::cmd_list(
            &cmd::ensure_initialized(&root)?,
            ticket_type.as_deref(),
            status,
            tag,
            recent,
        ),
        Commands::Show { id } => cmd::ticket::cmd_show(&cmd::ensure_initialized(&root)?, &id),
        Commands::Update {
            id,
            title,
            description,
            priority,
            add_tags,
            assignees,
        } => cmd::ticket::cmd_update(
            &cmd::ensure_initialized(&root)?,
            &id,
            TicketUpdate {
                title,
                description,
                priority,
                add_tags,
                assignees,
            },
        ),
        Commands::Transition { id, status, force } => cmd::ticket::cmd_transition(
            &cmd::ensure_initialized(&root)?,
            &id,
            &status,
            force,
        ),
        Commands::Delete { id } => cmd::ticket::cmd_delete(&cmd::ensure_initialized(&root)?, &id),
        Commands::Search {
            query,
            ticket_type,
            status,
            limit,
        } => cmd::search::cmd_search(
            &cmd::ensure_initialized(&root)?,
            &query,
            ticket_type.as_deref(),
            status,
            limit,
        ),
        Commands::Deps { id } => cmd::ticket::cmd_deps(&cmd::ensure_initialized(&root)?, &id),
        Commands::Validate { command, json } => {
            if !cmd::validate::cmd_validate(&root, command, json)? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Config {
            key,
            value,
            list,
            global,
        } => cmd::config::cmd_config(
            &root,
            ConfigArgs {
                key,
                value,
                list,
                global,
            },
        ),
        Commands::Import {
            source,
            file,
            ticket_type,
            dry_run,
        } => cmd::exchange::cmd_import(
            &cmd::ensure_initialized(&root)?,
            &source,
            &file,
            &ticket_type,
            dry_run,
        ),
        Commands::Export {
            format,
            output,
            ticket_type,
            status,
        } => cmd::exchange::cmd_export(
            &cmd::ensure_initialized(&root)?,
            &format,
            output.as_deref(),
            ticket_type.as_deref(),
            status,
        ),
        Commands::Doctor => {
            if !cmd::doctor::cmd_doctor(&root)? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Health => {
            if !cmd::doctor::cmd_health()? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Info => cmd::doctor::cmd_info(&root),
        Commands::Completion { shell } => cmd_completion(shell),
        Commands::Version => cmd_version(cli.verbose),
    }
}

/// Show version information
fn cmd_version(verbose: bool) -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    println!("aitrackdown {}", VERSION);

    if verbose {
        const GIT_SHA: &str = env!("GIT_SHA");
        const BUILD_DATE: &str = env!("BUILD_DATE");
        println!("commit: {}", GIT_SHA);
        println!("built: {}", BUILD_DATE);
    }

    Ok(())
}

/// Generate shell completion script
fn cmd_completion(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "aitrackdown", &mut io::stdout());
    Ok(())
}
