//! CLI argument definitions for aitrackdown.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aitrackdown")]
#[command(about = "Markdown ticket tracking with schema and workflow validation", long_about = None)]
#[command(
    after_help = "GETTING STARTED:\n    aitrackdown init                    Create .aitrackdown/config.md\n    aitrackdown create task \"Title\"     Create a ticket\n    aitrackdown validate                Validate every ticket and their relationships"
)]
pub struct Cli {
    /// Project root (default: current directory)
    #[arg(short = 'd', long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'V', long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress all non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize aitrackdown in the project directory
    Init {
        /// Project name (default: directory name)
        #[arg(long)]
        name: Option<String>,
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
    /// Create a new ticket
    Create {
        /// Ticket type: task, issue, epic, pr or project
        ticket_type: String,
        /// Ticket title
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// low, medium, high or critical
        #[arg(long)]
        priority: Option<String>,
        #[arg(long = "assignee", value_name = "NAME")]
        assignees: Vec<String>,
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        #[arg(long = "label", value_name = "LABEL")]
        labels: Vec<String>,
        /// Parent ticket ID
        #[arg(long)]
        parent: Option<String>,
        /// IDs this ticket depends on
        #[arg(long = "depends-on", value_name = "ID")]
        depends_on: Vec<String>,
        /// Due date (YYYY-MM-DD or RFC 3339 date-time)
        #[arg(long)]
        due: Option<String>,
    },
    /// List tickets
    List {
        #[arg(long = "type", value_name = "TYPE")]
        ticket_type: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        /// Only the N most recently updated tickets
        #[arg(long, value_name = "N")]
        recent: Option<usize>,
    },
    /// Show a ticket
    Show {
        id: String,
    },
    /// Update ticket fields
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long = "add-tag", value_name = "TAG")]
        add_tags: Vec<String>,
        /// Replace the assignees
        #[arg(long = "assignee", value_name = "NAME")]
        assignees: Vec<String>,
    },
    /// Move a ticket to another status
    Transition {
        id: String,
        status: String,
        /// Skip the workflow check
        #[arg(long)]
        force: bool,
    },
    /// Delete a ticket
    Delete {
        id: String,
    },
    /// Search tickets by title, description and tags
    Search {
        query: String,
        #[arg(long = "type", value_name = "TYPE")]
        ticket_type: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show a ticket's dependencies in the order they must be done
    Deps {
        id: String,
    },
    /// Validate tickets, transitions and IDs
    Validate {
        #[command(subcommand)]
        command: Option<ValidateCommands>,
        /// Print results as JSON
        #[arg(long, global = true)]
        json: bool,
    },
    /// Show configuration or one dotted key, or set a key
    Config {
        key: Option<String>,
        /// New value for KEY
        value: Option<String>,
        /// List every key as `key: value`
        #[arg(short, long, conflicts_with = "value")]
        list: bool,
        /// Use the global config instead of the project's
        #[arg(short, long)]
        global: bool,
    },
    /// Import tickets from a file
    Import {
        /// github-json or csv
        source: String,
        file: PathBuf,
        /// Type for rows that do not name one
        #[arg(long = "type", value_name = "TYPE", default_value = "task")]
        ticket_type: String,
        /// Show what would be imported without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Export tickets as json, csv or github-json
    Export {
        format: String,
        /// Write to FILE instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        #[arg(long = "type", value_name = "TYPE")]
        ticket_type: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Check the project, configuration and environment
    Doctor,
    /// Check the installation
    Health,
    /// Show installation and project paths
    Info,
    /// Generate shell completions
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Show version information (commit and build date with --verbose)
    Version,
}

#[derive(Subcommand)]
pub enum ValidateCommands {
    /// Validate a single ticket file
    File {
        path: PathBuf,
    },
    /// Validate every ticket and the relationships between them
    All,
    /// Validate only the relationships between tickets
    Relationships,
    /// Check a status transition against the workflow
    Transition {
        ticket_type: String,
        from: String,
        to: String,
    },
    /// Check an ID against a ticket type
    Id {
        id: String,
        ticket_type: String,
    },
}
