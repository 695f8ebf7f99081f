//! Centralized UI formatting and color utilities
//!
//! Status icons, colors and validation-result printing shared by the
//! aitrackdown commands.

use colored::{ColoredString, Colorize};
use std::sync::atomic::{AtomicBool, Ordering};

use trackdown::result::ValidationResult;

static QUIET: AtomicBool = AtomicBool::new(false);

/// Set from the global `--quiet` flag.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Returns a colored status icon for a ticket status.
///
/// Statuses are grouped across ticket types:
/// - not started (open, planning, draft): ○ (white)
/// - moving (in_progress, active, review states): ◐ (yellow)
/// - done (completed, resolved, merged, approved): ● (green)
/// - blocked (blocked, on_hold, changes_requested): ⊗ (red)
/// - finished without completing (closed, cancelled, archived): ✓ (dimmed)
pub fn status_icon(status: &str) -> ColoredString {
    match status {
        "open" | "planning" | "draft" => "○".white(),
        "in_progress" | "active" | "ready_for_review" | "in_review" => "◐".yellow(),
        "completed" | "resolved" | "merged" | "approved" => "●".green(),
        "blocked" | "on_hold" | "changes_requested" => "⊗".red(),
        "closed" | "cancelled" | "archived" => "✓".dimmed(),
        _ => "?".normal(),
    }
}

/// Color scheme for status-related text output
pub mod colors {
    use colored::{ColoredString, Colorize};

    /// Green for success/completion
    pub fn success(text: &str) -> ColoredString {
        text.green()
    }

    /// Yellow for warnings
    pub fn warning(text: &str) -> ColoredString {
        text.yellow()
    }

    /// Red for errors/failures
    pub fn error(text: &str) -> ColoredString {
        text.red()
    }

    /// Cyan for ticket IDs
    pub fn identifier(text: &str) -> ColoredString {
        text.cyan()
    }

    /// Dimmed for secondary text
    pub fn secondary(text: &str) -> ColoredString {
        text.dimmed()
    }

    /// Bold for headings
    pub fn heading(text: &str) -> ColoredString {
        text.bold()
    }
}

/// Common text formatting patterns
pub mod format {
    /// Truncate a title to at most `max_len` characters.
    pub fn truncate_title(title: &str, max_len: usize) -> String {
        if title.chars().count() <= max_len {
            title.to_string()
        } else {
            let kept: String = title.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", kept)
        }
    }

    /// Format a separator line for sections
    pub fn separator(width: usize) -> String {
        "─".repeat(width)
    }
}

/// Print the errors and warnings of a result, one per line, under `label`.
pub fn print_result(label: &str, result: &ValidationResult) {
    let marker = if result.is_valid() {
        "✓".green()
    } else {
        "✗".red()
    };
    println!("{} {}", marker, label);
    for error in result.errors() {
        println!("    {} {}", colors::error("error:"), error);
    }
    for warning in result.warnings() {
        println!("    {} {}", colors::warning("warning:"), warning);
    }
}

/// Print a one-line pass/fail summary.
pub fn print_summary(errors: usize, warnings: usize) {
    if errors == 0 {
        println!(
            "{} {}",
            colors::success("Validation passed"),
            colors::secondary(&format!("({} warning(s))", warnings))
        );
    } else {
        println!(
            "{} {} error(s), {} warning(s)",
            colors::error("Validation failed:"),
            errors,
            warnings
        );
    }
}
