//! Ticket ID format checks and sequential ID allocation.
//!
//! IDs look like `TSK-0001`: a type prefix, a dash, and a zero-padded number
//! of at least [`MIN_ID_DIGITS`] digits.

use anyhow::Result;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::result::{ValidationResult, Violation};
use crate::ticket::TicketType;

/// Minimum number of digits in an ID's numeric suffix.
pub const MIN_ID_DIGITS: usize = 4;

/// Check that `id` is well formed and carries the prefix for `expected_type`.
pub fn validate_id_format(id: &str, expected_type: &str) -> ValidationResult {
    let mut result = ValidationResult::new();
    let id_error = |message: String| Violation::IdFormat {
        id: id.to_string(),
        message,
    };

    let Some((prefix, suffix)) = id.split_once('-') else {
        result.record(id_error(
            "expected <PREFIX>-<NUMBER>, no '-' separator found".to_string(),
        ));
        return result;
    };

    if prefix.is_empty() {
        result.record(id_error("missing type prefix".to_string()));
        return result;
    }

    match expected_type.parse::<TicketType>() {
        Ok(ticket_type) if ticket_type.prefix() != prefix => {
            result.record(id_error(format!(
                "expected prefix '{}' for {}, found '{}'",
                ticket_type.prefix(),
                ticket_type,
                prefix
            )));
        }
        Ok(_) => {}
        Err(_) => result.record(Violation::UnknownTicketType(expected_type.to_string())),
    }

    if suffix.len() < MIN_ID_DIGITS || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        result.record(id_error(format!(
            "number must be at least {} digits, found '{}'",
            MIN_ID_DIGITS, suffix
        )));
    }

    result
}

/// Split a well-formed ID into its type and number.
pub fn parse_id(id: &str) -> Option<(TicketType, u32)> {
    let (prefix, suffix) = id.split_once('-')?;
    if suffix.len() < MIN_ID_DIGITS || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let ticket_type = TicketType::from_prefix(prefix)?;
    Some((ticket_type, suffix.parse().ok()?))
}

/// Format an ID, zero-padding the number to `width` digits.
pub fn format_id(ticket_type: TicketType, number: u32, width: usize) -> String {
    let width = width.max(MIN_ID_DIGITS);
    format!("{}-{:0>width$}", ticket_type.prefix(), number, width = width)
}

/// Source of fresh ticket IDs.
pub trait IdAllocator {
    fn next_id(&self, ticket_type: TicketType) -> String;
}

/// Allocates IDs from one atomic counter per ticket type.
///
/// Concurrent callers sharing an allocator never receive the same ID.
#[derive(Debug, Default)]
pub struct SequenceAllocator {
    counters: [AtomicU32; 5],
    width: usize,
}

impl SequenceAllocator {
    pub fn new(width: usize) -> Self {
        Self {
            counters: Default::default(),
            width,
        }
    }

    /// Start each counter after the highest number among `ids`.
    pub fn seeded_from_ids<'a>(ids: impl IntoIterator<Item = &'a str>, width: usize) -> Self {
        let allocator = Self::new(width);
        for id in ids {
            if let Some((ticket_type, number)) = parse_id(id) {
                allocator.counters[ticket_type.index()].fetch_max(number, Ordering::SeqCst);
            }
        }
        allocator
    }

    /// Seed from the `<ID>.md` file names found anywhere under `dir`.
    pub fn seeded_from_dir(dir: &Path, width: usize) -> Result<Self> {
        let stems: Vec<String> = crate::validation::ticket_files(dir)?
            .iter()
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()))
            .map(str::to_string)
            .collect();
        tracing::debug!("Seeding ID allocator from {} ticket files", stems.len());
        Ok(Self::seeded_from_ids(stems.iter().map(String::as_str), width))
    }

    /// Highest number handed out (or seeded) so far for `ticket_type`.
    pub fn current(&self, ticket_type: TicketType) -> u32 {
        self.counters[ticket_type.index()].load(Ordering::SeqCst)
    }
}

impl IdAllocator for SequenceAllocator {
    fn next_id(&self, ticket_type: TicketType) -> String {
        let number = self.counters[ticket_type.index()].fetch_add(1, Ordering::SeqCst) + 1;
        format_id(ticket_type, number, self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_valid_ids_for_each_type() {
        for (id, ticket_type) in [
            ("TSK-0001", "task"),
            ("EP-0001", "epic"),
            ("ISS-0001", "issue"),
            ("PR-0001", "pr"),
            ("PROJ-0001", "project"),
            ("TSK-123456", "task"),
        ] {
            let result = validate_id_format(id, ticket_type);
            assert!(result.is_valid(), "{} as {}: {:?}", id, ticket_type, result.errors());
        }
    }

    #[test]
    fn test_invalid_ids() {
        for (id, ticket_type) in [
            ("INVALID-001", "task"),
            ("TSK-INVALID", "task"),
            ("EP-0001", "task"),
            ("TSK-001", "task"),
            ("TSK0001", "task"),
            ("-0001", "task"),
            ("TSK-", "task"),
            ("TSK-0001-2", "task"),
            ("tsk-0001", "task"),
            ("TSK-0001", "story"),
        ] {
            assert!(
                !validate_id_format(id, ticket_type).is_valid(),
                "{} as {} should be invalid",
                id,
                ticket_type
            );
        }
    }

    #[test]
    fn test_wrong_prefix_message() {
        let result = validate_id_format("EP-0001", "task");
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].contains("expected prefix 'TSK' for task, found 'EP'"));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("ISS-0042"), Some((TicketType::Issue, 42)));
        assert_eq!(parse_id("ISS-42"), None);
        assert_eq!(parse_id("BUG-0042"), None);
    }

    #[test]
    fn test_format_id_padding() {
        assert_eq!(format_id(TicketType::Task, 7, 4), "TSK-0007");
        assert_eq!(format_id(TicketType::Project, 12345, 4), "PROJ-12345");
        assert_eq!(format_id(TicketType::Epic, 3, 2), "EP-0003");
        assert_eq!(format_id(TicketType::Pr, 3, 6), "PR-000003");
    }

    #[test]
    fn test_allocator_sequences_per_type() {
        let allocator = SequenceAllocator::new(4);
        assert_eq!(allocator.next_id(TicketType::Task), "TSK-0001");
        assert_eq!(allocator.next_id(TicketType::Task), "TSK-0002");
        assert_eq!(allocator.next_id(TicketType::Epic), "EP-0001");
    }

    #[test]
    fn test_allocator_seeded_from_ids() {
        let allocator =
            SequenceAllocator::seeded_from_ids(["TSK-0003", "TSK-0010", "ISS-0002", "junk"], 4);
        assert_eq!(allocator.next_id(TicketType::Task), "TSK-0011");
        assert_eq!(allocator.next_id(TicketType::Issue), "ISS-0003");
        assert_eq!(allocator.next_id(TicketType::Pr), "PR-0001");
    }

    #[test]
    fn test_allocator_seeded_from_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("tsk")).unwrap();
        std::fs::write(tmp.path().join("tsk/TSK-0005.md"), "").unwrap();
        std::fs::write(tmp.path().join("notes.md"), "").unwrap();

        let allocator = SequenceAllocator::seeded_from_dir(tmp.path(), 4).unwrap();
        assert_eq!(allocator.current(TicketType::Task), 5);
        assert_eq!(allocator.next_id(TicketType::Task), "TSK-0006");
    }

    #[test]
    fn test_allocator_seeded_under_bracketed_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("tickets[2025]");
        std::fs::create_dir_all(dir.join("ep")).unwrap();
        std::fs::write(dir.join("ep/EP-0012.md"), "").unwrap();

        let allocator = SequenceAllocator::seeded_from_dir(&dir, 4).unwrap();
        assert_eq!(allocator.next_id(TicketType::Epic), "EP-0013");
    }

    #[test]
    fn test_allocator_unique_across_threads() {
        let allocator = Arc::new(SequenceAllocator::new(4));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let allocator = Arc::clone(&allocator);
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| allocator.next_id(TicketType::Task))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id allocated");
            }
        }
        assert_eq!(seen.len(), 400);
    }
}
