//! Domain logic module containing pure functions over ticket batches.
//!
//! Nothing here touches the filesystem.

pub mod dependency;
pub mod relationships;

pub use dependency::DependencyGraph;
pub use relationships::{validate_relationships, validate_ticket_relationships};
