//! Repository layer: keyed document persistence.
//!
//! # Responsibility
//! - Define the document store contract services depend on.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Documents are replaced wholesale; there is no partial update.
//! - Malformed stored content reads as absent, never as an error.

pub mod document_repo;
