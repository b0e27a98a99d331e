//! Domain model shared by every service.
//!
//! # Responsibility
//! - Define the closed record schemas persisted inside documents.
//! - Own the two key-construction rules (identity normalization and
//!   interpretation ids) so read and write paths cannot drift apart.
//!
//! # Invariants
//! - An `Identity` can only be built through normalization.
//! - An interpretation id is always `InterpretationKey::id()`.

pub mod identity;
pub mod interpretation;
pub mod report;
