//! Read-time content transforms.
//!
//! # Responsibility
//! - Turn raw authored interpretation text into display-ready markup.
//!
//! # Invariants
//! - Nothing here touches storage; authored text is stored unmodified.

pub mod enrich;
