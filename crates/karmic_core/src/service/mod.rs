//! Use-case services over the document repository.
//!
//! # Responsibility
//! - Own one persisted document each and keep an in-memory view of it.
//! - Keep front-ends decoupled from the storage layout.

pub mod authorization_service;
pub mod interpretation_service;
pub mod matrix_service;
pub mod profile_service;
pub mod session_service;
