//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure the device-local SQLite connection backing every
//!   persisted document.
//! - Apply schema migrations in deterministic order.
//! - Create the connection-scoped session tier.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write documents before migrations succeed.
//! - The session tier lives in the `temp` schema and never reaches the file.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// Durable document table created by migration `0001`.
pub const DURABLE_TABLE: &str = "documents";
/// Connection-scoped document table created at bootstrap.
pub const SESSION_TABLE: &str = "session_documents";

pub type DbResult<T> = Result<T, DbError>;

/// Failure to reach the document store.
///
/// Either tier can raise it. It is always surfaced and never read as an
/// empty store.
#[derive(Debug)]
pub enum DbError {
    /// SQLite rejected an open, pragma, migration or document statement.
    Sqlite(rusqlite::Error),
    /// The file was migrated by a newer build and is left unopened.
    StoreFromNewerBuild {
        store_version: u32,
        supported_version: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "document store error: {err}"),
            Self::StoreFromNewerBuild {
                store_version,
                supported_version,
            } => write!(
                f,
                "document store is at schema {store_version}, this build reads up to {supported_version}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::StoreFromNewerBuild { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
