//! Whole-document JSON store and its SQLite implementation.
//!
//! # Responsibility
//! - Persist one JSON document per string key, replacing it wholesale.
//! - Hide SQL details from services.
//!
//! # Invariants
//! - `save` is synchronous and durable once it returns; there is no flush.
//! - `load` never surfaces malformed content as an error: it logs
//!   `document_malformed` and returns `None`.
//! - Durable and session tiers never share rows.

use crate::db::{DbError, DURABLE_TABLE, SESSION_TABLE};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Durable: ordered sequence of normalized emails.
pub const AUTHORIZED_IDENTITIES_KEY: &str = "authorized-identities";
/// Durable: mapping identity -> sequence of report records.
pub const USER_PROFILES_KEY: &str = "user-profiles";
/// Durable: mapping `<category>-<number>` -> `{title, content}`.
pub const INTERPRETATIONS_KEY: &str = "interpretations";
/// Session: current identity string.
pub const CURRENT_IDENTITY_KEY: &str = "current-identity";
/// Session: current report id string.
pub const CURRENT_REPORT_ID_KEY: &str = "current-report-id";

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage error visible to services.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A value could not be turned into JSON before writing.
    Encode(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(message) => write!(f, "failed to encode document: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Lifetime class of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreTier {
    /// Survives process restarts.
    Durable,
    /// Lives as long as the owning connection.
    Session,
}

impl StoreTier {
    fn table(self) -> &'static str {
        match self {
            Self::Durable => DURABLE_TABLE,
            Self::Session => SESSION_TABLE,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Durable => "durable",
            Self::Session => "session",
        }
    }
}

/// Keyed whole-document storage.
pub trait DocumentRepository {
    /// Reads the raw serialized text stored under `key`.
    fn load_raw(&self, key: &str) -> RepoResult<Option<String>>;
    /// Replaces the raw serialized text stored under `key`.
    fn save_raw(&self, key: &str, raw: &str) -> RepoResult<()>;
    /// Deletes `key`; no-op when absent.
    fn remove(&self, key: &str) -> RepoResult<()>;
    /// Deletes every document of this store.
    fn clear(&self) -> RepoResult<()>;

    /// Loads the JSON value under `key`.
    ///
    /// Returns `None` when the key was never written or holds malformed JSON.
    fn load(&self, key: &str) -> RepoResult<Option<Value>> {
        let Some(raw) = self.load_raw(key)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(
                    "event=document_malformed module=repo status=recovered key={} error={}",
                    key, err
                );
                Ok(None)
            }
        }
    }

    /// Replaces the whole document under `key`.
    fn save(&self, key: &str, value: &Value) -> RepoResult<()> {
        self.save_raw(key, &value.to_string())
    }
}

impl<R: DocumentRepository + ?Sized> DocumentRepository for &R {
    fn load_raw(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).load_raw(key)
    }

    fn save_raw(&self, key: &str, raw: &str) -> RepoResult<()> {
        (**self).save_raw(key, raw)
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        (**self).remove(key)
    }

    fn clear(&self) -> RepoResult<()> {
        (**self).clear()
    }
}

/// Loads `key` and decodes it as `T`.
///
/// A document that is valid JSON but not of shape `T` is treated like
/// malformed text: logged and reported as absent.
pub fn load_document<T, R>(repo: &R, key: &str) -> RepoResult<Option<T>>
where
    T: DeserializeOwned,
    R: DocumentRepository + ?Sized,
{
    let Some(value) = repo.load(key)? else {
        return Ok(None);
    };
    match serde_json::from_value::<T>(value) {
        Ok(document) => Ok(Some(document)),
        Err(err) => {
            warn!(
                "event=document_malformed module=repo status=recovered key={} error={}",
                key, err
            );
            Ok(None)
        }
    }
}

/// Encodes `document` and replaces whatever is stored under `key`.
pub fn save_document<T, R>(repo: &R, key: &str, document: &T) -> RepoResult<()>
where
    T: Serialize + ?Sized,
    R: DocumentRepository + ?Sized,
{
    let value = serde_json::to_value(document).map_err(|err| RepoError::Encode(err.to_string()))?;
    repo.save(key, &value)
}

/// SQLite-backed document store for one tier.
#[derive(Debug, Clone, Copy)]
pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
    tier: StoreTier,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    /// Durable tier over a connection returned by `open_db*`.
    pub fn durable(conn: &'conn Connection) -> Self {
        Self {
            conn,
            tier: StoreTier::Durable,
        }
    }

    /// Session tier over a connection returned by `open_db*`.
    pub fn session(conn: &'conn Connection) -> Self {
        Self {
            conn,
            tier: StoreTier::Session,
        }
    }

    pub fn tier(&self) -> StoreTier {
        self.tier
    }

    /// Lists stored keys in ascending order.
    pub fn keys(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT key FROM {} ORDER BY key ASC;", self.tier.table()))?;
        let mut rows = stmt.query([])?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next()? {
            keys.push(row.get(0)?);
        }
        Ok(keys)
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn load_raw(&self, key: &str) -> RepoResult<Option<String>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT value FROM {} WHERE key = ?1;", self.tier.table()),
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(raw)
    }

    fn save_raw(&self, key: &str, raw: &str) -> RepoResult<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                self.tier.table()
            ),
            params![key, raw],
        )?;
        debug!(
            "event=document_save module=repo status=ok tier={} key={} bytes={}",
            self.tier.as_str(),
            key,
            raw.len()
        );
        Ok(())
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        self.conn.execute(
            &format!("DELETE FROM {} WHERE key = ?1;", self.tier.table()),
            [key],
        )?;
        Ok(())
    }

    fn clear(&self) -> RepoResult<()> {
        let removed = self
            .conn
            .execute(&format!("DELETE FROM {};", self.tier.table()), [])?;
        warn!(
            "event=store_clear module=repo status=ok tier={} removed={}",
            self.tier.as_str(),
            removed
        );
        Ok(())
    }
}
