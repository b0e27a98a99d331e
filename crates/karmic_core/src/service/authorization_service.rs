//! Authorized-identity registry.
//!
//! # Responsibility
//! - Decide whether an identity may log in.
//! - Own add/remove of authorized identities with write-through persistence.
//!
//! # Invariants
//! - Every entry is normalized and appears once, in insertion order.
//! - Protected identities are always present and can never be removed,
//!   whatever the caller.
//! - Every successful mutation rewrites the whole document before returning.

use crate::model::identity::{normalize, Identity};
use crate::repo::document_repo::{
    load_document, save_document, DocumentRepository, RepoError, AUTHORIZED_IDENTITIES_KEY,
};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Essential identities that `remove` rejects unconditionally.
pub const PROTECTED_IDENTITIES: &[&str] = &[
    "teste@teste.com",
    "projetovmtd@gmail.com",
    "carlamaiaprojetos@gmail.com",
];

/// Seed written on first launch when no registry document exists.
pub const DEFAULT_AUTHORIZED_IDENTITIES: &[&str] = &[
    "example1@example.com",
    "example2@example.com",
    "teste@teste.com",
    "projetovmtd@gmail.com",
    "carlamaiaprojetos@gmail.com",
];

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug)]
pub enum RegistryError {
    /// Value is not shaped like an email address.
    InvalidIdentity(String),
    /// Removal of an essential identity was attempted.
    ProtectedEntryViolation(Identity),
    Repo(RepoError),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentity(value) => write!(f, "not a valid email: `{value}`"),
            Self::ProtectedEntryViolation(identity) => {
                write!(f, "identity `{identity}` is protected and cannot be removed")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RegistryError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// In-memory view of the `authorized-identities` document.
pub struct AuthorizationRegistry<R: DocumentRepository> {
    repo: R,
    protected: Vec<Identity>,
    entries: Vec<Identity>,
}

impl<R: DocumentRepository> AuthorizationRegistry<R> {
    /// Loads the registry with the built-in protected list.
    pub fn load(repo: R) -> RegistryResult<Self> {
        let protected = PROTECTED_IDENTITIES.iter().map(|raw| normalize(raw)).collect();
        let seed = DEFAULT_AUTHORIZED_IDENTITIES
            .iter()
            .map(|raw| normalize(raw))
            .collect();
        Self::load_with(repo, protected, seed)
    }

    /// Loads the registry with a caller-chosen protected list.
    ///
    /// The protected list doubles as the first-launch seed.
    pub fn with_protected(repo: R, protected: &[&str]) -> RegistryResult<Self> {
        let protected: Vec<Identity> = protected.iter().map(|raw| normalize(raw)).collect();
        let seed = protected.clone();
        Self::load_with(repo, protected, seed)
    }

    fn load_with(repo: R, protected: Vec<Identity>, seed: Vec<Identity>) -> RegistryResult<Self> {
        let stored = load_document::<Vec<Identity>, _>(&repo, AUTHORIZED_IDENTITIES_KEY)?;
        let first_launch = stored.is_none();

        let mut entries: Vec<Identity> = Vec::new();
        for identity in stored.unwrap_or(seed) {
            if !identity.is_empty() && !entries.contains(&identity) {
                entries.push(identity);
            }
        }

        let mut dirty = first_launch;
        for identity in &protected {
            if !entries.contains(identity) {
                entries.push(identity.clone());
                dirty = true;
            }
        }

        let registry = Self {
            repo,
            protected,
            entries,
        };
        if dirty {
            registry.persist()?;
        }
        info!(
            "event=registry_load module=service status=ok entries={} first_launch={}",
            registry.entries.len(),
            first_launch
        );
        Ok(registry)
    }

    /// Re-reads the document, discarding the in-memory view.
    pub fn reload(self) -> RegistryResult<Self> {
        let seed = self.protected.clone();
        Self::load_with(self.repo, self.protected, seed)
    }

    pub fn is_authorized(&self, identity: &str) -> bool {
        let identity = normalize(identity);
        self.entries.contains(&identity)
    }

    pub fn is_protected(&self, identity: &str) -> bool {
        let identity = normalize(identity);
        self.protected.contains(&identity)
    }

    /// Adds an identity; `Ok(false)` when it was already present.
    pub fn add(&mut self, identity: &str) -> RegistryResult<bool> {
        let identity = normalize(identity);
        if !identity.is_valid_email() {
            return Err(RegistryError::InvalidIdentity(identity.to_string()));
        }
        if self.entries.contains(&identity) {
            return Ok(false);
        }

        self.entries.push(identity.clone());
        if let Err(err) = self.persist() {
            self.entries.pop();
            return Err(err);
        }
        info!(
            "event=identity_add module=service status=ok entries={}",
            self.entries.len()
        );
        Ok(true)
    }

    /// Removes an identity.
    ///
    /// Returns `Ok(false)` with no change for protected identities and for
    /// identities that were not present.
    pub fn remove(&mut self, identity: &str) -> RegistryResult<bool> {
        match self.try_remove(identity) {
            Err(RegistryError::ProtectedEntryViolation(_)) => Ok(false),
            other => other,
        }
    }

    /// Like [`remove`](Self::remove) but surfaces protected refusals as
    /// `RegistryError::ProtectedEntryViolation`.
    pub fn try_remove(&mut self, identity: &str) -> RegistryResult<bool> {
        let identity = normalize(identity);
        if self.protected.contains(&identity) {
            warn!("event=identity_remove module=service status=rejected reason=protected");
            return Err(RegistryError::ProtectedEntryViolation(identity));
        }

        let Some(position) = self.entries.iter().position(|entry| *entry == identity) else {
            return Ok(false);
        };
        let removed = self.entries.remove(position);
        if let Err(err) = self.persist() {
            self.entries.insert(position, removed);
            return Err(err);
        }
        info!(
            "event=identity_remove module=service status=ok entries={}",
            self.entries.len()
        );
        Ok(true)
    }

    /// Authorized identities in insertion order.
    pub fn list(&self) -> &[Identity] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> RegistryResult<()> {
        save_document(&self.repo, AUTHORIZED_IDENTITIES_KEY, &self.entries)?;
        Ok(())
    }
}
