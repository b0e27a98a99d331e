//! Authored interpretation repository.
//!
//! # Responsibility
//! - Map `(category, number)` to authored title/content.
//! - Synthesize the default entry when nothing was authored.
//! - Bulk export/import for the admin surface.
//!
//! # Invariants
//! - Lookups compute `InterpretationKey::id()`; they never scan.
//! - Stored content is the raw authored text; enrichment happens on read.
//! - Every mutation rewrites the whole `interpretations` document.

use crate::model::interpretation::{
    Category, InterpretationEntry, InterpretationKey, StoredInterpretation,
};
use crate::repo::document_repo::{
    load_document, save_document, DocumentRepository, RepoResult, INTERPRETATIONS_KEY,
};
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

/// Whole `interpretations` document shape.
pub type InterpretationDocument = BTreeMap<String, StoredInterpretation>;

/// Outcome of [`InterpretationRepository::import_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    /// Ids that do not parse as `<category>-<number>`.
    pub skipped: Vec<String>,
}

/// Cached view of the `interpretations` document.
pub struct InterpretationRepository<R: DocumentRepository> {
    repo: R,
    entries: InterpretationDocument,
}

impl<R: DocumentRepository> InterpretationRepository<R> {
    /// Reads the document once; later reads are served from memory.
    pub fn load(repo: R) -> RepoResult<Self> {
        let stored = load_document::<InterpretationDocument, _>(&repo, INTERPRETATIONS_KEY)?
            .unwrap_or_default();
        let mut entries = InterpretationDocument::new();
        for (id, entry) in stored {
            match InterpretationKey::parse(&id) {
                Ok(key) => {
                    entries.insert(key.id(), entry);
                }
                Err(err) => warn!(
                    "event=interpretation_load module=service status=skipped id={} error={}",
                    id, err
                ),
            }
        }
        info!(
            "event=interpretation_load module=service status=ok entries={}",
            entries.len()
        );
        Ok(Self { repo, entries })
    }

    /// Re-reads the document, discarding the in-memory view.
    pub fn reload(self) -> RepoResult<Self> {
        Self::load(self.repo)
    }

    /// Creates or replaces one entry.
    pub fn set_entry(
        &mut self,
        category: Category,
        number: i32,
        title: &str,
        content: &str,
    ) -> RepoResult<InterpretationEntry> {
        let key = InterpretationKey::new(category, number);
        let stored = StoredInterpretation {
            title: title.to_string(),
            content: content.to_string(),
        };
        let previous = self.entries.insert(key.id(), stored.clone());
        if let Err(err) = self.persist() {
            match previous {
                Some(previous) => self.entries.insert(key.id(), previous),
                None => self.entries.remove(&key.id()),
            };
            return Err(err);
        }
        info!(
            "event=interpretation_set module=service status=ok id={} content_bytes={}",
            key.id(),
            content.len()
        );
        Ok(InterpretationEntry::from_stored(&key, &stored))
    }

    /// Returns the authored entry or the synthesized default. Never fails.
    pub fn get_entry(&self, category: Category, number: i32) -> InterpretationEntry {
        let key = InterpretationKey::new(category, number);
        match self.entries.get(&key.id()) {
            Some(stored) => InterpretationEntry::from_stored(&key, stored),
            None => InterpretationEntry::fallback(&key),
        }
    }

    pub fn has_entry(&self, category: Category, number: i32) -> bool {
        self.entries
            .contains_key(&InterpretationKey::new(category, number).id())
    }

    /// Deletes one entry; `Ok(false)` when there was nothing to delete.
    pub fn delete_entry(&mut self, category: Category, number: i32) -> RepoResult<bool> {
        let id = InterpretationKey::new(category, number).id();
        let Some(removed) = self.entries.remove(&id) else {
            return Ok(false);
        };
        if let Err(err) = self.persist() {
            self.entries.insert(id, removed);
            return Err(err);
        }
        info!("event=interpretation_delete module=service status=ok id={id}");
        Ok(true)
    }

    /// Every authored entry, ordered by id.
    pub fn list_all(&self) -> Vec<InterpretationEntry> {
        self.entries
            .iter()
            .map(|(id, stored)| InterpretationEntry {
                id: id.clone(),
                title: stored.title.clone(),
                content: stored.content.clone(),
            })
            .collect()
    }

    /// Id -> entry map for backups.
    pub fn export_all(&self) -> BTreeMap<String, InterpretationEntry> {
        self.list_all()
            .into_iter()
            .map(|entry| (entry.id.clone(), entry))
            .collect()
    }

    /// Merges a previously exported map; same-id entries are overwritten.
    ///
    /// Ids are re-derived from the parsed key so a backup written with
    /// `karmicSeal-07` lands on `karmicSeal-7`.
    pub fn import_all(
        &mut self,
        entries: BTreeMap<String, InterpretationEntry>,
    ) -> RepoResult<ImportSummary> {
        let mut summary = ImportSummary::default();
        let snapshot = self.entries.clone();
        for (id, entry) in entries {
            match InterpretationKey::parse(&id) {
                Ok(key) => {
                    self.entries.insert(
                        key.id(),
                        StoredInterpretation {
                            title: entry.title,
                            content: entry.content,
                        },
                    );
                    summary.imported += 1;
                }
                Err(err) => {
                    warn!(
                        "event=interpretation_import module=service status=skipped id={} error={}",
                        id, err
                    );
                    summary.skipped.push(id);
                }
            }
        }

        if summary.imported > 0 {
            if let Err(err) = self.persist() {
                self.entries = snapshot;
                return Err(err);
            }
        }
        info!(
            "event=interpretation_import module=service status=ok imported={} skipped={}",
            summary.imported,
            summary.skipped.len()
        );
        Ok(summary)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> RepoResult<()> {
        save_document(&self.repo, INTERPRETATIONS_KEY, &self.entries)
    }
}
