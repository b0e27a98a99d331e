//! Per-identity report collection.
//!
//! # Responsibility
//! - Append generated reports under their owner identity.
//! - Resolve which report is "current" for an identity.
//!
//! # Invariants
//! - Records of one identity are kept in creation order.
//! - Every write reads the full `user-profiles` document, appends and
//!   rewrites it. Two interleaved writers from the same device are
//!   last-writer-wins; nothing here merges.
//! - Records are decoded one at a time. A record that does not decode is
//!   skipped on read and written back untouched, so it never hides or
//!   destroys reports of other records or identities.
//! - Keys that normalize to the same identity are merged in key order.
//! - Unknown identities read as an empty collection, never as an error.

use crate::model::identity::{normalize, Identity};
use crate::model::report::{NumerologyNumbers, ReportId, ReportRecord};
use crate::repo::document_repo::{
    save_document, DocumentRepository, RepoError, RepoResult, USER_PROFILES_KEY,
};
use log::{info, warn};
use serde_json::Value;
use std::collections::BTreeMap;

/// `user-profiles` with each record still in stored JSON form.
pub type ProfileDocument = BTreeMap<Identity, Vec<Value>>;

/// Report store over the durable tier.
pub struct ProfileStore<R: DocumentRepository> {
    repo: R,
}

impl<R: DocumentRepository> ProfileStore<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates and persists a new report for `identity`.
    pub fn create_report(
        &self,
        identity: &str,
        display_name: &str,
        birth_date: &str,
        numbers: NumerologyNumbers,
    ) -> RepoResult<ReportRecord> {
        let identity = normalize(identity);
        let mut document = self.load_all()?;
        let record = ReportRecord::new(identity.clone(), display_name, birth_date, numbers);
        let encoded =
            serde_json::to_value(&record).map_err(|err| RepoError::Encode(err.to_string()))?;

        let reports = document.entry(identity).or_default();
        reports.push(encoded);
        let owned = reports.len();
        save_document(&self.repo, USER_PROFILES_KEY, &document)?;

        info!(
            "event=report_create module=service status=ok report_id={} owned={}",
            record.id, owned
        );
        Ok(record)
    }

    /// Reports of `identity` in creation order.
    pub fn list_reports(&self, identity: &str) -> RepoResult<Vec<ReportRecord>> {
        let identity = normalize(identity);
        let mut document = self.load_all()?;
        let stored = document.remove(&identity).unwrap_or_default();
        Ok(decode_records(&identity, stored))
    }

    pub fn get_report(&self, identity: &str, id: ReportId) -> RepoResult<Option<ReportRecord>> {
        let reports = self.list_reports(identity)?;
        Ok(reports.into_iter().find(|record| record.id == id))
    }

    /// Picks the report to display.
    ///
    /// The session selection wins when it names a report owned by
    /// `identity`; otherwise the most recently created report is used.
    pub fn resolve_current(
        &self,
        identity: &str,
        session_report_id: Option<ReportId>,
    ) -> RepoResult<Option<ReportRecord>> {
        let mut reports = self.list_reports(identity)?;
        if let Some(selected) = session_report_id {
            if let Some(position) = reports.iter().position(|record| record.id == selected) {
                return Ok(Some(reports.swap_remove(position)));
            }
        }
        Ok(reports.pop())
    }

    /// Number of readable reports per identity, for the admin listing.
    pub fn report_counts(&self) -> RepoResult<BTreeMap<Identity, usize>> {
        Ok(self
            .load_all()?
            .into_iter()
            .map(|(identity, stored)| {
                let readable = decode_records(&identity, stored).len();
                (identity, readable)
            })
            .collect())
    }

    fn load_all(&self) -> RepoResult<ProfileDocument> {
        let Some(value) = self.repo.load(USER_PROFILES_KEY)? else {
            return Ok(ProfileDocument::new());
        };
        let Value::Object(entries) = value else {
            warn!(
                "event=document_malformed module=service status=recovered key={} reason=not_an_object",
                USER_PROFILES_KEY
            );
            return Ok(ProfileDocument::new());
        };

        let mut document = ProfileDocument::new();
        for (key, records) in entries {
            let Value::Array(records) = records else {
                warn!(
                    "event=report_decode module=service status=skipped reason=not_a_list identity={}",
                    normalize(&key)
                );
                continue;
            };
            document.entry(normalize(&key)).or_default().extend(records);
        }
        Ok(document)
    }
}

fn decode_records(identity: &Identity, stored: Vec<Value>) -> Vec<ReportRecord> {
    stored
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<ReportRecord>(value) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(
                    "event=report_decode module=service status=skipped identity={} index={} error={}",
                    identity, index, err
                );
                None
            }
        })
        .collect()
}
