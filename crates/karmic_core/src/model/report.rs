//! Report ("map") records produced by the numerology engine.
//!
//! # Invariants
//! - `id` is stable and never reused for another report.
//! - Every numeric field is required; a document missing one is malformed.
//! - Records are never mutated after creation.

use crate::model::identity::Identity;
use crate::model::interpretation::Category;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier of one generated report.
pub type ReportId = Uuid;

/// The eight named values computed for one birth date.
///
/// Semantically opaque to this crate; every `i32` is accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NumerologyNumbers {
    pub karmic_seal: i32,
    pub destiny_call: i32,
    pub karma_portal: i32,
    pub karmic_inheritance: i32,
    pub karmic_reprogramming: i32,
    pub cycle_prophecy: i32,
    pub spiritual_mark: i32,
    pub manifestation_enigma: i32,
}

impl NumerologyNumbers {
    /// Returns the value computed for `category`.
    pub fn get(&self, category: Category) -> i32 {
        match category {
            Category::KarmicSeal => self.karmic_seal,
            Category::DestinyCall => self.destiny_call,
            Category::KarmaPortal => self.karma_portal,
            Category::KarmicInheritance => self.karmic_inheritance,
            Category::KarmicReprogramming => self.karmic_reprogramming,
            Category::CycleProphecy => self.cycle_prophecy,
            Category::SpiritualMark => self.spiritual_mark,
            Category::ManifestationEnigma => self.manifestation_enigma,
        }
    }

    /// Pairs every category with its value, in display order.
    pub fn entries(&self) -> [(Category, i32); 8] {
        Category::ALL.map(|category| (category, self.get(category)))
    }
}

/// One persisted report owned by an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    pub id: ReportId,
    pub identity: Identity,
    pub display_name: String,
    /// Passed through verbatim from the profile form.
    pub birth_date: String,
    pub numbers: NumerologyNumbers,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl ReportRecord {
    /// Creates a record with a generated id stamped with the current time.
    pub fn new(
        identity: Identity,
        display_name: impl Into<String>,
        birth_date: impl Into<String>,
        numbers: NumerologyNumbers,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity,
            display_name: display_name.into(),
            birth_date: birth_date.into(),
            numbers,
            created_at: now_epoch_ms(),
        }
    }
}

pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
