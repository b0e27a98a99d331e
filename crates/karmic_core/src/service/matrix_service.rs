//! Matrix assembly for the display layer.
//!
//! # Responsibility
//! - Create a profile report from a birth date via a pluggable engine.
//! - Resolve the current report of the logged-in identity and pair each
//!   category number with its enriched interpretation.
//!
//! # Invariants
//! - Sections always follow `Category::ALL` order.
//! - Missing interpretations render the default text, never an error.

use crate::content::enrich::enrich;
use crate::model::interpretation::Category;
use crate::model::report::{NumerologyNumbers, ReportRecord};
use crate::repo::document_repo::{DocumentRepository, RepoResult};
use crate::service::interpretation_service::InterpretationRepository;
use crate::service::profile_service::ProfileStore;
use crate::service::session_service::SessionGate;
use log::info;
use serde::Serialize;

/// Numerology calculation seam.
///
/// The arithmetic lives outside this crate; the core only stores results.
pub trait NumerologyEngine {
    fn compute(&self, birth_date: &str) -> NumerologyNumbers;
}

impl<F> NumerologyEngine for F
where
    F: Fn(&str) -> NumerologyNumbers,
{
    fn compute(&self, birth_date: &str) -> NumerologyNumbers {
        self(birth_date)
    }
}

/// One rendered category of a matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixSection {
    pub category: Category,
    pub number: i32,
    pub title: String,
    pub html: String,
    /// `true` when no interpretation was authored for this cell.
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixView {
    pub report: ReportRecord,
    pub sections: Vec<MatrixSection>,
}

pub struct MatrixService<'a, P: DocumentRepository, I: DocumentRepository> {
    profiles: &'a ProfileStore<P>,
    interpretations: &'a InterpretationRepository<I>,
}

impl<'a, P: DocumentRepository, I: DocumentRepository> MatrixService<'a, P, I> {
    pub fn new(
        profiles: &'a ProfileStore<P>,
        interpretations: &'a InterpretationRepository<I>,
    ) -> Self {
        Self {
            profiles,
            interpretations,
        }
    }

    /// Computes numbers for `birth_date` and stores a new report.
    pub fn create_profile<E: NumerologyEngine + ?Sized>(
        &self,
        engine: &E,
        identity: &str,
        display_name: &str,
        birth_date: &str,
    ) -> RepoResult<ReportRecord> {
        let numbers = engine.compute(birth_date);
        self.profiles
            .create_report(identity, display_name, birth_date, numbers)
    }

    /// Matrix of the session's current report.
    ///
    /// `None` when nobody is logged in or the identity owns no report yet.
    pub fn current_matrix<S: DocumentRepository>(
        &self,
        session: &SessionGate<S>,
    ) -> RepoResult<Option<MatrixView>> {
        let Some(identity) = session.current_identity() else {
            return Ok(None);
        };
        let report = self
            .profiles
            .resolve_current(identity.as_str(), session.current_report_id())?;
        let Some(report) = report else {
            info!("event=matrix_resolve module=service status=no_report");
            return Ok(None);
        };
        Ok(Some(self.render(report)))
    }

    /// Pairs every category number of `report` with its interpretation.
    pub fn render(&self, report: ReportRecord) -> MatrixView {
        let sections = report
            .numbers
            .entries()
            .into_iter()
            .map(|(category, number)| {
                let is_default = !self.interpretations.has_entry(category, number);
                let entry = self.interpretations.get_entry(category, number);
                MatrixSection {
                    category,
                    number,
                    title: entry.title,
                    html: enrich(&entry.content),
                    is_default,
                }
            })
            .collect();
        MatrixView { report, sections }
    }
}
