//! Ephemeral login session.
//!
//! # Responsibility
//! - Track the authenticated identity and the selected report id.
//! - Mirror both values into the session tier so a reload within the same
//!   connection restores them.
//!
//! # Invariants
//! - Session values are never written to the durable tier.
//! - Logout clears both values in memory and in the session tier.
//! - A report id selected for one identity does not survive a login as
//!   another identity.

use crate::model::identity::{normalize, Identity};
use crate::model::report::ReportId;
use crate::repo::document_repo::{
    load_document, save_document, DocumentRepository, RepoError, CURRENT_IDENTITY_KEY,
    CURRENT_REPORT_ID_KEY,
};
use crate::service::authorization_service::AuthorizationRegistry;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum SessionError {
    /// Login attempted with an identity absent from the registry.
    AuthorizationDenied(Identity),
    Repo(RepoError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthorizationDenied(identity) => {
                write!(f, "identity `{identity}` is not authorized")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AuthorizationDenied(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for SessionError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Current identity and selected report for one browsing session.
pub struct SessionGate<R: DocumentRepository> {
    repo: R,
    identity: Option<Identity>,
    report_id: Option<ReportId>,
}

impl<R: DocumentRepository> SessionGate<R> {
    /// Restores state from the session tier `repo`.
    pub fn restore(repo: R) -> Result<Self, SessionError> {
        let identity = load_document::<Identity, _>(&repo, CURRENT_IDENTITY_KEY)?
            .filter(|identity| !identity.is_empty());
        let report_id = load_document::<ReportId, _>(&repo, CURRENT_REPORT_ID_KEY)?;
        Ok(Self {
            repo,
            identity,
            report_id,
        })
    }

    /// Logs `identity` in when the registry authorizes it.
    pub fn login<A: DocumentRepository>(
        &mut self,
        registry: &AuthorizationRegistry<A>,
        identity: &str,
    ) -> Result<Identity, SessionError> {
        let identity = normalize(identity);
        if !registry.is_authorized(identity.as_str()) {
            warn!("event=login module=session status=denied");
            return Err(SessionError::AuthorizationDenied(identity));
        }

        if self.identity.as_ref() != Some(&identity) && self.report_id.is_some() {
            self.report_id = None;
            self.repo.remove(CURRENT_REPORT_ID_KEY)?;
        }
        save_document(&self.repo, CURRENT_IDENTITY_KEY, &identity)?;
        self.identity = Some(identity.clone());
        info!("event=login module=session status=ok");
        Ok(identity)
    }

    /// Clears identity and selected report.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.identity = None;
        self.report_id = None;
        self.repo.remove(CURRENT_IDENTITY_KEY)?;
        self.repo.remove(CURRENT_REPORT_ID_KEY)?;
        info!("event=logout module=session status=ok");
        Ok(())
    }

    pub fn current_identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.identity.is_some()
    }

    /// Selects the report shown by default; independent of the identity.
    pub fn set_current_report(&mut self, id: ReportId) -> Result<(), SessionError> {
        save_document(&self.repo, CURRENT_REPORT_ID_KEY, &id)?;
        self.report_id = Some(id);
        Ok(())
    }

    pub fn current_report_id(&self) -> Option<ReportId> {
        self.report_id
    }
}
