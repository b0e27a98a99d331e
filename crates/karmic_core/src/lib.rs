//! Persistence and content layer for the Karmic Matrix numerology app.
//! Business invariants around identities, reports and interpretations live
//! here; front-ends only call into these services.

pub mod config;
pub mod content;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, ConfigResult, CoreConfig, LoggingConfig, StorageConfig};
pub use content::enrich::enrich;
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::identity::{normalize, Identity};
pub use model::interpretation::{
    Category, InterpretationEntry, InterpretationKey, InterpretationKeyError,
    StoredInterpretation, DEFAULT_INTERPRETATION,
};
pub use model::report::{NumerologyNumbers, ReportId, ReportRecord};
pub use repo::document_repo::{
    DocumentRepository, RepoError, RepoResult, SqliteDocumentRepository, StoreTier,
};
pub use service::authorization_service::{AuthorizationRegistry, RegistryError, RegistryResult};
pub use service::interpretation_service::{ImportSummary, InterpretationRepository};
pub use service::matrix_service::{MatrixSection, MatrixService, MatrixView, NumerologyEngine};
pub use service::profile_service::ProfileStore;
pub use service::session_service::SessionGate;
pub use service::session_service::SessionError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
