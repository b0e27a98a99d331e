use karmic_core::db::{open_db, open_db_in_memory};
use karmic_core::repo::document_repo::{CURRENT_IDENTITY_KEY, CURRENT_REPORT_ID_KEY};
use karmic_core::{
    AuthorizationRegistry, DocumentRepository, SessionError, SessionGate,
    SqliteDocumentRepository,
};
use uuid::Uuid;

#[test]
fn authorized_login_records_normalized_identity() {
    let conn = open_db_in_memory().unwrap();
    let mut registry = AuthorizationRegistry::load(SqliteDocumentRepository::durable(&conn)).unwrap();
    registry.add("a@x.com").unwrap();
    let mut session = SessionGate::restore(SqliteDocumentRepository::session(&conn)).unwrap();

    let identity = session.login(&registry, "A@X.com").unwrap();

    assert_eq!(identity.as_str(), "a@x.com");
    assert_eq!(session.current_identity(), Some(&identity));
    assert!(session.is_logged_in());
}

#[test]
fn unauthorized_login_is_denied_and_records_nothing() {
    let conn = open_db_in_memory().unwrap();
    let registry = AuthorizationRegistry::load(SqliteDocumentRepository::durable(&conn)).unwrap();
    let session_repo = SqliteDocumentRepository::session(&conn);
    let mut session = SessionGate::restore(session_repo).unwrap();

    let err = session.login(&registry, "stranger@x.com").unwrap_err();

    assert!(matches!(err, SessionError::AuthorizationDenied(_)));
    assert!(!session.is_logged_in());
    assert!(session_repo.load(CURRENT_IDENTITY_KEY).unwrap().is_none());
}

#[test]
fn state_is_restored_within_the_same_connection() {
    let conn = open_db_in_memory().unwrap();
    let registry = AuthorizationRegistry::load(SqliteDocumentRepository::durable(&conn)).unwrap();
    let report_id = Uuid::new_v4();
    {
        let mut session = SessionGate::restore(SqliteDocumentRepository::session(&conn)).unwrap();
        session.login(&registry, "teste@teste.com").unwrap();
        session.set_current_report(report_id).unwrap();
    }

    let session = SessionGate::restore(SqliteDocumentRepository::session(&conn)).unwrap();

    assert_eq!(
        session.current_identity().map(|identity| identity.as_str()),
        Some("teste@teste.com")
    );
    assert_eq!(session.current_report_id(), Some(report_id));
}

#[test]
fn session_does_not_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("karmic.db");
    {
        let conn = open_db(&path).unwrap();
        let registry =
            AuthorizationRegistry::load(SqliteDocumentRepository::durable(&conn)).unwrap();
        let mut session = SessionGate::restore(SqliteDocumentRepository::session(&conn)).unwrap();
        session.login(&registry, "teste@teste.com").unwrap();
    }

    let conn = open_db(&path).unwrap();
    let session = SessionGate::restore(SqliteDocumentRepository::session(&conn)).unwrap();
    assert!(!session.is_logged_in());
}

#[test]
fn logout_clears_identity_and_report() {
    let conn = open_db_in_memory().unwrap();
    let registry = AuthorizationRegistry::load(SqliteDocumentRepository::durable(&conn)).unwrap();
    let session_repo = SqliteDocumentRepository::session(&conn);
    let mut session = SessionGate::restore(session_repo).unwrap();
    session.login(&registry, "teste@teste.com").unwrap();
    session.set_current_report(Uuid::new_v4()).unwrap();

    session.logout().unwrap();

    assert!(session.current_identity().is_none());
    assert!(session.current_report_id().is_none());
    assert!(session_repo.load(CURRENT_IDENTITY_KEY).unwrap().is_none());
    assert!(session_repo.load(CURRENT_REPORT_ID_KEY).unwrap().is_none());
}

#[test]
fn switching_identity_drops_previous_report_selection() {
    let conn = open_db_in_memory().unwrap();
    let registry = AuthorizationRegistry::load(SqliteDocumentRepository::durable(&conn)).unwrap();
    let mut session = SessionGate::restore(SqliteDocumentRepository::session(&conn)).unwrap();
    let report_id = Uuid::new_v4();

    session.login(&registry, "teste@teste.com").unwrap();
    session.set_current_report(report_id).unwrap();
    session.login(&registry, "TESTE@teste.com").unwrap();
    assert_eq!(session.current_report_id(), Some(report_id));

    session.login(&registry, "projetovmtd@gmail.com").unwrap();
    assert_eq!(session.current_report_id(), None);
}

#[test]
fn login_never_writes_the_durable_tier() {
    let conn = open_db_in_memory().unwrap();
    let durable = SqliteDocumentRepository::durable(&conn);
    let registry = AuthorizationRegistry::load(durable).unwrap();
    let mut session = SessionGate::restore(SqliteDocumentRepository::session(&conn)).unwrap();

    session.login(&registry, "teste@teste.com").unwrap();

    assert!(durable.load(CURRENT_IDENTITY_KEY).unwrap().is_none());
}
