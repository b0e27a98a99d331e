use karmic_core::db::open_db_in_memory;
use karmic_core::repo::document_repo::USER_PROFILES_KEY;
use karmic_core::{DocumentRepository, NumerologyNumbers, ProfileStore, SqliteDocumentRepository};
use serde_json::json;
use uuid::Uuid;

fn numbers(seed: i32) -> NumerologyNumbers {
    NumerologyNumbers {
        karmic_seal: seed,
        destiny_call: seed + 1,
        karma_portal: seed + 2,
        karmic_inheritance: seed + 3,
        karmic_reprogramming: seed + 4,
        cycle_prophecy: seed + 5,
        spiritual_mark: seed + 6,
        manifestation_enigma: seed + 7,
    }
}

#[test]
fn reports_are_listed_in_creation_order_and_latest_is_current() {
    let conn = open_db_in_memory().unwrap();
    let store = ProfileStore::new(SqliteDocumentRepository::durable(&conn));

    let first = store
        .create_report("a@x.com", "Ana", "1990-04-12", numbers(1))
        .unwrap();
    let second = store
        .create_report("A@X.COM", "Ana Maria", "1990-04-12", numbers(2))
        .unwrap();

    let reports = store.list_reports("a@x.com").unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].id, first.id);
    assert_eq!(reports[1].id, second.id);

    let current = store.resolve_current("a@x.com", None).unwrap().unwrap();
    assert_eq!(current.id, second.id);
}

#[test]
fn session_selection_wins_when_owned() {
    let conn = open_db_in_memory().unwrap();
    let store = ProfileStore::new(SqliteDocumentRepository::durable(&conn));
    let first = store
        .create_report("a@x.com", "Ana", "1990-04-12", numbers(1))
        .unwrap();
    store
        .create_report("a@x.com", "Ana", "1991-05-13", numbers(2))
        .unwrap();

    let current = store.resolve_current("a@x.com", Some(first.id)).unwrap().unwrap();
    assert_eq!(current.id, first.id);

    let fallback = store
        .resolve_current("a@x.com", Some(Uuid::new_v4()))
        .unwrap()
        .unwrap();
    assert_ne!(fallback.id, first.id);
}

#[test]
fn reports_of_other_identities_are_not_visible() {
    let conn = open_db_in_memory().unwrap();
    let store = ProfileStore::new(SqliteDocumentRepository::durable(&conn));
    let foreign = store
        .create_report("b@x.com", "Bia", "1985-01-01", numbers(3))
        .unwrap();

    assert!(store.get_report("a@x.com", foreign.id).unwrap().is_none());
    assert!(store.get_report("b@x.com", foreign.id).unwrap().is_some());
    assert!(store.resolve_current("a@x.com", Some(foreign.id)).unwrap().is_none());
}

#[test]
fn identity_without_reports_has_no_current() {
    let conn = open_db_in_memory().unwrap();
    let store = ProfileStore::new(SqliteDocumentRepository::durable(&conn));

    assert!(store.list_reports("nobody@x.com").unwrap().is_empty());
    assert!(store.resolve_current("nobody@x.com", None).unwrap().is_none());
}

#[test]
fn stored_shape_is_keyed_by_normalized_identity() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::durable(&conn);
    let store = ProfileStore::new(repo);
    store
        .create_report(" A@X.com", "Ana", "12/04/1990", numbers(1))
        .unwrap();

    let document = repo.load(USER_PROFILES_KEY).unwrap().unwrap();
    let reports = document["a@x.com"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["birthDate"], "12/04/1990");
    assert_eq!(reports[0]["numbers"]["manifestationEnigma"], 8);
}

#[test]
fn report_counts_cover_every_identity() {
    let conn = open_db_in_memory().unwrap();
    let store = ProfileStore::new(SqliteDocumentRepository::durable(&conn));
    store.create_report("a@x.com", "Ana", "d", numbers(1)).unwrap();
    store.create_report("a@x.com", "Ana", "d", numbers(1)).unwrap();
    store.create_report("b@x.com", "Bia", "d", numbers(1)).unwrap();

    let counts: Vec<(String, usize)> = store
        .report_counts()
        .unwrap()
        .into_iter()
        .map(|(identity, count)| (identity.as_str().to_string(), count))
        .collect();
    assert_eq!(
        counts,
        vec![("a@x.com".to_string(), 2), ("b@x.com".to_string(), 1)]
    );
}

#[test]
fn malformed_profiles_document_reads_as_empty() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::durable(&conn);
    repo.save(USER_PROFILES_KEY, &json!({ "a@x.com": [{ "bogus": true }] }))
        .unwrap();
    let store = ProfileStore::new(repo);

    assert!(store.list_reports("a@x.com").unwrap().is_empty());
}

#[test]
fn one_bad_record_hides_only_itself_and_survives_writes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::durable(&conn);
    let store = ProfileStore::new(repo);
    store.create_report("a@x.com", "Ana", "d", numbers(1)).unwrap();
    store.create_report("b@x.com", "Bia", "d", numbers(2)).unwrap();
    store.create_report("b@x.com", "Bia", "d", numbers(3)).unwrap();

    let mut document = repo.load(USER_PROFILES_KEY).unwrap().unwrap();
    document["b@x.com"][0]["numbers"]["lifePath"] = json!(3);
    repo.save(USER_PROFILES_KEY, &document).unwrap();

    assert_eq!(store.list_reports("a@x.com").unwrap().len(), 1);
    assert_eq!(store.list_reports("b@x.com").unwrap().len(), 1);

    store.create_report("c@x.com", "Caio", "d", numbers(4)).unwrap();

    assert_eq!(store.list_reports("a@x.com").unwrap().len(), 1);
    assert_eq!(store.list_reports("b@x.com").unwrap().len(), 1);
    assert_eq!(store.list_reports("c@x.com").unwrap().len(), 1);
    let stored = repo.load(USER_PROFILES_KEY).unwrap().unwrap();
    assert_eq!(stored["b@x.com"].as_array().unwrap().len(), 2);
    assert_eq!(stored["b@x.com"][0]["numbers"]["lifePath"], 3);
}

#[test]
fn keys_normalizing_to_one_identity_are_merged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::durable(&conn);
    let store = ProfileStore::new(repo);
    let first = store.create_report("a@x.com", "Ana", "d", numbers(1)).unwrap();
    let second = store.create_report("b@x.com", "Ana", "d", numbers(2)).unwrap();

    let stored = repo.load(USER_PROFILES_KEY).unwrap().unwrap();
    repo.save(
        USER_PROFILES_KEY,
        &json!({
            "A@X.com": stored["a@x.com"].clone(),
            "a@x.com": stored["b@x.com"].clone(),
        }),
    )
    .unwrap();

    let ids: Vec<_> = store
        .list_reports("a@x.com")
        .unwrap()
        .into_iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);
    assert_eq!(store.report_counts().unwrap().len(), 1);
}

#[test]
fn non_list_entry_is_skipped_without_hiding_others() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::durable(&conn);
    let store = ProfileStore::new(repo);
    let kept = store.create_report("a@x.com", "Ana", "d", numbers(1)).unwrap();

    let mut document = repo.load(USER_PROFILES_KEY).unwrap().unwrap();
    document["b@x.com"] = json!("broken");
    repo.save(USER_PROFILES_KEY, &document).unwrap();

    assert_eq!(store.list_reports("a@x.com").unwrap()[0].id, kept.id);
    assert!(store.list_reports("b@x.com").unwrap().is_empty());
}
