use karmic_core::db::open_db_in_memory;
use karmic_core::{
    AuthorizationRegistry, Category, InterpretationRepository, MatrixService, NumerologyEngine,
    NumerologyNumbers, ProfileStore, SessionGate, SqliteDocumentRepository,
};

struct SumOfDigits;

impl NumerologyEngine for SumOfDigits {
    fn compute(&self, birth_date: &str) -> NumerologyNumbers {
        let sum: i32 = birth_date
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(|d| d as i32)
            .sum();
        NumerologyNumbers {
            karmic_seal: sum,
            destiny_call: sum + 1,
            karma_portal: sum + 2,
            karmic_inheritance: sum + 3,
            karmic_reprogramming: sum + 4,
            cycle_prophecy: sum + 5,
            spiritual_mark: sum + 6,
            manifestation_enigma: sum + 7,
        }
    }
}

#[test]
fn current_matrix_follows_login_and_latest_report() {
    let conn = open_db_in_memory().unwrap();
    let durable = SqliteDocumentRepository::durable(&conn);
    let mut registry = AuthorizationRegistry::load(durable).unwrap();
    registry.add("a@x.com").unwrap();
    let mut session = SessionGate::restore(SqliteDocumentRepository::session(&conn)).unwrap();
    let profiles = ProfileStore::new(durable);
    let mut interpretations = InterpretationRepository::load(durable).unwrap();
    interpretations
        .set_entry(Category::KarmicSeal, 3, "Três", "Plain text.\n\nSecond block.")
        .unwrap();

    let service = MatrixService::new(&profiles, &interpretations);
    assert!(service.current_matrix(&session).unwrap().is_none());

    session.login(&registry, "A@x.com").unwrap();
    assert!(service.current_matrix(&session).unwrap().is_none());

    service
        .create_profile(&SumOfDigits, "a@x.com", "Ana", "2000-01-01")
        .unwrap();
    let latest = service
        .create_profile(&SumOfDigits, "a@x.com", "Ana", "2000-01-00")
        .unwrap();
    assert_eq!(latest.birth_date, "2000-01-00");

    let view = service.current_matrix(&session).unwrap().unwrap();
    assert_eq!(view.report.id, latest.id);
    let order: Vec<Category> = view.sections.iter().map(|s| s.category).collect();
    assert_eq!(order, Category::ALL.to_vec());

    let seal = &view.sections[0];
    assert_eq!(seal.number, 3);
    assert_eq!(seal.title, "Três");
    assert!(!seal.is_default);
    assert_eq!(seal.html.matches("<p ").count(), 2);
    assert!(view.sections[1].is_default);
}

#[test]
fn selected_report_overrides_latest() {
    let conn = open_db_in_memory().unwrap();
    let durable = SqliteDocumentRepository::durable(&conn);
    let registry = AuthorizationRegistry::load(durable).unwrap();
    let mut session = SessionGate::restore(SqliteDocumentRepository::session(&conn)).unwrap();
    let profiles = ProfileStore::new(durable);
    let interpretations = InterpretationRepository::load(durable).unwrap();
    let service = MatrixService::new(&profiles, &interpretations);

    session.login(&registry, "teste@teste.com").unwrap();
    let first = service
        .create_profile(&SumOfDigits, "teste@teste.com", "T", "1990-01-01")
        .unwrap();
    service
        .create_profile(&SumOfDigits, "teste@teste.com", "T", "1991-01-01")
        .unwrap();
    session.set_current_report(first.id).unwrap();

    let view = service.current_matrix(&session).unwrap().unwrap();
    assert_eq!(view.report.id, first.id);
}
