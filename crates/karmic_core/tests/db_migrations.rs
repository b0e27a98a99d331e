use karmic_core::db::migrations::latest_version;
use karmic_core::db::{open_db, open_db_in_memory, DbError, DURABLE_TABLE, SESSION_TABLE};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_both_tiers() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert!(table_exists(&conn, "sqlite_master", DURABLE_TABLE));
    assert!(table_exists(&conn, "sqlite_temp_master", SESSION_TABLE));
}

#[test]
fn session_table_never_reaches_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("karmic.db");

    let conn = open_db(&path).unwrap();
    assert!(!table_exists(&conn, "sqlite_master", SESSION_TABLE));
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("karmic.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert!(table_exists(&conn_second, "sqlite_master", DURABLE_TABLE));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::StoreFromNewerBuild {
            store_version,
            supported_version,
        } => {
            assert_eq!(store_version, 999);
            assert_eq!(supported_version, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn table_exists(conn: &Connection, catalog: &str, table_name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {catalog} WHERE type = 'table' AND name = ?1);"
            ),
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}
