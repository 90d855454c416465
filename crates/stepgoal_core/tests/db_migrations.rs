use rusqlite::Connection;
use stepgoal_core::db::migrations::latest_version;
use stepgoal_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "preferences");
}

#[test]
fn schema_has_single_preferences_migration() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(latest_version(), 1);
    // Lookups go through the (namespace, key) primary key only.
    assert_eq!(
        sqlite_master_count(&conn, "index", "idx_preferences_namespace_updated"),
        0
    );
}

#[test]
fn reopening_preference_file_keeps_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("step_tracker.sqlite3");

    let first = open_db(&path).unwrap();
    assert_eq!(schema_version(&first), latest_version());
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    assert_table_exists(&second, "preferences");
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn preferences_reject_rows_with_both_value_types() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO preferences (namespace, key, int_value, text_value)
         VALUES ('step_tracker', 'step_goal', 1, 'one');",
        [],
    );
    assert!(result.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, name: &str) {
    assert_eq!(sqlite_master_count(conn, "table", name), 1, "table {name} missing");
}

fn sqlite_master_count(conn: &Connection, kind: &str, name: &str) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1 AND name = ?2;",
        [kind, name],
        |row| row.get(0),
    )
    .unwrap()
}
