use chrono::NaiveDate;
use rusqlite::Connection;
use taskminder_core::db::migrations::latest_version;
use taskminder_core::db::{open_db, open_db_in_memory, DbError};
use taskminder_core::{SqliteTaskStore, TaskStore};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "tasks");
}

#[test]
fn opening_same_database_twice_is_idempotent_and_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.db");
    let deadline = NaiveDate::from_ymd_opt(2025, 9, 20)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap();

    let store = SqliteTaskStore::open(&path).unwrap();
    let id = store.create(1, "Buy milk", deadline).unwrap();
    drop(store);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    drop(conn);

    let store = SqliteTaskStore::open(&path).unwrap();
    let tasks = store.list(1).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, id);
    assert_eq!(tasks[0].description, "Buy milk");
}

#[test]
fn ids_are_not_reused_after_delete_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.db");
    let deadline = NaiveDate::from_ymd_opt(2025, 9, 20)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap();

    let store = SqliteTaskStore::open(&path).unwrap();
    let first = store.create(1, "first", deadline).unwrap();
    let second = store.create(1, "second", deadline).unwrap();
    assert!(store.delete(1, second).unwrap());
    drop(store);

    let store = SqliteTaskStore::open(&path).unwrap();
    let third = store.create(1, "third", deadline).unwrap();
    assert!(third > second);
    assert_ne!(third, first);
}

#[test]
fn legacy_table_without_version_is_adopted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            description TEXT NOT NULL,
            deadline INTEGER NOT NULL,
            reminded INTEGER NOT NULL DEFAULT 0
        );
        INSERT INTO tasks (owner_id, description, deadline, reminded)
        VALUES (7, 'kept', 1758391200, 0);",
    )
    .unwrap();
    drop(conn);

    let store = SqliteTaskStore::open(&path).unwrap();
    let tasks = store.list(7).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].description, "kept");
}

#[test]
fn user_id_table_with_text_deadlines_is_imported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER,
            description TEXT,
            deadline TEXT,
            reminded INTEGER DEFAULT 0
        );
        INSERT INTO tasks (user_id, description, deadline, reminded) VALUES
            (42, 'Buy bread', '2025-09-20 18:00', 0),
            (42, 'Call mom', '2025-09-19 09:30', 1),
            (42, '   ', '2025-09-21 10:00', 0),
            (42, 'someday', 'tomorrow', 0),
            (7, 'Pay rent', '2025-10-01 12:00', NULL),
            (NULL, 'orphan', '2025-09-20 18:00', 0);",
    )
    .unwrap();
    drop(conn);

    let store = SqliteTaskStore::open(&path).unwrap();

    let tasks = store.list(42).unwrap();
    let summary: Vec<_> = tasks
        .iter()
        .map(|task| (task.id, task.description.as_str(), task.reminded))
        .collect();
    assert_eq!(summary, vec![(2, "Call mom", true), (1, "Buy bread", false)]);
    assert_eq!(
        tasks[1].deadline,
        NaiveDate::from_ymd_opt(2025, 9, 20)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    );

    let rent = store.list(7).unwrap();
    assert_eq!(rent.len(), 1);
    assert_eq!(rent[0].id, 5);
    assert!(!rent[0].reminded);

    // Highest legacy id was 6 even though that row was dropped.
    let next = store.create(42, "new", tasks[1].deadline).unwrap();
    assert!(next > 6);
    drop(store);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_missing(&conn, "tasks_user_id_legacy");
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

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0)).unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

fn assert_table_missing(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 0, "table {table_name} still exists");
}
