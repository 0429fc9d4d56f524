use parcel_core::db::migrations::{latest_version, schema_version};
use parcel_core::db::{open_db, open_db_in_memory, open_db_with_config, DbError};
use parcel_core::{Parcel, ParcelRepository, SqliteParcelStore, StoreConfig};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_parcel_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_object_exists(&conn, "table", "parcel");
    assert_object_exists(&conn, "index", "idx_parcel_client");
}

#[test]
fn reopening_file_database_keeps_data_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracker.db");

    let number = {
        let conn = open_db(&path).unwrap();
        let store = SqliteParcelStore::try_new(&conn).unwrap();
        store
            .add(&Parcel::with_created_at(1, "kept", "2026-10-19T00:00:00Z"))
            .unwrap()
    };

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    assert_eq!(store.get(number).unwrap().address, "kept");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

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
fn open_db_with_config_uses_configured_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("configured.db");
    let config = StoreConfig {
        busy_timeout_ms: 250,
        ..StoreConfig::file(&path)
    };

    let conn = open_db_with_config(&config).unwrap();
    assert_object_exists(&conn, "table", "parcel");
    assert!(path.exists());
}

fn assert_object_exists(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}

#[test]
fn oversized_busy_timeout_is_rejected_before_opening() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never-created.db");
    let config: StoreConfig = serde_json::from_value(serde_json::json!({
        "db_path": path,
        "busy_timeout_ms": 3_000_000_000_u64,
    }))
    .unwrap();

    match open_db_with_config(&config).unwrap_err() {
        DbError::InvalidConfig { field, reason } => {
            assert_eq!(field, "busy_timeout_ms");
            assert!(reason.contains("3000000000"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!path.exists());
}
