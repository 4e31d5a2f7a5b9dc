// Integration tests for schema creation and seeding

use folio_store::db::{open, open_in_memory, StoreLocation};
use folio_store::migrations::apply_migrations;
use folio_store::repo::SqliteRepo;
use tempfile::TempDir;

fn table_exists(conn: &rusqlite::Connection, name: &str) -> bool {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        [name],
        |row| row.get::<_, i64>(0),
    )
    .unwrap()
        == 1
}

#[test]
fn test_schema_tables_created() {
    // Given: A fresh database
    let mut conn = open_in_memory().unwrap();

    // When: Migrations run
    apply_migrations(&mut conn).unwrap();

    // Then: Both entity tables and the version table exist
    assert!(table_exists(&conn, "Creator"));
    assert!(table_exists(&conn, "Work"));
    assert!(table_exists(&conn, "schema_version"));
}

#[test]
fn test_seed_inserted_once() {
    // Given: A migrated database
    let mut conn = open_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();

    // When: Migrations run again
    let applied = apply_migrations(&mut conn).unwrap();

    // Then: Nothing is re-applied and the seed rows are not duplicated
    assert_eq!(applied, 0);
    assert_eq!(SqliteRepo::list_creators(&conn).unwrap().len(), 1);
    let works = SqliteRepo::list_works(&conn).unwrap();
    assert_eq!(works.len(), 1);
    assert_eq!(works[0].id, 41);
    assert_eq!(works[0].creator_id, 1);
}

#[test]
fn test_file_database_keeps_schema_version() {
    // Given: A file database migrated once and closed
    let dir = TempDir::new().unwrap();
    let location = StoreLocation::File(dir.path().join("folio.db"));
    {
        let mut conn = open(&location).unwrap();
        assert_eq!(apply_migrations(&mut conn).unwrap(), 2);
    }

    // When: It is reopened and migrated again
    let mut conn = open(&location).unwrap();
    let applied = apply_migrations(&mut conn).unwrap();

    // Then: The recorded migrations are skipped
    assert_eq!(applied, 0);
    assert_eq!(SqliteRepo::list_creators(&conn).unwrap().len(), 1);
}
