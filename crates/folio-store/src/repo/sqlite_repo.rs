//! SQLite repository implementation
//!
//! Row-level reads and writes for the Creator and Work tables. Functions take
//! `&Connection`, so they run equally inside a `Transaction`.

use crate::errors::{from_rusqlite, invalid_rowid, Result};
use folio_core::model::{Creator, Work};
use rusqlite::{Connection, OptionalExtension, Row};

const CREATOR_COLUMNS: &str = "Id, FullName, Born, Died, PrimaryLanguage";
const WORK_COLUMNS: &str = "Id, Title, Language, CreatorId";

/// SQLite repository for Creators and Works
pub struct SqliteRepo;

impl SqliteRepo {
    /// Insert a Creator's scalar columns and return the assigned id
    ///
    /// The row's own id is ignored; the store assigns one.
    pub fn insert_creator(conn: &Connection, creator: &Creator) -> Result<u64> {
        conn.execute(
            "INSERT INTO Creator (FullName, Born, Died, PrimaryLanguage)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                creator.full_name,
                creator.born,
                creator.died,
                creator.primary_language,
            ],
        )
        .map_err(from_rusqlite)?;

        assigned_id(conn)
    }

    /// Overwrite every scalar column of an existing Creator
    ///
    /// Returns the number of rows affected (0 if the row is gone).
    pub fn update_creator(conn: &Connection, creator: &Creator) -> Result<usize> {
        conn.execute(
            "UPDATE Creator
             SET FullName = ?2, Born = ?3, Died = ?4, PrimaryLanguage = ?5
             WHERE Id = ?1",
            rusqlite::params![
                creator.id,
                creator.full_name,
                creator.born,
                creator.died,
                creator.primary_language,
            ],
        )
        .map_err(from_rusqlite)
    }

    /// Delete a Creator; owned Work rows go with it (ON DELETE CASCADE)
    pub fn delete_creator(conn: &Connection, creator_id: u64) -> Result<usize> {
        conn.execute("DELETE FROM Creator WHERE Id = ?1", [creator_id])
            .map_err(from_rusqlite)
    }

    /// Insert a Work owned by `creator_id` and return the assigned id
    pub fn insert_work(conn: &Connection, work: &Work, creator_id: u64) -> Result<u64> {
        conn.execute(
            "INSERT INTO Work (Title, Language, CreatorId) VALUES (?1, ?2, ?3)",
            rusqlite::params![work.title, work.language, creator_id],
        )
        .map_err(from_rusqlite)?;

        assigned_id(conn)
    }

    /// Overwrite the title and language of an existing Work
    pub fn update_work(conn: &Connection, work: &Work) -> Result<usize> {
        conn.execute(
            "UPDATE Work SET Title = ?2, Language = ?3 WHERE Id = ?1",
            rusqlite::params![work.id, work.title, work.language],
        )
        .map_err(from_rusqlite)
    }

    pub fn delete_work(conn: &Connection, work_id: u64) -> Result<usize> {
        conn.execute("DELETE FROM Work WHERE Id = ?1", [work_id])
            .map_err(from_rusqlite)
    }

    /// Get a Creator's scalar columns by id (works left empty)
    ///
    /// Ids outside SQLite's integer range cannot name a row and yield `None`.
    pub fn get_creator(conn: &Connection, creator_id: u64) -> Result<Option<Creator>> {
        let Ok(creator_id) = i64::try_from(creator_id) else {
            return Ok(None);
        };
        conn.query_row(
            &format!("SELECT {} FROM Creator WHERE Id = ?1", CREATOR_COLUMNS),
            [creator_id],
            creator_from_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    pub fn get_work(conn: &Connection, work_id: u64) -> Result<Option<Work>> {
        let Ok(work_id) = i64::try_from(work_id) else {
            return Ok(None);
        };
        conn.query_row(
            &format!("SELECT {} FROM Work WHERE Id = ?1", WORK_COLUMNS),
            [work_id],
            work_from_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// List every Creator ordered by id (works left empty)
    pub fn list_creators(conn: &Connection) -> Result<Vec<Creator>> {
        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM Creator ORDER BY Id", CREATOR_COLUMNS))
            .map_err(from_rusqlite)?;

        let rows = stmt
            .query_map([], creator_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    /// List every Work ordered by id
    pub fn list_works(conn: &Connection) -> Result<Vec<Work>> {
        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM Work ORDER BY Id", WORK_COLUMNS))
            .map_err(from_rusqlite)?;

        let rows = stmt
            .query_map([], work_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    /// List the Works owned by one Creator ordered by id
    pub fn list_works_for_creator(conn: &Connection, creator_id: u64) -> Result<Vec<Work>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM Work WHERE CreatorId = ?1 ORDER BY Id",
                WORK_COLUMNS
            ))
            .map_err(from_rusqlite)?;

        let rows = stmt
            .query_map([creator_id], work_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }
}

fn assigned_id(conn: &Connection) -> Result<u64> {
    let rowid = conn.last_insert_rowid();
    u64::try_from(rowid).map_err(|_| invalid_rowid(rowid))
}

fn creator_from_row(row: &Row<'_>) -> rusqlite::Result<Creator> {
    Ok(Creator {
        id: row.get(0)?,
        full_name: row.get(1)?,
        born: row.get(2)?,
        died: row.get(3)?,
        primary_language: row.get(4)?,
        works: Vec::new(),
    })
}

fn work_from_row(row: &Row<'_>) -> rusqlite::Result<Work> {
    Ok(Work {
        id: row.get(0)?,
        title: row.get(1)?,
        language: row.get(2)?,
        creator_id: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::migrations::apply_migrations;
    use chrono::NaiveDate;

    fn setup() -> Connection {
        let mut conn = open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_seed_rows_round_trip_dates() {
        let conn = setup();
        let creator = SqliteRepo::get_creator(&conn, 1).unwrap().unwrap();

        assert_eq!(creator.full_name, "Douglas Adams");
        assert_eq!(creator.born, NaiveDate::from_ymd_opt(1952, 4, 11));
        assert_eq!(creator.died, NaiveDate::from_ymd_opt(2001, 5, 11));
        assert_eq!(creator.primary_language.as_deref(), Some("EN"));
    }

    #[test]
    fn test_insert_assigns_next_id() {
        let conn = setup();
        let creator_id = SqliteRepo::insert_creator(&conn, &Creator::new("Daniel Abraham")).unwrap();
        let work_id =
            SqliteRepo::insert_work(&conn, &Work::new("The Dragon's Path"), creator_id).unwrap();

        assert_eq!(creator_id, 2);
        assert_eq!(work_id, 42);
        assert_eq!(
            SqliteRepo::get_work(&conn, 42).unwrap().unwrap().creator_id,
            2
        );
    }

    #[test]
    fn test_update_overwrites_all_columns() {
        let conn = setup();
        SqliteRepo::update_creator(&conn, &Creator::new("D. Adams").with_id(1)).unwrap();

        let creator = SqliteRepo::get_creator(&conn, 1).unwrap().unwrap();
        assert_eq!(creator.full_name, "D. Adams");
        assert_eq!(creator.born, None);
        assert_eq!(creator.primary_language, None);
    }

    #[test]
    fn test_delete_creator_cascades() {
        let conn = setup();
        assert_eq!(SqliteRepo::delete_creator(&conn, 1).unwrap(), 1);
        assert!(SqliteRepo::list_works(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_insert_work_for_missing_creator_violates_constraint() {
        let conn = setup();
        let err = SqliteRepo::insert_work(&conn, &Work::new("Lost"), 99).unwrap_err();
        assert_eq!(
            err.kind(),
            folio_core::errors::ExErrorKind::ConstraintViolation
        );
    }

    #[test]
    fn test_ids_beyond_sqlite_range_are_none() {
        let conn = setup();
        assert!(SqliteRepo::get_creator(&conn, u64::MAX).unwrap().is_none());
        assert!(SqliteRepo::get_work(&conn, 1 << 63).unwrap().is_none());
    }

    #[test]
    fn test_deleted_max_id_is_not_reused() {
        let conn = setup();
        let first = SqliteRepo::insert_creator(&conn, &Creator::new("Daniel Abraham")).unwrap();
        SqliteRepo::delete_creator(&conn, first).unwrap();

        let second = SqliteRepo::insert_creator(&conn, &Creator::new("James S. A. Corey")).unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 3);
    }

    #[test]
    fn test_missing_rows_are_none() {
        let conn = setup();
        assert!(SqliteRepo::get_creator(&conn, 7).unwrap().is_none());
        assert!(SqliteRepo::get_work(&conn, 7).unwrap().is_none());
        assert!(SqliteRepo::list_works_for_creator(&conn, 7).unwrap().is_empty());
    }
}
