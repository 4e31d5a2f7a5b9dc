//! Hydration layer - loads rows from SQLite into the identity map
//!
//! Rows are attached, never overwritten: an entry that is already tracked
//! keeps its pending edits when it is read again.

use crate::errors::{from_folio, Result};
use crate::repo::SqliteRepo;
use folio_core::ops::{CreatorHandle, IdentityMap};
use rusqlite::Connection;

/// Load a Creator and every Work it owns
///
/// Returns `None` if no row has this id.
pub fn load_creator_graph(
    conn: &Connection,
    creator_id: u64,
    map: &mut IdentityMap,
) -> Result<Option<CreatorHandle>> {
    let Some(creator) = SqliteRepo::get_creator(conn, creator_id)? else {
        return Ok(None);
    };

    let handle = map.attach_creator(creator);
    for work in SqliteRepo::list_works_for_creator(conn, creator_id)? {
        map.attach_work(work)
            .map_err(|e| from_folio("hydrate", e))?;
    }

    Ok(Some(handle))
}

/// Load a single Work, attaching its owning Creator first
///
/// Returns `false` if no row has this id.
pub fn load_work(conn: &Connection, work_id: u64, map: &mut IdentityMap) -> Result<bool> {
    if map.is_work_tracked(work_id) {
        return Ok(true);
    }

    let Some(work) = SqliteRepo::get_work(conn, work_id)? else {
        return Ok(false);
    };

    if !map.is_creator_tracked(work.creator_id) {
        if let Some(owner) = SqliteRepo::get_creator(conn, work.creator_id)? {
            map.attach_creator(owner);
        }
    }
    map.attach_work(work)
        .map_err(|e| from_folio("hydrate", e))?;

    Ok(true)
}

/// Load every Creator, and optionally every Work, in id order
pub fn load_all(conn: &Connection, map: &mut IdentityMap, include_works: bool) -> Result<()> {
    for creator in SqliteRepo::list_creators(conn)? {
        map.attach_creator(creator);
    }

    if include_works {
        for work in SqliteRepo::list_works(conn)? {
            map.attach_work(work)
                .map_err(|e| from_folio("hydrate", e))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::migrations::apply_migrations;

    fn setup() -> Connection {
        let mut conn = open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_load_creator_graph() {
        let conn = setup();
        let mut map = IdentityMap::new();

        let handle = load_creator_graph(&conn, 1, &mut map).unwrap().unwrap();

        let graph = map.graph(handle).unwrap();
        assert_eq!(graph.full_name, "Douglas Adams");
        assert_eq!(graph.works.len(), 1);
        assert_eq!(graph.works[0].id, 41);
        assert!(!map.has_changes());
    }

    #[test]
    fn test_load_missing_creator() {
        let conn = setup();
        let mut map = IdentityMap::new();

        assert!(load_creator_graph(&conn, 9, &mut map).unwrap().is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn test_load_work_attaches_owner() {
        let conn = setup();
        let mut map = IdentityMap::new();

        assert!(load_work(&conn, 41, &mut map).unwrap());
        assert!(map.find_creator(1).is_some());
        assert!(map.find_work(41).is_some());
        assert!(!load_work(&conn, 99, &mut map).unwrap());
    }

    #[test]
    fn test_load_all_without_works() {
        let conn = setup();
        let mut map = IdentityMap::new();

        load_all(&conn, &mut map, false).unwrap();

        assert_eq!(map.len(), (1, 0));
    }
}
