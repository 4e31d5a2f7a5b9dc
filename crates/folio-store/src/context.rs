//! Persistence context - the session over one borrowed connection
//!
//! A `PersistenceContext` reads committed rows into its identity map, stages
//! merges and removals against that map, and writes the planned change set
//! in one SQLite transaction on `commit`.
//!
//! All operations follow the same logging pattern:
//! - `log_op_start!` at entry
//! - `log_op_end!` with duration on success
//! - `log_op_error!` with duration on failure

use std::time::Instant;

use crate::db::configure;
use crate::errors::{from_folio, from_rusqlite, Result};
use crate::migrations::apply_migrations;
use crate::repo::hydration::{load_all, load_creator_graph, load_work};
use crate::repo::SqliteRepo;
use folio_core::errors::{ExError, ExErrorKind};
use folio_core::model::Creator;
use folio_core::ops::{self, AssignedIds, Change, ChangeSet, CreatorHandle, IdentityMap};
use folio_core::{log_op_end, log_op_error, log_op_start};
use folio_core_types::RequestId;
use rusqlite::Connection;

/// Unit of work over a borrowed SQLite connection
///
/// Not thread-safe: one context serves one caller at a time. Dropping the
/// context discards anything that was not committed.
pub struct PersistenceContext<'conn> {
    conn: &'conn mut Connection,
    map: IdentityMap,
}

impl<'conn> PersistenceContext<'conn> {
    /// Open a context, creating the schema and seed rows if needed
    ///
    /// # Errors
    /// * `Persistence` - the connection could not be configured or a
    ///   migration failed
    pub fn new(conn: &'conn mut Connection) -> Result<Self> {
        configure(conn)?;
        let applied = apply_migrations(conn)?;
        tracing::debug!(applied, "store ready");

        Ok(Self {
            conn,
            map: IdentityMap::new(),
        })
    }

    /// List Creators as this session sees them
    ///
    /// Committed rows ordered by id with pending edits applied, pending
    /// deletes hidden, pending inserts (id 0) last. Without `include_works`
    /// every `works` is empty.
    pub fn list_creators(&mut self, include_works: bool) -> Result<Vec<Creator>> {
        log_op_start!("list_creators", include_works = include_works);
        let start = Instant::now();

        let creators = self.list_creators_impl(include_works).map_err(|e| {
            log_op_error!(
                "list_creators",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "list_creators",
            duration_ms = start.elapsed().as_millis() as u64,
            count = creators.len()
        );
        Ok(creators)
    }

    fn list_creators_impl(&mut self, include_works: bool) -> Result<Vec<Creator>> {
        load_all(self.conn, &mut self.map, include_works)?;

        Ok(self
            .map
            .live_creators()
            .into_iter()
            .filter_map(|h| self.map.graph(h))
            .map(|mut creator| {
                if !include_works {
                    creator.works.clear();
                }
                creator
            })
            .collect())
    }

    /// Find one Creator, with works, as this session sees it
    pub fn find_creator(&mut self, creator_id: u64) -> Result<Option<Creator>> {
        log_op_start!("find_creator", creator_id = creator_id);
        let start = Instant::now();

        let creator = load_creator_graph(self.conn, creator_id, &mut self.map)
            .map(|_| {
                self.map
                    .find_creator(creator_id)
                    .and_then(|h| self.map.graph(h))
            })
            .map_err(|e| {
                log_op_error!(
                    "find_creator",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                e
            })?;

        log_op_end!(
            "find_creator",
            duration_ms = start.elapsed().as_millis() as u64,
            found = creator.is_some()
        );
        Ok(creator)
    }

    /// Merge a detached Creator graph into the session
    ///
    /// Loads the Creator and every Work the graph names, then stages an
    /// insert or whole-record update for the Creator, an insert or update
    /// for each supplied Work, and a delete for each owned Work the graph
    /// leaves out. Nothing is written until `commit`.
    ///
    /// # Errors
    /// Nothing is staged on error.
    /// * `NotFound` - a non-zero Creator or Work id has no row
    /// * `ConstraintViolation` - a supplied Work belongs to another Creator
    /// * `InvalidInput` - blank name or title, or a Work supplied twice
    pub fn merge(&mut self, detached: &Creator) -> Result<CreatorHandle> {
        log_op_start!(
            "merge",
            creator_id = detached.id,
            works = detached.works.len()
        );
        let start = Instant::now();

        let handle = self.merge_impl(detached).map_err(|e| {
            log_op_error!(
                "merge",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!("merge", duration_ms = start.elapsed().as_millis() as u64);
        Ok(handle)
    }

    fn merge_impl(&mut self, detached: &Creator) -> Result<CreatorHandle> {
        if !detached.is_new() {
            load_creator_graph(self.conn, detached.id, &mut self.map)?;
        }
        for work in detached.works.iter().filter(|w| !w.is_new()) {
            load_work(self.conn, work.id, &mut self.map)?;
        }

        ops::merge_creator(&mut self.map, detached).map_err(|e| from_folio("merge", e))
    }

    /// Stage a Creator and all its Works for delete
    ///
    /// # Errors
    /// * `NotFound` - no live Creator has this id
    pub fn remove_creator(&mut self, creator_id: u64) -> Result<()> {
        log_op_start!("remove_creator", creator_id = creator_id);
        let start = Instant::now();

        load_creator_graph(self.conn, creator_id, &mut self.map)
            .and_then(|_| {
                ops::remove_creator(&mut self.map, creator_id)
                    .map_err(|e| from_folio("remove_creator", e))
            })
            .map_err(|e| {
                log_op_error!(
                    "remove_creator",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                e
            })?;

        log_op_end!(
            "remove_creator",
            duration_ms = start.elapsed().as_millis() as u64
        );
        Ok(())
    }

    /// Materialize a tracked Creator graph
    ///
    /// After a commit the graph carries its store-assigned ids.
    pub fn creator(&self, handle: CreatorHandle) -> Option<Creator> {
        self.map.graph(handle)
    }

    pub fn has_changes(&self) -> bool {
        self.map.has_changes()
    }

    /// The writes the next `commit` would perform, in order
    pub fn pending_changes(&self) -> ChangeSet {
        self.map.plan()
    }

    /// Write every pending change in one transaction
    ///
    /// Returns the number of rows affected.
    ///
    /// # Errors
    /// The transaction is rolled back and pending changes are kept, so the
    /// caller can retry or `discard_changes`.
    /// * `ConstraintViolation` - SQLite rejected a write
    /// * `Persistence` - any other store failure, including a tracked row
    ///   that no longer exists
    pub fn commit(&mut self) -> Result<usize> {
        let request_id = RequestId::new();
        let changes = self.map.plan();
        log_op_start!(
            "commit",
            request_id = request_id.as_str(),
            inserts = changes.inserts(),
            updates = changes.updates(),
            deletes = changes.deletes()
        );
        let start = Instant::now();

        let rows = self.commit_impl(&changes).map_err(|e| {
            let e = e.with_op("commit").with_request_id(request_id.clone());
            log_op_error!(
                "commit",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "commit",
            duration_ms = start.elapsed().as_millis() as u64,
            rows_affected = rows
        );
        Ok(rows)
    }

    fn commit_impl(&mut self, changes: &ChangeSet) -> Result<usize> {
        if changes.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction().map_err(from_rusqlite)?;
        let mut assigned = AssignedIds::default();
        let mut rows = 0;

        for change in changes {
            rows += match change {
                Change::InsertCreator { handle, row } => {
                    let id = SqliteRepo::insert_creator(&tx, row)?;
                    assigned.record_creator(*handle, id);
                    1
                }
                Change::InsertWork { handle, owner, row } => {
                    let creator_id = assigned
                        .owner_id(*owner, row)
                        .map_err(|e| from_folio("commit", e))?;
                    let id = SqliteRepo::insert_work(&tx, row, creator_id)?;
                    assigned.record_work(*handle, id);
                    1
                }
                Change::UpdateCreator { row, .. } => {
                    expect_row(SqliteRepo::update_creator(&tx, row)?, "Creator", row.id)?
                }
                Change::UpdateWork { row, .. } => {
                    expect_row(SqliteRepo::update_work(&tx, row)?, "Work", row.id)?
                }
                Change::DeleteWork { id, .. } => {
                    expect_row(SqliteRepo::delete_work(&tx, *id)?, "Work", *id)?
                }
                Change::DeleteCreator { id, .. } => {
                    expect_row(SqliteRepo::delete_creator(&tx, *id)?, "Creator", *id)?
                }
            };
            tracing::debug!(change = change.kind(), "applied change");
        }

        tx.commit().map_err(from_rusqlite)?;

        self.map
            .accept_changes(&assigned)
            .map_err(|e| from_folio("commit", e))?;
        Ok(rows)
    }

    /// Drop every pending change and return to the last committed state
    pub fn discard_changes(&mut self) {
        self.map.discard_changes();
        tracing::debug!("discarded pending changes");
    }
}

fn expect_row(affected: usize, table: &str, id: u64) -> Result<usize> {
    if affected == 0 {
        return Err(ExError::new(ExErrorKind::Persistence)
            .with_entity_id(id.to_string())
            .with_message(format!("{} row no longer exists", table)));
    }
    Ok(affected)
}
