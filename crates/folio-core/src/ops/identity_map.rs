use std::collections::BTreeMap;

use crate::errors::{FolioError, Result};
use crate::model::{Creator, Work};

use super::change_set::{AssignedIds, Change, ChangeSet};

/// Opaque handle to a tracked Creator entry
///
/// Handles stay valid across commits; a pending insert keeps the same handle
/// after it receives its store-assigned id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CreatorHandle(u64);

/// Opaque handle to a tracked Work entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkHandle(u64);

impl std::fmt::Display for CreatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "creator#{}", self.0)
    }
}

impl std::fmt::Display for WorkHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "work#{}", self.0)
    }
}

/// Lifecycle of a tracked entry between commits
///
/// Updates are not a state: a `Tracked` entry whose row differs from its
/// committed snapshot is detected as modified when the change set is planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Staged for insert, no store id yet
    Added,
    /// Mirrors a committed row (possibly with pending edits)
    Tracked,
    /// Staged for delete
    Deleted,
}

/// Tracked Creator: scalar columns only, works are tracked separately
#[derive(Debug, Clone)]
pub struct CreatorEntry {
    pub(crate) row: Creator,
    pub(crate) original: Option<Creator>,
    pub(crate) state: EntryState,
}

impl CreatorEntry {
    pub fn row(&self) -> &Creator {
        &self.row
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    /// True if a committed row has pending scalar edits
    pub fn is_modified(&self) -> bool {
        self.state == EntryState::Tracked && self.original.as_ref() != Some(&self.row)
    }
}

/// Tracked Work with the handle of its owning Creator
#[derive(Debug, Clone)]
pub struct WorkEntry {
    pub(crate) row: Work,
    pub(crate) original: Option<Work>,
    pub(crate) state: EntryState,
    pub(crate) owner: CreatorHandle,
}

impl WorkEntry {
    pub fn row(&self) -> &Work {
        &self.row
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    pub fn owner(&self) -> CreatorHandle {
        self.owner
    }

    pub fn is_modified(&self) -> bool {
        self.state == EntryState::Tracked && self.original.as_ref() != Some(&self.row)
    }
}

/// In-memory identity map for Creators and Works
///
/// Holds at most one entry per primary key and entity type. Rows read from
/// the store are attached; rows produced by a merge are added. Nothing here
/// touches the store: the persistence layer plans a change set, writes it,
/// and hands the assigned ids back through `accept_changes`.
///
/// Not thread-safe - one map belongs to one persistence context.
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    next_handle: u64,
    creators: BTreeMap<CreatorHandle, CreatorEntry>,
    works: BTreeMap<WorkHandle, WorkEntry>,
    creator_keys: BTreeMap<u64, CreatorHandle>,
    work_keys: BTreeMap<u64, WorkHandle>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    // ===== Registration =====

    /// Register a committed Creator row read from the store
    ///
    /// If the key is already tracked the existing entry wins, so pending
    /// edits survive a re-read. Any `works` on the row are ignored.
    pub fn attach_creator(&mut self, row: Creator) -> CreatorHandle {
        if let Some(handle) = self.creator_keys.get(&row.id) {
            return *handle;
        }

        let handle = CreatorHandle(self.next());
        let row = row.scalars();
        self.creator_keys.insert(row.id, handle);
        self.creators.insert(
            handle,
            CreatorEntry {
                original: Some(row.clone()),
                row,
                state: EntryState::Tracked,
            },
        );
        handle
    }

    /// Register a committed Work row read from the store
    ///
    /// # Errors
    ///
    /// Returns `CreatorNotFound` if the owning Creator is not tracked.
    pub fn attach_work(&mut self, row: Work) -> Result<WorkHandle> {
        if let Some(handle) = self.work_keys.get(&row.id) {
            return Ok(*handle);
        }

        let owner = *self
            .creator_keys
            .get(&row.creator_id)
            .ok_or(FolioError::CreatorNotFound {
                creator_id: row.creator_id,
            })?;

        // A Work read after its owner was removed joins the cascade
        let state = match self.creators.get(&owner).map(|c| c.state) {
            Some(EntryState::Deleted) => EntryState::Deleted,
            _ => EntryState::Tracked,
        };

        let handle = WorkHandle(self.next());
        self.work_keys.insert(row.id, handle);
        self.works.insert(
            handle,
            WorkEntry {
                original: Some(row.clone()),
                row,
                state,
                owner,
            },
        );
        Ok(handle)
    }

    /// Stage a new Creator for insert
    pub fn add_creator(&mut self, row: Creator) -> CreatorHandle {
        let handle = CreatorHandle(self.next());
        let mut row = row.scalars();
        row.id = 0;
        self.creators.insert(
            handle,
            CreatorEntry {
                row,
                original: None,
                state: EntryState::Added,
            },
        );
        handle
    }

    /// Stage a new Work for insert under `owner`
    ///
    /// The foreign key is taken from the owner, never from the row.
    pub fn add_work(&mut self, owner: CreatorHandle, row: Work) -> WorkHandle {
        let handle = WorkHandle(self.next());
        let creator_id = self.creators.get(&owner).map_or(0, |c| c.row.id);
        self.works.insert(
            handle,
            WorkEntry {
                row: Work {
                    id: 0,
                    creator_id,
                    ..row
                },
                original: None,
                state: EntryState::Added,
                owner,
            },
        );
        handle
    }

    // ===== Lookup =====

    /// Find a live (not deleted) Creator by primary key
    pub fn find_creator(&self, id: u64) -> Option<CreatorHandle> {
        self.creator_keys
            .get(&id)
            .copied()
            .filter(|h| self.is_live_creator(*h))
    }

    /// Find a live (not deleted) Work by primary key
    pub fn find_work(&self, id: u64) -> Option<WorkHandle> {
        self.work_keys
            .get(&id)
            .copied()
            .filter(|h| self.works.get(h).is_some_and(|w| w.state != EntryState::Deleted))
    }

    /// True if the key is tracked in any state, including staged deletes
    pub fn is_creator_tracked(&self, id: u64) -> bool {
        self.creator_keys.contains_key(&id)
    }

    pub fn is_work_tracked(&self, id: u64) -> bool {
        self.work_keys.contains_key(&id)
    }

    fn is_live_creator(&self, handle: CreatorHandle) -> bool {
        self.creators
            .get(&handle)
            .is_some_and(|c| c.state != EntryState::Deleted)
    }

    pub fn creator(&self, handle: CreatorHandle) -> Option<&CreatorEntry> {
        self.creators.get(&handle)
    }

    pub(crate) fn creator_mut(&mut self, handle: CreatorHandle) -> Option<&mut CreatorEntry> {
        self.creators.get_mut(&handle)
    }

    pub fn work(&self, handle: WorkHandle) -> Option<&WorkEntry> {
        self.works.get(&handle)
    }

    pub(crate) fn work_mut(&mut self, handle: WorkHandle) -> Option<&mut WorkEntry> {
        self.works.get_mut(&handle)
    }

    /// Live Creators in listing order: committed rows by id, then pending
    /// inserts in staging order
    pub fn live_creators(&self) -> Vec<CreatorHandle> {
        let mut handles: Vec<_> = self
            .creators
            .iter()
            .filter(|(_, c)| c.state != EntryState::Deleted)
            .map(|(h, c)| (c.row.id == 0, c.row.id, *h))
            .collect();
        handles.sort();
        handles.into_iter().map(|(_, _, h)| h).collect()
    }

    /// Live Works owned by `owner`, in the same order as `live_creators`
    pub fn live_works_of(&self, owner: CreatorHandle) -> Vec<WorkHandle> {
        let mut handles: Vec<_> = self
            .works
            .iter()
            .filter(|(_, w)| w.owner == owner && w.state != EntryState::Deleted)
            .map(|(h, w)| (w.row.id == 0, w.row.id, *h))
            .collect();
        handles.sort();
        handles.into_iter().map(|(_, _, h)| h).collect()
    }

    /// Materialize a Creator and its live Works
    ///
    /// Returns `None` for unknown handles and for staged deletes.
    pub fn graph(&self, handle: CreatorHandle) -> Option<Creator> {
        let entry = self.creators.get(&handle)?;
        if entry.state == EntryState::Deleted {
            return None;
        }

        let mut creator = entry.row.clone();
        creator.works = self
            .live_works_of(handle)
            .into_iter()
            .filter_map(|h| self.works.get(&h))
            .map(|w| Work {
                creator_id: entry.row.id,
                ..w.row.clone()
            })
            .collect();
        Some(creator)
    }

    // ===== Removal =====

    /// Stage a Work for delete; a pending insert is simply dropped
    pub fn remove_work(&mut self, handle: WorkHandle) {
        match self.works.get(&handle).map(|w| w.state) {
            Some(EntryState::Added) => {
                self.works.remove(&handle);
            }
            Some(_) => {
                if let Some(entry) = self.works.get_mut(&handle) {
                    entry.state = EntryState::Deleted;
                }
            }
            None => {}
        }
    }

    /// Stage a Creator for delete, cascading to every tracked Work it owns
    pub fn remove_creator(&mut self, handle: CreatorHandle) {
        let owned: Vec<WorkHandle> = self
            .works
            .iter()
            .filter(|(_, w)| w.owner == handle)
            .map(|(h, _)| *h)
            .collect();
        for work in owned {
            self.remove_work(work);
        }

        match self.creators.get(&handle).map(|c| c.state) {
            Some(EntryState::Added) => {
                self.creators.remove(&handle);
            }
            Some(_) => {
                if let Some(entry) = self.creators.get_mut(&handle) {
                    entry.state = EntryState::Deleted;
                }
            }
            None => {}
        }
    }

    // ===== Change detection =====

    /// True if a commit would write anything
    pub fn has_changes(&self) -> bool {
        self.creators
            .values()
            .any(|c| c.state != EntryState::Tracked || c.is_modified())
            || self
                .works
                .values()
                .any(|w| w.state != EntryState::Tracked || w.is_modified())
    }

    /// Diff every entry against its committed snapshot
    ///
    /// Changes are ordered so that foreign keys hold at every step: creator
    /// inserts, work inserts, creator updates, work updates, work deletes,
    /// creator deletes.
    pub fn plan(&self) -> ChangeSet {
        let mut changes = Vec::new();

        for (handle, c) in &self.creators {
            if c.state == EntryState::Added {
                changes.push(Change::InsertCreator {
                    handle: *handle,
                    row: c.row.clone(),
                });
            }
        }
        for (handle, w) in &self.works {
            if w.state == EntryState::Added {
                changes.push(Change::InsertWork {
                    handle: *handle,
                    owner: w.owner,
                    row: w.row.clone(),
                });
            }
        }
        for (handle, c) in &self.creators {
            if c.is_modified() {
                changes.push(Change::UpdateCreator {
                    handle: *handle,
                    row: c.row.clone(),
                });
            }
        }
        for (handle, w) in &self.works {
            if w.is_modified() {
                changes.push(Change::UpdateWork {
                    handle: *handle,
                    row: w.row.clone(),
                });
            }
        }
        for (handle, w) in &self.works {
            if w.state == EntryState::Deleted {
                changes.push(Change::DeleteWork {
                    handle: *handle,
                    id: w.row.id,
                });
            }
        }
        for (handle, c) in &self.creators {
            if c.state == EntryState::Deleted {
                changes.push(Change::DeleteCreator {
                    handle: *handle,
                    id: c.row.id,
                });
            }
        }

        ChangeSet::new(changes)
    }

    /// Fold a successful commit back into the map
    ///
    /// Pending inserts receive their assigned ids, staged deletes are
    /// dropped, and every surviving entry's snapshot becomes its current row.
    ///
    /// # Errors
    ///
    /// Returns `Internal` (and leaves the map untouched) if a pending insert
    /// has no assigned id.
    pub fn accept_changes(&mut self, assigned: &AssignedIds) -> Result<()> {
        for (handle, c) in &self.creators {
            if c.state == EntryState::Added && assigned.creator(*handle).is_none() {
                return Err(FolioError::Internal {
                    message: format!("no id assigned to {}", handle),
                });
            }
        }
        for (handle, w) in &self.works {
            if w.state == EntryState::Added && assigned.work(*handle).is_none() {
                return Err(FolioError::Internal {
                    message: format!("no id assigned to {}", handle),
                });
            }
        }

        self.creators.retain(|_, c| c.state != EntryState::Deleted);
        self.works.retain(|_, w| {
            w.state != EntryState::Deleted && self.creators.contains_key(&w.owner)
        });
        self.creator_keys
            .retain(|_, h| self.creators.contains_key(h));
        self.work_keys.retain(|_, h| self.works.contains_key(h));

        for (handle, c) in self.creators.iter_mut() {
            if let Some(id) = assigned.creator(*handle) {
                c.row.id = id;
                self.creator_keys.insert(id, *handle);
            }
            c.state = EntryState::Tracked;
            c.original = Some(c.row.clone());
        }

        for (handle, w) in self.works.iter_mut() {
            if let Some(id) = assigned.work(*handle) {
                w.row.id = id;
                self.work_keys.insert(id, *handle);
            }
            if let Some(owner) = self.creators.get(&w.owner) {
                w.row.creator_id = owner.row.id;
            }
            w.state = EntryState::Tracked;
            w.original = Some(w.row.clone());
        }

        Ok(())
    }

    /// Throw away every pending change and return to the last committed state
    pub fn discard_changes(&mut self) {
        self.creators.retain(|_, c| c.state != EntryState::Added);
        self.works.retain(|_, w| w.state != EntryState::Added);

        for c in self.creators.values_mut() {
            if let Some(original) = &c.original {
                c.row = original.clone();
            }
            c.state = EntryState::Tracked;
        }
        for w in self.works.values_mut() {
            if let Some(original) = &w.original {
                w.row = original.clone();
            }
            w.state = EntryState::Tracked;
        }
    }

    /// Number of tracked entries (creators, works), any state
    pub fn len(&self) -> (usize, usize) {
        (self.creators.len(), self.works.len())
    }

    pub fn is_empty(&self) -> bool {
        self.creators.is_empty() && self.works.is_empty()
    }
}
