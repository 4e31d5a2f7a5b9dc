//! Change sets planned from the identity map
//!
//! A `ChangeSet` is the ordered list of writes a commit must perform.
//! `AssignedIds` carries the ids the store hands out for inserts back into
//! the identity map.

use std::collections::BTreeMap;

use crate::errors::{FolioError, Result};
use crate::model::{Creator, Work};

use super::identity_map::{CreatorHandle, WorkHandle};

/// One pending write
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    InsertCreator {
        handle: CreatorHandle,
        row: Creator,
    },
    /// `row.creator_id` is 0 when the owner is itself a pending insert;
    /// resolve it through `AssignedIds::owner_id`
    InsertWork {
        handle: WorkHandle,
        owner: CreatorHandle,
        row: Work,
    },
    UpdateCreator {
        handle: CreatorHandle,
        row: Creator,
    },
    UpdateWork {
        handle: WorkHandle,
        row: Work,
    },
    DeleteWork {
        handle: WorkHandle,
        id: u64,
    },
    DeleteCreator {
        handle: CreatorHandle,
        id: u64,
    },
}

impl Change {
    /// Stable name of the change kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Change::InsertCreator { .. } => "insert_creator",
            Change::InsertWork { .. } => "insert_work",
            Change::UpdateCreator { .. } => "update_creator",
            Change::UpdateWork { .. } => "update_work",
            Change::DeleteWork { .. } => "delete_work",
            Change::DeleteCreator { .. } => "delete_creator",
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(
            self,
            Change::InsertCreator { .. } | Change::InsertWork { .. }
        )
    }

    pub fn is_update(&self) -> bool {
        matches!(
            self,
            Change::UpdateCreator { .. } | Change::UpdateWork { .. }
        )
    }

    pub fn is_delete(&self) -> bool {
        matches!(
            self,
            Change::DeleteCreator { .. } | Change::DeleteWork { .. }
        )
    }
}

/// Ordered writes for one commit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub(crate) fn new(changes: Vec<Change>) -> Self {
        Self { changes }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn inserts(&self) -> usize {
        self.changes.iter().filter(|c| c.is_insert()).count()
    }

    pub fn updates(&self) -> usize {
        self.changes.iter().filter(|c| c.is_update()).count()
    }

    pub fn deletes(&self) -> usize {
        self.changes.iter().filter(|c| c.is_delete()).count()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

/// Ids handed out by the store while a change set is being written
#[derive(Debug, Clone, Default)]
pub struct AssignedIds {
    creators: BTreeMap<CreatorHandle, u64>,
    works: BTreeMap<WorkHandle, u64>,
}

impl AssignedIds {
    pub fn record_creator(&mut self, handle: CreatorHandle, id: u64) {
        self.creators.insert(handle, id);
    }

    pub fn record_work(&mut self, handle: WorkHandle, id: u64) {
        self.works.insert(handle, id);
    }

    pub fn creator(&self, handle: CreatorHandle) -> Option<u64> {
        self.creators.get(&handle).copied()
    }

    pub fn work(&self, handle: WorkHandle) -> Option<u64> {
        self.works.get(&handle).copied()
    }

    /// Foreign key for a Work insert
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the owner is a pending insert that has not been
    /// written yet, which means the change set was applied out of order.
    pub fn owner_id(&self, owner: CreatorHandle, row: &Work) -> Result<u64> {
        if row.creator_id != 0 {
            return Ok(row.creator_id);
        }
        self.creator(owner).ok_or_else(|| FolioError::Internal {
            message: format!("owner {} has no id yet", owner),
        })
    }

    pub fn len(&self) -> usize {
        self.creators.len() + self.works.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
