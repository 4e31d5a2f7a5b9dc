//! Identity tracking and the operations that stage changes against it

pub mod change_set;
pub mod identity_map;
pub mod merge;

pub use change_set::{AssignedIds, Change, ChangeSet};
pub use identity_map::{CreatorEntry, CreatorHandle, EntryState, IdentityMap, WorkEntry, WorkHandle};
pub use merge::{merge_creator, remove_creator};
