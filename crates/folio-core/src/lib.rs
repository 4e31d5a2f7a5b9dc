//! Folio Core - in-memory semantics of the bibliographic persistence context
//!
//! This crate provides everything that does not touch SQL:
//! - Creator and Work models shared by detached input and materialized reads
//! - An identity map that tracks entries and detects changes by diffing
//! - The detached merge operation with owned-collection replacement
//! - Change-set planning for an atomic commit
//! - Error and logging facilities
//! - Console report rendering

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod render;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, FolioError, Result};
pub use model::{Creator, Work};
pub use ops::{ChangeSet, CreatorHandle, IdentityMap, WorkHandle};
