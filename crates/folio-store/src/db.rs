//! Database connection management
//!
//! A connection is an explicit handle owned by the caller and lent to a
//! `PersistenceContext`; nothing here keeps a process-wide connection.

use crate::errors::{from_rusqlite, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use uuid::Uuid;

/// Where the backing store lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Private in-memory database, gone when the connection closes
    Memory,
    /// Named in-memory database shared by every connection opened with the
    /// same name in this process; lives while at least one is open
    SharedMemory { name: String },
    /// On-disk database file
    File(PathBuf),
}

impl StoreLocation {
    /// Shared in-memory location with a fresh random name
    pub fn shared_memory() -> Self {
        StoreLocation::SharedMemory {
            name: Uuid::new_v4().to_string(),
        }
    }

    /// Connection descriptor passed to SQLite
    pub fn descriptor(&self) -> String {
        match self {
            StoreLocation::Memory => ":memory:".to_string(),
            StoreLocation::SharedMemory { name } => {
                format!("file:{}?mode=memory&cache=shared", name)
            }
            StoreLocation::File(path) => path.display().to_string(),
        }
    }
}

/// Open a connection to the given location and configure it
pub fn open(location: &StoreLocation) -> Result<Connection> {
    let conn = match location {
        StoreLocation::Memory => Connection::open_in_memory(),
        StoreLocation::SharedMemory { .. } => Connection::open_with_flags(
            location.descriptor(),
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        ),
        StoreLocation::File(path) => Connection::open(path),
    }
    .map_err(from_rusqlite)?;

    configure(&conn)?;
    tracing::debug!(location = %location.descriptor(), "opened store");
    Ok(conn)
}

/// Open a private in-memory database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    open(&StoreLocation::Memory)
}

/// Configure a connection for this schema
///
/// Foreign keys are off by default in SQLite; cascade delete depends on them.
pub fn configure(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(from_rusqlite)?;
    Ok(())
}
