//! Folio Store - SQLite persistence for Creators and Works
//!
//! Provides:
//! - Connection management over explicit store locations
//! - Embedded, checksummed migrations (schema and seed rows)
//! - Row repository and hydration into the identity map
//! - `PersistenceContext`: merge detached graphs, commit atomically

pub mod context;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use context::PersistenceContext;
pub use db::StoreLocation;
pub use errors::Result;
