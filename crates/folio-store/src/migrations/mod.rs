//! Migration framework
//!
//! Provides:
//! - Migration runner with checksums
//! - Idempotent application (the seed migration runs exactly once)
//! - Embedded SQL migrations

mod checksums;
mod embedded;
mod runner;

pub use embedded::{get_migrations, Migration};
pub use runner::apply_migrations;
