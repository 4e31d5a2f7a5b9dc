//! Error handling for folio-store
//!
//! Wraps folio-core ExError with store-specific helpers

use folio_core::errors::{ExError, ExErrorKind, FolioError};
use rusqlite::ErrorCode;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::ConstraintViolation)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
///
/// SQLite constraint failures (foreign key, unique, not null) are classified
/// as `ConstraintViolation`; everything else is `Persistence`.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            ExErrorKind::ConstraintViolation
        }
        _ => ExErrorKind::Persistence,
    };
    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Lift a domain error into the store's error type, tagging the operation
pub fn from_folio(op: &str, err: FolioError) -> ExError {
    ExError::from(err).with_op(op)
}

/// Create an error for a rowid that does not fit an identifier
pub fn invalid_rowid(rowid: i64) -> ExError {
    ExError::new(ExErrorKind::Internal)
        .with_op("sqlite")
        .with_message(format!("Row id {} is not a valid identifier", rowid))
}
