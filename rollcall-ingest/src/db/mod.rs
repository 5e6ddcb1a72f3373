//! Database access for rollcall-ingest
//!
//! One module per table. Write functions take a `&mut SqliteConnection` so
//! callers decide the unit of work (pool connection, transaction or
//! savepoint) and return raw `sqlx::Error` so integrity violations can be
//! told apart from fatal failures.

pub mod amendments;
pub mod site_meta;
pub mod vote_meta;
pub mod votes;

use sqlx::error::ErrorKind;

/// Constraint failure message, if `err` is a recoverable integrity violation
///
/// Unique, foreign-key, not-null and check violations only affect the
/// record or batch being written. Anything else (I/O, locking, a closed
/// pool) is fatal for the run.
pub fn integrity_violation(err: &sqlx::Error) -> Option<String> {
    let db_err = err.as_database_error()?;
    match db_err.kind() {
        ErrorKind::UniqueViolation
        | ErrorKind::ForeignKeyViolation
        | ErrorKind::NotNullViolation
        | ErrorKind::CheckViolation => Some(db_err.message().to_string()),
        _ => None,
    }
}
