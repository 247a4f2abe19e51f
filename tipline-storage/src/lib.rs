//! SQLite storage layer for Tipline.
//!
//! Persists companies (including their wrapped data key), reports and
//! comments. Text columns holding report content are stored exactly as the
//! caller hands them over; this crate never encrypts or decrypts anything.
//!
//! # Architecture
//!
//! - One database file, one connection behind a mutex
//! - Reports resolve by canonical id or by short code
//! - Data-key establishment is an atomic insert-if-absent on the company row
//! - Comments are deleted together with their report

mod error;
mod schema;
mod store;

pub use error::{StorageError, StorageResult};
pub use schema::initialize_schema;
pub use store::{ReportPatch, TiplineStore};

use std::path::Path;
use std::time::Duration;

/// Open a SQLite connection with the pragmas the store relies on.
///
/// Foreign keys are enforced (comment cascade), file-backed databases use WAL
/// so readers do not block the single writer, and a busy timeout absorbs
/// short lock contention from other processes.
pub fn open_sqlite(path: &Path) -> StorageResult<rusqlite::Connection> {
    let conn = rusqlite::Connection::open(path)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    if !mode.eq_ignore_ascii_case("wal") {
        tracing::warn!(path = %path.display(), mode, "WAL journal mode unavailable");
    }
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}
