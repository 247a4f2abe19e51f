//! Thread-safe SQLite store for companies, reports and comments.

mod comments;
mod companies;
mod helpers;
mod reports;

pub use reports::ReportPatch;

use crate::error::StorageResult;
use crate::schema::initialize_schema;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared handle to the Tipline database. Cloning is cheap.
#[derive(Clone)]
pub struct TiplineStore {
    conn: Arc<Mutex<Connection>>,
}

impl TiplineStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = crate::open_sqlite(path)?;
        initialize_schema(&conn)?;
        tracing::debug!(path = %path.display(), "opened tipline database");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Acquire the connection lock, recovering from poison if a caller
    /// panicked while holding it.
    pub(crate) fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("recovering from poisoned store mutex");
            poisoned.into_inner()
        })
    }
}
