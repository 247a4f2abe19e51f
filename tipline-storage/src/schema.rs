//! DDL for the Tipline database.

use crate::error::StorageResult;
use rusqlite::Connection;

/// Companies. The wrapped data key and its nonce are both present or both
/// absent; a half-written pair is rejected by the CHECK constraint.
const COMPANIES_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS companies (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    encrypted_data_key TEXT,
    data_key_iv TEXT,
    created_at INTEGER NOT NULL,
    CHECK ((encrypted_data_key IS NULL) = (data_key_iv IS NULL))
);
"#;

const REPORTS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS reports (
    id TEXT PRIMARY KEY,
    short_code TEXT NOT NULL UNIQUE,
    company_id TEXT NOT NULL REFERENCES companies(id),
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'new',
    access_password_hash TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_reports_company ON reports(company_id, created_at);
"#;

const COMMENTS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    report_id TEXT NOT NULL REFERENCES reports(id) ON DELETE CASCADE,
    author_type TEXT NOT NULL,
    is_internal INTEGER NOT NULL DEFAULT 0,
    content TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_comments_report ON comments(report_id, created_at);
"#;

/// Creates all tables and indexes if missing.
pub fn initialize_schema(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(COMPANIES_DDL)?;
    conn.execute_batch(REPORTS_DDL)?;
    conn.execute_batch(COMMENTS_DDL)?;
    Ok(())
}
