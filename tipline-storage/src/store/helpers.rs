//! Row mapping shared by the store operations.
//!
//! Rows are read into plain tuples inside the rusqlite closure and converted
//! to typed records afterwards so that a malformed stored value surfaces as
//! [`StorageError::Corrupt`] rather than a generic SQLite conversion error.

use crate::error::{StorageError, StorageResult};
use rusqlite::Row;
use tipline_types::{
    AuthorType, Comment, CommentId, Company, CompanyId, Report, ReportId, ReportStatus, ShortCode,
};

pub(super) const COMPANY_COLUMNS: &str =
    "id, name, encrypted_data_key, data_key_iv, created_at";

pub(super) const REPORT_COLUMNS: &str = "id, short_code, company_id, title, content, status, \
     access_password_hash, created_at, updated_at";

pub(super) const COMMENT_COLUMNS: &str =
    "id, report_id, author_type, is_internal, content, created_at";

pub(super) type CompanyRow = (String, String, Option<String>, Option<String>, i64);

pub(super) fn read_company(row: &Row<'_>) -> rusqlite::Result<CompanyRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

pub(super) fn company_from_row(raw: CompanyRow) -> StorageResult<Company> {
    let (id, name, encrypted_data_key, data_key_iv, created_at) = raw;
    Ok(Company {
        id: CompanyId::parse(&id)?,
        name,
        encrypted_data_key,
        data_key_iv,
        created_at,
    })
}

pub(super) struct ReportRow {
    id: String,
    short_code: String,
    company_id: String,
    title: String,
    content: String,
    status: String,
    access_password_hash: Option<String>,
    created_at: i64,
    updated_at: i64,
}

pub(super) fn read_report(row: &Row<'_>) -> rusqlite::Result<ReportRow> {
    Ok(ReportRow {
        id: row.get(0)?,
        short_code: row.get(1)?,
        company_id: row.get(2)?,
        title: row.get(3)?,
        content: row.get(4)?,
        status: row.get(5)?,
        access_password_hash: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub(super) fn report_from_row(raw: ReportRow) -> StorageResult<Report> {
    let short_code = ShortCode::parse(&raw.short_code)
        .map_err(|_| StorageError::Corrupt(format!("short code {:?}", raw.short_code)))?;
    Ok(Report {
        id: ReportId::parse(&raw.id)?,
        short_code,
        company_id: CompanyId::parse(&raw.company_id)?,
        title: raw.title,
        content: raw.content,
        status: ReportStatus::parse(&raw.status)?,
        access_password_hash: raw.access_password_hash,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
    })
}

pub(super) type CommentRow = (String, String, String, bool, String, i64);

pub(super) fn read_comment(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

pub(super) fn comment_from_row(raw: CommentRow) -> StorageResult<Comment> {
    let (id, report_id, author_type, is_internal, content, created_at) = raw;
    Ok(Comment {
        id: CommentId::parse(&id)?,
        report_id: ReportId::parse(&report_id)?,
        author_type: AuthorType::parse(&author_type)?,
        is_internal,
        content,
        created_at,
    })
}
