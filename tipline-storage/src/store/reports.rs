//! Report rows.

use super::helpers::{read_report, report_from_row, REPORT_COLUMNS};
use super::TiplineStore;
use crate::error::{StorageError, StorageResult};
use rusqlite::{params, Connection, OptionalExtension};
use tipline_types::{
    now_millis, CompanyId, Report, ReportId, ReportIdentifier, ReportStatus, ShortCode,
};

/// Attempts at drawing an unused short code before giving up.
const SHORT_CODE_ATTEMPTS: usize = 8;

/// Partial update of a report. `None` leaves the column as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<ReportStatus>,
}

impl ReportPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.status.is_none()
    }
}

fn is_short_code_collision(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, Some(msg))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && msg.contains("reports.short_code")
    )
}

fn insert_row(conn: &Connection, report: &Report) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO reports (id, short_code, company_id, title, content, status,
                              access_password_hash, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            report.id.to_string(),
            report.short_code.as_str(),
            report.company_id.to_string(),
            report.title,
            report.content,
            report.status.as_str(),
            report.access_password_hash,
            report.created_at,
            report.updated_at,
        ],
    )
}

impl TiplineStore {
    /// Insert a report, drawing a fresh short code if the given one is taken.
    ///
    /// Returns the report as stored (its short code may differ from the one
    /// passed in).
    pub fn insert_report(&self, mut report: Report) -> StorageResult<Report> {
        let conn = self.lock_conn();
        for _ in 0..SHORT_CODE_ATTEMPTS {
            match insert_row(&conn, &report) {
                Ok(_) => return Ok(report),
                Err(e) if is_short_code_collision(&e) => {
                    tracing::debug!(short_code = %report.short_code, "short code collision, redrawing");
                    report.short_code = ShortCode::generate();
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(StorageError::Conflict(
            "could not allocate an unused short code".into(),
        ))
    }

    pub fn get_report(&self, id: &ReportId) -> StorageResult<Option<Report>> {
        self.query_one_report("id = ?1", &id.to_string())
    }

    pub fn get_report_by_short_code(&self, code: &ShortCode) -> StorageResult<Option<Report>> {
        self.query_one_report("short_code = ?1", code.as_str())
    }

    /// Look a report up by whichever identifier form the caller supplied.
    pub fn find_report(&self, identifier: &ReportIdentifier) -> StorageResult<Option<Report>> {
        match identifier {
            ReportIdentifier::Id(id) => self.get_report(id),
            ReportIdentifier::ShortCode(code) => self.get_report_by_short_code(code),
        }
    }

    /// Reports of one company, oldest first.
    pub fn list_reports(&self, company_id: &CompanyId) -> StorageResult<Vec<Report>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE company_id = ?1 ORDER BY created_at, id"
        ))?;
        let rows = stmt
            .query_map(params![company_id.to_string()], read_report)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(report_from_row).collect()
    }

    /// Apply a partial update. Returns `false` if the report does not exist.
    pub fn update_report(&self, id: &ReportId, patch: &ReportPatch) -> StorageResult<bool> {
        let conn = self.lock_conn();
        let changed = conn.execute(
            "UPDATE reports SET
                 title = COALESCE(?1, title),
                 content = COALESCE(?2, content),
                 status = COALESCE(?3, status),
                 updated_at = ?4
             WHERE id = ?5",
            params![
                patch.title,
                patch.content,
                patch.status.map(|s| s.as_str()),
                now_millis(),
                id.to_string(),
            ],
        )?;
        Ok(changed > 0)
    }

    /// Rewrite the stored title and content in place, leaving `updated_at`
    /// alone. Used when re-encoding existing values, not for edits.
    pub fn rewrite_report_fields(
        &self,
        id: &ReportId,
        title: Option<&str>,
        content: Option<&str>,
    ) -> StorageResult<bool> {
        let conn = self.lock_conn();
        let changed = conn.execute(
            "UPDATE reports SET
                 title = COALESCE(?1, title),
                 content = COALESCE(?2, content)
             WHERE id = ?3",
            params![title, content, id.to_string()],
        )?;
        Ok(changed > 0)
    }

    /// Delete a report and, through the foreign key, its comments.
    pub fn delete_report(&self, id: &ReportId) -> StorageResult<bool> {
        let conn = self.lock_conn();
        let changed = conn.execute("DELETE FROM reports WHERE id = ?1", params![id.to_string()])?;
        Ok(changed > 0)
    }

    fn query_one_report(&self, predicate: &str, value: &str) -> StorageResult<Option<Report>> {
        let conn = self.lock_conn();
        let raw = conn
            .query_row(
                &format!("SELECT {REPORT_COLUMNS} FROM reports WHERE {predicate}"),
                params![value],
                read_report,
            )
            .optional()?;
        raw.map(report_from_row).transpose()
    }
}
