//! Comment rows.

use super::helpers::{comment_from_row, read_comment, COMMENT_COLUMNS};
use super::TiplineStore;
use crate::error::StorageResult;
use rusqlite::params;
use tipline_types::{Comment, CommentId, ReportId};

impl TiplineStore {
    pub fn insert_comment(&self, comment: &Comment) -> StorageResult<()> {
        let conn = self.lock_conn();
        conn.execute(
            "INSERT INTO comments (id, report_id, author_type, is_internal, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                comment.id.to_string(),
                comment.report_id.to_string(),
                comment.author_type.as_str(),
                comment.is_internal,
                comment.content,
                comment.created_at,
            ],
        )?;
        Ok(())
    }

    /// Comments on a report in creation order. Internal notes are skipped
    /// unless `include_internal` is set.
    pub fn list_comments(
        &self,
        report_id: &ReportId,
        include_internal: bool,
    ) -> StorageResult<Vec<Comment>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments
             WHERE report_id = ?1 AND (?2 OR is_internal = 0)
             ORDER BY created_at, id"
        ))?;
        let rows = stmt
            .query_map(params![report_id.to_string(), include_internal], read_comment)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(comment_from_row).collect()
    }

    /// Replace a comment body. Returns `false` if the comment does not exist.
    pub fn update_comment_content(&self, id: &CommentId, content: &str) -> StorageResult<bool> {
        let conn = self.lock_conn();
        let changed = conn.execute(
            "UPDATE comments SET content = ?1 WHERE id = ?2",
            params![content, id.to_string()],
        )?;
        Ok(changed > 0)
    }
}
