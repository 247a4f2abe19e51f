//! Shared types for Tipline.
//!
//! Identifiers, the caller-facing report identifier, session principals
//! handed over by the surrounding auth system, and the persisted records
//! for companies, reports and comments.

mod error;
mod ids;
mod principal;
mod records;
mod short_code;

pub use error::{TypesError, TypesResult};
pub use ids::{CommentId, CompanyId, ReportId, UserId};
pub use principal::SessionPrincipal;
pub use records::{AuthorType, Comment, Company, Report, ReportStatus};
pub use short_code::{ReportIdentifier, ShortCode, SHORT_CODE_ALPHABET, SHORT_CODE_LEN};

/// Current wall-clock time as unix milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
