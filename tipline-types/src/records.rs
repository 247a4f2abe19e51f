//! Persisted records.
//!
//! Title, content and comment bodies are stored exactly as written: either
//! plaintext or a field envelope produced under the company's data key.
//! Nothing in these records says which; callers test each value.

use crate::error::{TypesError, TypesResult};
use crate::ids::{CommentId, CompanyId, ReportId};
use crate::short_code::ShortCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    /// Data key wrapped under the master key (base64).
    pub encrypted_data_key: Option<String>,
    /// Nonce used to wrap the data key (base64).
    pub data_key_iv: Option<String>,
    pub created_at: i64,
}

impl Company {
    /// True only when both halves of the wrapped key are present.
    pub fn encryption_configured(&self) -> bool {
        self.encrypted_data_key.is_some() && self.data_key_iv.is_some()
    }
}

/// Triage state of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[default]
    New,
    InProgress,
    Resolved,
    Closed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> TypesResult<Self> {
        match s {
            "new" => Ok(Self::New),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            other => Err(TypesError::InvalidStatus(other.to_string())),
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submitted report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub short_code: ShortCode,
    pub company_id: CompanyId,
    pub title: String,
    pub content: String,
    pub status: ReportStatus,
    /// Argon2id PHC string for reporter re-login, if the reporter set one.
    #[serde(skip_serializing)]
    pub access_password_hash: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Who wrote a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorType {
    Reporter,
    CompanyAdmin,
    SuperAdmin,
}

impl AuthorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reporter => "reporter",
            Self::CompanyAdmin => "company_admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    pub fn parse(s: &str) -> TypesResult<Self> {
        match s {
            "reporter" => Ok(Self::Reporter),
            "company_admin" => Ok(Self::CompanyAdmin),
            "super_admin" => Ok(Self::SuperAdmin),
            other => Err(TypesError::InvalidAuthorType(other.to_string())),
        }
    }

    pub fn is_staff(&self) -> bool {
        !matches!(self, Self::Reporter)
    }
}

/// A comment on a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub report_id: ReportId,
    pub author_type: AuthorType,
    /// Staff-only; never shown to the reporter.
    pub is_internal: bool,
    pub content: String,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tags_roundtrip() {
        for status in [
            ReportStatus::New,
            ReportStatus::InProgress,
            ReportStatus::Resolved,
            ReportStatus::Closed,
        ] {
            assert_eq!(ReportStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(ReportStatus::parse("archived").is_err());
    }

    #[test]
    fn author_type_tags_roundtrip() {
        for author in [AuthorType::Reporter, AuthorType::CompanyAdmin, AuthorType::SuperAdmin] {
            assert_eq!(AuthorType::parse(author.as_str()).unwrap(), author);
        }
        assert!(!AuthorType::Reporter.is_staff());
        assert!(AuthorType::SuperAdmin.is_staff());
    }

    #[test]
    fn half_configured_key_is_not_configured() {
        let company = Company {
            id: CompanyId::new(),
            name: "Acme".into(),
            encrypted_data_key: Some("abc".into()),
            data_key_iv: None,
            created_at: 0,
        };
        assert!(!company.encryption_configured());
    }
}
