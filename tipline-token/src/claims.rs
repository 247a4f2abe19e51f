use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tipline_types::{CompanyId, ReportId};

/// Claims embedded in a reporter token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterClaims {
    /// Report the bearer may access.
    #[serde(rename = "rid")]
    pub report_id: ReportId,
    /// Company owning that report.
    #[serde(rename = "cid")]
    pub company_id: CompanyId,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds. Invalid at and after this instant.
    pub exp: i64,
    /// Unique token id.
    pub jti: String,
}

impl ReporterClaims {
    /// True only when both the report and its company match exactly.
    pub fn grants(&self, report_id: &ReportId, company_id: &CompanyId) -> bool {
        self.report_id == *report_id && self.company_id == *company_id
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(report_id: ReportId, company_id: CompanyId) -> ReporterClaims {
        ReporterClaims {
            report_id,
            company_id,
            iat: 100,
            exp: 200,
            jti: "t".into(),
        }
    }

    #[test]
    fn grants_requires_both_ids() {
        let (r, c) = (ReportId::new(), CompanyId::new());
        let claims = claims(r, c);
        assert!(claims.grants(&r, &c));
        assert!(!claims.grants(&ReportId::new(), &c));
        assert!(!claims.grants(&r, &CompanyId::new()));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let claims = claims(ReportId::new(), CompanyId::new());
        let at = |secs| DateTime::from_timestamp(secs, 0).unwrap();
        assert!(!claims.is_expired_at(at(199)));
        assert!(claims.is_expired_at(at(200)));
    }

    #[test]
    fn compact_field_names() {
        let json = serde_json::to_string(&claims(ReportId::new(), CompanyId::new())).unwrap();
        assert!(json.contains("\"rid\""));
        assert!(json.contains("\"cid\""));
    }
}
