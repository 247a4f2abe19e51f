use crate::ids::{CompanyId, UserId};
use serde::{Deserialize, Serialize};

/// Staff identity established by the surrounding auth system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum SessionPrincipal {
    /// Platform operator, unrestricted across companies.
    SuperAdmin { user_id: UserId },
    /// Staff member of exactly one company.
    CompanyAdmin { user_id: UserId, company_id: CompanyId },
}

impl SessionPrincipal {
    pub fn user_id(&self) -> UserId {
        match self {
            Self::SuperAdmin { user_id } | Self::CompanyAdmin { user_id, .. } => *user_id,
        }
    }

    /// Whether this principal may administer `company_id`.
    pub fn administers(&self, company_id: &CompanyId) -> bool {
        match self {
            Self::SuperAdmin { .. } => true,
            Self::CompanyAdmin { company_id: own, .. } => own == company_id,
        }
    }
}
