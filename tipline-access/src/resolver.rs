//! Access resolver.
//!
//! Decides, for one request and one report identifier, which role the caller
//! holds on that report. The chain is ordered and stops at the first rule
//! that applies:
//!
//! 1. the identifier must name an existing report;
//! 2. a presented reporter token decides on its own: it either grants
//!    exactly this report or the request is denied, never falling through to
//!    a session (an unreadable bearer header counts as a presented token);
//! 3. a super-admin session grants any report;
//! 4. a company-admin session grants reports of its own company;
//! 5. everything else is denied.

use crate::credentials::{PresentedToken, RequestCredentials};
use crate::error::AccessResult;
use crate::repository::{ReportDirectory, ReportLocator};
use std::sync::Arc;
use tipline_token::TokenVerifier;
use tipline_types::{AuthorType, ReportIdentifier, SessionPrincipal, UserId};
use tracing::debug;

/// The caller's role on one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Reporter { locator: ReportLocator },
    CompanyAdmin { locator: ReportLocator, user_id: UserId },
    SuperAdmin { locator: ReportLocator, user_id: UserId },
    Denied,
}

impl Access {
    pub fn locator(&self) -> Option<&ReportLocator> {
        match self {
            Self::Reporter { locator }
            | Self::CompanyAdmin { locator, .. }
            | Self::SuperAdmin { locator, .. } => Some(locator),
            Self::Denied => None,
        }
    }

    pub fn is_granted(&self) -> bool {
        !matches!(self, Self::Denied)
    }

    /// Company or super admin.
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::CompanyAdmin { .. } | Self::SuperAdmin { .. })
    }

    /// Author type recorded on comments written under this access.
    pub fn author_type(&self) -> Option<AuthorType> {
        match self {
            Self::Reporter { .. } => Some(AuthorType::Reporter),
            Self::CompanyAdmin { .. } => Some(AuthorType::CompanyAdmin),
            Self::SuperAdmin { .. } => Some(AuthorType::SuperAdmin),
            Self::Denied => None,
        }
    }
}

/// Resolves [`Access`] for requests.
#[derive(Clone)]
pub struct AccessResolver {
    directory: Arc<dyn ReportDirectory>,
    verifier: TokenVerifier,
}

impl AccessResolver {
    pub fn new(directory: Arc<dyn ReportDirectory>, verifier: TokenVerifier) -> Self {
        Self {
            directory,
            verifier,
        }
    }

    /// Resolves the caller's role on the report named by `raw_identifier`.
    ///
    /// Only storage faults are errors; every refusal is [`Access::Denied`].
    /// The reason for a denial is logged at `debug` and never returned.
    pub async fn resolve(
        &self,
        creds: &RequestCredentials,
        raw_identifier: &str,
    ) -> AccessResult<Access> {
        let Some(identifier) = ReportIdentifier::parse(raw_identifier) else {
            return Ok(deny("unparsable report identifier"));
        };
        let Some(locator) = self.directory.locate(&identifier).await? else {
            return Ok(deny("report not found"));
        };

        match creds.token() {
            PresentedToken::Conflicting => {
                return Ok(deny("header and form tokens differ"));
            }
            PresentedToken::Malformed => {
                return Ok(deny("unreadable bearer header"));
            }
            PresentedToken::Single(token) => {
                return Ok(
                    match self
                        .verifier
                        .verify_for(token, &locator.report_id, &locator.company_id)
                    {
                        Some(_) => Access::Reporter { locator },
                        None => deny("reporter token invalid for this report"),
                    },
                );
            }
            PresentedToken::Absent => {}
        }

        Ok(match creds.session() {
            Some(SessionPrincipal::SuperAdmin { user_id }) => Access::SuperAdmin {
                locator,
                user_id: *user_id,
            },
            Some(SessionPrincipal::CompanyAdmin {
                user_id,
                company_id,
            }) if *company_id == locator.company_id => Access::CompanyAdmin {
                locator,
                user_id: *user_id,
            },
            Some(SessionPrincipal::CompanyAdmin { .. }) => deny("admin of another company"),
            None => deny("no credentials"),
        })
    }
}

fn deny(reason: &'static str) -> Access {
    debug!(reason, "report access denied");
    Access::Denied
}

impl std::fmt::Debug for AccessResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessResolver")
            .field("verifier", &self.verifier)
            .finish_non_exhaustive()
    }
}
