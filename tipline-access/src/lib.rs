//! Report access control and field-level encryption for Tipline.
//!
//! - [`AccessResolver`]: decides which role a request holds on a report
//! - [`CompanyKeyStore`]: generates, unwraps and verifies company data keys
//! - [`FieldGate`]: renders stored values as plaintext or a redaction marker
//! - [`ReportService`]: the operations API handlers call, composing the above
//!
//! Reporters authenticate with a signed capability token scoped to a single
//! report; staff authenticate with a session established elsewhere. Reporters
//! read their report decrypted automatically, staff only when they present
//! the company key with the request.

pub mod config;
pub mod credentials;
mod error;
pub mod gate;
pub mod key_store;
pub mod logging;
pub mod repository;
pub mod resolver;
pub mod service;

pub use config::TiplineConfig;
pub use credentials::{CredentialNames, PresentedToken, RequestCredentials};
pub use error::{
    AccessError, AccessResult, ConfigError, ConfigResult, KeyStoreError, KeyStoreResult,
    ServiceError, ServiceResult,
};
pub use gate::{
    admin_key, reporter_key, FieldGate, KeySource, DECRYPTION_FAILED_MARKER, ENCRYPTED_MARKER,
};
pub use key_store::{CompanyKeyStore, KeyGeneration};
pub use repository::{CompanyKeyRepository, KeySlot, ReportDirectory, ReportLocator};
pub use resolver::{Access, AccessResolver};
pub use service::{
    BackfillSummary, CommentView, NewComment, NewReport, ReportService, ReportUpdate, ReportView,
    SubmittedReport,
};
