//! Error types for access control, key management and the report service.

use thiserror::Error;
use tipline_crypto::CryptoError;
use tipline_storage::StorageError;
use tipline_token::TokenError;
use tipline_types::CompanyId;

/// Result type for access resolution.
pub type AccessResult<T> = Result<T, AccessError>;

/// Faults while resolving access. A denial is not an error; it is
/// [`Access::Denied`](crate::Access::Denied).
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for company key operations.
pub type KeyStoreResult<T> = Result<T, KeyStoreError>;

/// Errors from the company data-key store.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("company not found: {0}")]
    CompanyNotFound(CompanyId),

    #[error("company {0} already has a data key")]
    AlreadyConfigured(CompanyId),

    #[error("stored data key for company {company_id} is corrupted: {reason}")]
    Corrupted { company_id: CompanyId, reason: String },

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for report service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors returned to API handlers.
///
/// Every access denial is the same [`ServiceError::Unauthorized`] so callers
/// cannot tell a missing report from a report they may not see.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("key store error: {0}")]
    KeyStore(KeyStoreError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("token error: {0}")]
    Token(#[from] TokenError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<KeyStoreError> for ServiceError {
    fn from(err: KeyStoreError) -> Self {
        match err {
            KeyStoreError::CompanyNotFound(id) => ServiceError::NotFound(format!("company {id}")),
            other => ServiceError::KeyStore(other),
        }
    }
}

impl From<AccessError> for ServiceError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Storage(e) => ServiceError::Storage(e),
        }
    }
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors loading or validating [`TiplineConfig`](crate::TiplineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
