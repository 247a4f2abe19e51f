use thiserror::Error;

/// Result type for token issuance and key handling.
///
/// Verification does not use this: an invalid token is an expected outcome
/// and surfaces as `None`.
pub type TokenResult<T> = Result<T, TokenError>;

/// Errors raised while configuring keys or issuing tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid signing key: {0}")]
    InvalidSigningKey(String),

    #[error("invalid verifying key: {0}")]
    InvalidVerifyingKey(String),

    #[error("invalid token lifetime: {0}")]
    InvalidTtl(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
