use thiserror::Error;

/// Result type for parsing shared types.
pub type TypesResult<T> = Result<T, TypesError>;

/// Errors raised while parsing identifiers and enum tags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),

    #[error("invalid report status: {0}")]
    InvalidStatus(String),

    #[error("invalid author type: {0}")]
    InvalidAuthorType(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}
