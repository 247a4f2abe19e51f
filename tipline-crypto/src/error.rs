use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in the encryption layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    #[error("malformed envelope: {0}")]
    InvalidEnvelope(String),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}
