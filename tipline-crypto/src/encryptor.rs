//! Write-side encryption seam.
//!
//! Writers depend on `Box<dyn FieldEncryptor>` and never branch on whether a
//! company has encryption configured: a company with a data key gets a
//! [`KeyedEncryptor`], every other company gets [`PassthroughEncryptor`].

use crate::envelope::encrypt_field;
use crate::error::CryptoResult;
use crate::key::DataKey;

/// Seals text fields before they are persisted.
pub trait FieldEncryptor: Send + Sync {
    /// Returns the value to store for `plaintext`.
    fn seal(&self, plaintext: &str) -> CryptoResult<String>;

    /// Whether sealed values are envelopes.
    fn is_encrypting(&self) -> bool;
}

/// Encrypts every field under one company data key.
pub struct KeyedEncryptor {
    key: DataKey,
}

impl KeyedEncryptor {
    pub fn new(key: DataKey) -> Self {
        Self { key }
    }
}

impl FieldEncryptor for KeyedEncryptor {
    fn seal(&self, plaintext: &str) -> CryptoResult<String> {
        encrypt_field(plaintext, &self.key)
    }

    fn is_encrypting(&self) -> bool {
        true
    }
}

/// Stores values verbatim. Used for companies without a data key.
pub struct PassthroughEncryptor;

impl FieldEncryptor for PassthroughEncryptor {
    fn seal(&self, plaintext: &str) -> CryptoResult<String> {
        Ok(plaintext.to_string())
    }

    fn is_encrypting(&self) -> bool {
        false
    }
}
