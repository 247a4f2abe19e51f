//! Company data keys.

use crate::error::{CryptoError, CryptoResult};
use rand::RngCore;
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Size of every symmetric key in bytes.
pub const KEY_SIZE: usize = 32;

/// A 256-bit data key. Zeroized on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DataKey([u8; KEY_SIZE]);

impl DataKey {
    /// Generates a fresh random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds a key from a slice. Any length other than [`KEY_SIZE`] is
    /// rejected; keys are never padded or truncated.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Parses the hex form shown to admins at generation time.
    pub fn from_hex(encoded: &str) -> CryptoResult<Self> {
        let bytes = Zeroizing::new(
            hex::decode(encoded.trim())
                .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?,
        );
        Self::from_slice(&bytes)
    }

    /// Lowercase hex encoding for one-time display and the key header.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Constant-time equality.
    pub fn ct_eq(&self, other: &DataKey) -> bool {
        bool::from(self.0.ct_eq(&other.0))
    }
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DataKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_differ() {
        assert!(!DataKey::generate().ct_eq(&DataKey::generate()));
    }

    #[test]
    fn hex_roundtrip() {
        let key = DataKey::generate();
        let parsed = DataKey::from_hex(&key.to_hex()).unwrap();
        assert!(key.ct_eq(&parsed));
    }

    #[test]
    fn wrong_length_rejected() {
        assert_eq!(
            DataKey::from_slice(&[0u8; 16]).unwrap_err(),
            CryptoError::InvalidKeyLength { expected: 32, actual: 16 }
        );
        assert!(DataKey::from_slice(&[0u8; 33]).is_err());
        assert!(DataKey::from_hex("abcd").is_err());
    }

    #[test]
    fn non_hex_rejected() {
        let err = DataKey::from_hex("not hex at all").unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKeyEncoding(_)));
    }

    #[test]
    fn debug_is_redacted() {
        let key = DataKey::generate();
        let printed = format!("{key:?}");
        assert!(!printed.contains(&*key.to_hex()));
        assert!(printed.contains("REDACTED"));
    }
}
