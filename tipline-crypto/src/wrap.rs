//! Wrapping of company data keys under the server master key.
//!
//! Stores the data key encrypted with the master key so the raw key never
//! touches disk. The company id is bound as associated data: a wrapped key
//! copied onto another company's row fails to unwrap.

use crate::cipher::{decrypt_with_aad, encrypt_with_aad, EncryptedData, NONCE_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::key::{DataKey, KEY_SIZE};
use argon2::Argon2;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

/// Domain-separated salt for passphrase-derived master keys.
const MASTER_KEY_SALT: &[u8] = b"tipline-master-key-v1";

/// Server-held root of trust for every company's data key.
#[derive(Clone)]
pub struct MasterKey(DataKey);

impl MasterKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(DataKey::from_bytes(bytes))
    }

    /// Parses a provisioned secret: 64 hex characters or standard base64 of
    /// exactly 32 bytes.
    pub fn from_encoded(encoded: &str) -> CryptoResult<Self> {
        let trimmed = encoded.trim();
        if let Ok(key) = DataKey::from_hex(trimmed) {
            return Ok(Self(key));
        }
        let bytes = Zeroizing::new(
            STANDARD
                .decode(trimmed)
                .map_err(|_| CryptoError::InvalidKeyEncoding("expected hex or base64".to_string()))?,
        );
        DataKey::from_slice(&bytes).map(Self)
    }

    /// Derives a master key from a passphrase with Argon2id.
    ///
    /// The fixed salt is acceptable only because the passphrase is a
    /// high-entropy server secret, never a human-chosen password.
    pub fn derive_from_passphrase(passphrase: &str) -> CryptoResult<Self> {
        let mut out = Zeroizing::new([0u8; KEY_SIZE]);
        Argon2::default()
            .hash_password_into(passphrase.as_bytes(), MASTER_KEY_SALT, &mut out[..])
            .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
        Ok(Self(DataKey::from_bytes(*out)))
    }

    fn key(&self) -> &DataKey {
        &self.0
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// A data key as persisted on the company row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedDataKey {
    /// Base64 ciphertext + tag of the data key.
    pub ciphertext: String,
    /// Base64 nonce used for the wrap.
    pub iv: String,
}

fn wrap_aad(context: &str) -> Vec<u8> {
    format!("tipline-data-key:{context}").into_bytes()
}

/// Wraps `data_key` under `master`, bound to `context` (the company id).
pub fn wrap_data_key(
    master: &MasterKey,
    data_key: &DataKey,
    context: &str,
) -> CryptoResult<WrappedDataKey> {
    let sealed = encrypt_with_aad(master.key(), data_key.as_bytes(), &wrap_aad(context))?;
    Ok(WrappedDataKey {
        ciphertext: STANDARD.encode(&sealed.ciphertext),
        iv: STANDARD.encode(sealed.nonce),
    })
}

/// Recovers the raw data key. Any failure here means the stored key material
/// or the master key is wrong.
pub fn unwrap_data_key(
    master: &MasterKey,
    wrapped: &WrappedDataKey,
    context: &str,
) -> CryptoResult<DataKey> {
    let iv = STANDARD
        .decode(&wrapped.iv)
        .map_err(|e| CryptoError::InvalidEnvelope(format!("iv base64 decode: {e}")))?;
    if iv.len() != NONCE_SIZE {
        return Err(CryptoError::InvalidEnvelope(format!(
            "iv must be {NONCE_SIZE} bytes, got {}",
            iv.len()
        )));
    }
    let ciphertext = STANDARD
        .decode(&wrapped.ciphertext)
        .map_err(|e| CryptoError::InvalidEnvelope(format!("key base64 decode: {e}")))?;

    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&iv);
    let plaintext = Zeroizing::new(decrypt_with_aad(
        master.key(),
        &EncryptedData { nonce, ciphertext },
        &wrap_aad(context),
    )?);
    DataKey::from_slice(&plaintext)
}
