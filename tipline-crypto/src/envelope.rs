//! String envelopes for encrypted text columns.
//!
//! Report titles, report content and comment bodies share their column with
//! plaintext written before a company configured encryption. An envelope is
//! `enc:v1:` followed by URL-safe unpadded base64 of `nonce || ciphertext || tag`,
//! which lets a reader decide per value whether decryption is needed.

use crate::cipher::{self, EncryptedData, NONCE_SIZE, TAG_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::key::DataKey;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Marker every envelope starts with.
pub const ENVELOPE_PREFIX: &str = "enc:v1:";

/// Encrypts a text field into an envelope string.
pub fn encrypt_field(plaintext: &str, key: &DataKey) -> CryptoResult<String> {
    let sealed = cipher::encrypt(key, plaintext.as_bytes())?;
    Ok(format!(
        "{ENVELOPE_PREFIX}{}",
        URL_SAFE_NO_PAD.encode(sealed.to_bytes())
    ))
}

/// Opens an envelope produced by [`encrypt_field`].
///
/// Wrong keys, tampering and malformed envelopes all fail with an error; a
/// wrong key never yields plausible-looking plaintext.
pub fn decrypt_field(envelope: &str, key: &DataKey) -> CryptoResult<String> {
    let body = envelope
        .strip_prefix(ENVELOPE_PREFIX)
        .ok_or_else(|| CryptoError::InvalidEnvelope("missing envelope prefix".to_string()))?;
    let raw = URL_SAFE_NO_PAD
        .decode(body)
        .map_err(|e| CryptoError::InvalidEnvelope(format!("base64 decode: {e}")))?;
    let sealed = EncryptedData::from_bytes(&raw)?;
    let plaintext = cipher::decrypt(key, &sealed)?;
    String::from_utf8(plaintext)
        .map_err(|_| CryptoError::Decryption("plaintext is not valid UTF-8".to_string()))
}

/// Cheap structural test for an envelope. No key is needed.
///
/// Requires the prefix, a body made only of URL-safe base64 characters that
/// decodes cleanly, and room for at least a nonce and a tag. Prose that
/// happens to start with the prefix fails the body check.
pub fn looks_encrypted(value: &str) -> bool {
    let Some(body) = value.strip_prefix(ENVELOPE_PREFIX) else {
        return false;
    };
    if body.is_empty()
        || !body
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return false;
    }
    matches!(URL_SAFE_NO_PAD.decode(body), Ok(raw) if raw.len() >= NONCE_SIZE + TAG_SIZE)
}
