//! ChaCha20-Poly1305 authenticated encryption.

use crate::error::{CryptoError, CryptoResult};
use crate::key::DataKey;
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Nonce size for ChaCha20-Poly1305 (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Poly1305 authentication tag size.
pub const TAG_SIZE: usize = 16;

/// Ciphertext plus the nonce it was sealed with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    pub nonce: [u8; NONCE_SIZE],
    /// Ciphertext with the Poly1305 tag appended.
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// Total encoded length (`nonce || ciphertext`).
    pub fn len(&self) -> usize {
        NONCE_SIZE + self.ciphertext.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }

    /// Encodes as `nonce || ciphertext || tag`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Splits `nonce || ciphertext || tag`. Inputs too short to hold a nonce
    /// and a tag are rejected before any decryption is attempted.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::InvalidEnvelope(format!(
                "{} bytes is shorter than nonce + tag",
                bytes.len()
            )));
        }
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[..NONCE_SIZE]);
        Ok(Self {
            nonce,
            ciphertext: bytes[NONCE_SIZE..].to_vec(),
        })
    }
}

fn cipher_for(key: &DataKey) -> ChaCha20Poly1305 {
    ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()))
}

/// Encrypts `plaintext` under `key` with a fresh random nonce.
pub fn encrypt(key: &DataKey, plaintext: &[u8]) -> CryptoResult<EncryptedData> {
    encrypt_with_aad(key, plaintext, &[])
}

/// Encrypts and binds `aad` into the authentication tag.
pub fn encrypt_with_aad(key: &DataKey, plaintext: &[u8], aad: &[u8]) -> CryptoResult<EncryptedData> {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::rng().fill_bytes(&mut nonce);

    let ciphertext = cipher_for(key)
        .encrypt(Nonce::from_slice(&nonce), Payload { msg: plaintext, aad })
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(EncryptedData { nonce, ciphertext })
}

/// Decrypts data produced by [`encrypt`].
pub fn decrypt(key: &DataKey, data: &EncryptedData) -> CryptoResult<Vec<u8>> {
    decrypt_with_aad(key, data, &[])
}

/// Decrypts data produced by [`encrypt_with_aad`] with the same `aad`.
pub fn decrypt_with_aad(key: &DataKey, data: &EncryptedData, aad: &[u8]) -> CryptoResult<Vec<u8>> {
    cipher_for(key)
        .decrypt(
            Nonce::from_slice(&data.nonce),
            Payload {
                msg: &data.ciphertext,
                aad,
            },
        )
        .map_err(|_| CryptoError::Decryption("wrong key or tampered data".to_string()))
}
