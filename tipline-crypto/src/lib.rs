//! Encryption layer for Tipline.
//!
//! Provides field-level encryption for report content using:
//! - ChaCha20-Poly1305 for authenticated encryption
//! - A self-describing string envelope so stored values can be told apart
//!   from plaintext without a lookup
//! - Key wrapping of per-company data keys under a server master key
//! - Argon2id for reporter access passwords and passphrase-derived master keys
//!
//! # Architecture
//!
//! The encryption uses a two-tier key system:
//!
//! 1. **Master Key**: Provisioned to the server out of band. It is never
//!    stored next to the data it protects and is only used to wrap and
//!    unwrap company data keys.
//!
//! 2. **Data Key**: A random key generated once per company. It is stored
//!    wrapped under the master key and encrypts that company's report titles,
//!    report content and comments.
//!
//! Losing either the master key or a wrapped data key makes the affected
//! content permanently unreadable.

mod cipher;
pub mod encryptor;
pub mod envelope;
mod error;
mod key;
pub mod password;
pub mod wrap;

pub use cipher::{
    decrypt, decrypt_with_aad, encrypt, encrypt_with_aad, EncryptedData, NONCE_SIZE, TAG_SIZE,
};
pub use encryptor::{FieldEncryptor, KeyedEncryptor, PassthroughEncryptor};
pub use envelope::{decrypt_field, encrypt_field, looks_encrypted, ENVELOPE_PREFIX};
pub use error::{CryptoError, CryptoResult};
pub use key::{DataKey, KEY_SIZE};
pub use password::{hash_access_password, verify_access_password};
pub use wrap::{unwrap_data_key, wrap_data_key, MasterKey, WrappedDataKey};
