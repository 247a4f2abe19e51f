//! Field decryption gate.
//!
//! Shapes stored title, content and comment values for a response. Whether a
//! key is available depends on the caller's role:
//!
//! | role | key source |
//! |---|---|
//! | reporter | supplied key header if present, else the company key |
//! | company admin, super admin | supplied key header only |
//!
//! and each stored value is then rendered per the table in
//! [`FieldGate::reveal`].

use crate::error::KeyStoreResult;
use crate::key_store::CompanyKeyStore;
use tipline_crypto::{decrypt_field, looks_encrypted, DataKey};
use tipline_types::CompanyId;
use tracing::debug;

/// Shown in place of ciphertext when no key is available.
pub const ENCRYPTED_MARKER: &str = "[ENCRYPTED]";

/// Shown in place of ciphertext when the available key does not open it.
pub const DECRYPTION_FAILED_MARKER: &str = "[DECRYPTION_FAILED]";

/// The key a request may use to open envelopes.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// No key: envelopes are redacted.
    None,
    /// A usable key, supplied or automatic.
    Key(DataKey),
    /// A key was supplied but is not a 32-byte hex key. Treated as a wrong key.
    Unusable,
}

impl KeySource {
    fn from_supplied(supplied: &str) -> Self {
        match DataKey::from_hex(supplied) {
            Ok(key) => Self::Key(key),
            Err(_) => Self::Unusable,
        }
    }
}

/// Key source for a reporter: an explicit key wins, otherwise the company
/// key is fetched automatically.
pub async fn reporter_key(
    keys: &CompanyKeyStore,
    company_id: &CompanyId,
    supplied: Option<&str>,
) -> KeyStoreResult<KeySource> {
    if let Some(supplied) = supplied {
        debug!(%company_id, "reporter supplied an explicit key");
        return Ok(KeySource::from_supplied(supplied));
    }
    Ok(match keys.get(company_id).await? {
        Some(key) => KeySource::Key(key),
        None => KeySource::None,
    })
}

/// Key source for staff: only an explicitly supplied key. The key store is
/// never consulted.
pub fn admin_key(supplied: Option<&str>) -> KeySource {
    match supplied {
        Some(supplied) => KeySource::from_supplied(supplied),
        None => KeySource::None,
    }
}

/// Renders stored values for one response.
#[derive(Debug, Clone)]
pub struct FieldGate {
    source: KeySource,
}

impl FieldGate {
    pub fn new(source: KeySource) -> Self {
        Self { source }
    }

    /// Renders one stored value.
    ///
    /// | stored value | key | result |
    /// |---|---|---|
    /// | not an envelope | any | unchanged |
    /// | envelope | opens it | plaintext |
    /// | envelope | does not open it | `[DECRYPTION_FAILED]` |
    /// | envelope | none | `[ENCRYPTED]` |
    pub fn reveal(&self, stored: &str) -> String {
        if !looks_encrypted(stored) {
            return stored.to_string();
        }
        match &self.source {
            KeySource::None => ENCRYPTED_MARKER.to_string(),
            KeySource::Unusable => DECRYPTION_FAILED_MARKER.to_string(),
            KeySource::Key(key) => decrypt_field(stored, key)
                .unwrap_or_else(|_| DECRYPTION_FAILED_MARKER.to_string()),
        }
    }

    pub fn has_key(&self) -> bool {
        matches!(self.source, KeySource::Key(_))
    }
}
