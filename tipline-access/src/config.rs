//! Service configuration.

use crate::credentials::{CredentialNames, ENCRYPTION_KEY_HEADER, FORM_TOKEN_FIELD};
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use http::header::HeaderName;
use std::fmt;
use std::path::{Path, PathBuf};
use tipline_crypto::MasterKey;
use tipline_token::{TokenSigner, DEFAULT_TTL_SECS};

pub const ENV_MASTER_KEY: &str = "TIPLINE_MASTER_KEY";
pub const ENV_TOKEN_SIGNING_KEY: &str = "TIPLINE_TOKEN_SIGNING_KEY";
pub const ENV_DATABASE_PATH: &str = "TIPLINE_DATABASE_PATH";

/// Configuration for the report service.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TiplineConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Master key wrapping every company data key (64 hex chars or base64).
    pub master_key: String,

    /// Ed25519 seed for reporter tokens (64 hex chars).
    pub token_signing_key: String,

    /// Reporter token lifetime in seconds.
    pub token_ttl_secs: i64,

    /// Request header carrying an admin-supplied data key.
    pub encryption_key_header: String,

    /// Multipart field carrying a reporter token.
    pub form_token_field: String,
}

impl Default for TiplineConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("tipline.db"),
            master_key: String::new(),
            token_signing_key: String::new(),
            token_ttl_secs: DEFAULT_TTL_SECS,
            encryption_key_header: ENCRYPTION_KEY_HEADER.to_string(),
            form_token_field: FORM_TOKEN_FIELD.to_string(),
        }
    }
}

impl TiplineConfig {
    pub fn from_toml_str(raw: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Reads a TOML file, applies environment overrides and validates.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&raw)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Applies `TIPLINE_MASTER_KEY`, `TIPLINE_TOKEN_SIGNING_KEY` and
    /// `TIPLINE_DATABASE_PATH` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Applies overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(v) = value(ENV_MASTER_KEY) {
            self.master_key = v;
        }
        if let Some(v) = value(ENV_TOKEN_SIGNING_KEY) {
            self.token_signing_key = v;
        }
        if let Some(v) = value(ENV_DATABASE_PATH) {
            self.database_path = PathBuf::from(v);
        }
    }

    /// Checks that both secrets parse, the token lifetime is positive and
    /// representable, and the credential names are usable.
    pub fn validate(&self) -> ConfigResult<()> {
        self.master_key()?;
        self.token_signer()?;
        self.token_ttl()?;
        self.credential_names()?;
        Ok(())
    }

    pub fn master_key(&self) -> ConfigResult<MasterKey> {
        if self.master_key.trim().is_empty() {
            return Err(ConfigError::Invalid("master_key is not set".into()));
        }
        MasterKey::from_encoded(&self.master_key)
            .map_err(|e| ConfigError::Invalid(format!("master_key: {e}")))
    }

    pub fn token_signer(&self) -> ConfigResult<TokenSigner> {
        if self.token_signing_key.trim().is_empty() {
            return Err(ConfigError::Invalid("token_signing_key is not set".into()));
        }
        TokenSigner::from_seed_hex(&self.token_signing_key)
            .map_err(|e| ConfigError::Invalid(format!("token_signing_key: {e}")))
    }

    pub fn token_ttl(&self) -> ConfigResult<chrono::Duration> {
        if self.token_ttl_secs <= 0 {
            return Err(ConfigError::Invalid(format!(
                "token_ttl_secs must be positive, got {}",
                self.token_ttl_secs
            )));
        }
        chrono::Duration::try_seconds(self.token_ttl_secs).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "token_ttl_secs is out of range, got {}",
                self.token_ttl_secs
            ))
        })
    }

    /// Key header and form field the service reads credentials from.
    pub fn credential_names(&self) -> ConfigResult<CredentialNames> {
        let key_header = HeaderName::from_bytes(self.encryption_key_header.trim().as_bytes())
            .map_err(|e| ConfigError::Invalid(format!("encryption_key_header: {e}")))?;
        let form_field = self.form_token_field.trim();
        if form_field.is_empty() {
            return Err(ConfigError::Invalid("form_token_field is empty".into()));
        }
        Ok(CredentialNames::new(key_header, form_field))
    }

    /// Config with fixed secrets for tests.
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            database_path: PathBuf::from(":memory:"),
            master_key: "11".repeat(32),
            token_signing_key: "22".repeat(32),
            ..Self::default()
        }
    }
}

impl fmt::Debug for TiplineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TiplineConfig")
            .field("database_path", &self.database_path)
            .field("master_key", &"[REDACTED]")
            .field("token_signing_key", &"[REDACTED]")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("encryption_key_header", &self.encryption_key_header)
            .field("form_token_field", &self.form_token_field)
            .finish()
    }
}
