//! Token issuance and verification.

use crate::claims::ReporterClaims;
use crate::error::{TokenError, TokenResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::RngCore;
use std::fmt;
use tipline_types::{CompanyId, ReportId};
use tracing::trace;
use zeroize::Zeroizing;

/// Default reporter token lifetime (30 days).
pub const DEFAULT_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Prepended to the claims segment before signing so a signature over some
/// other Ed25519 message can never validate as a token.
const SIGNING_DOMAIN: &[u8] = b"tipline-reporter-token-v1.";

fn signing_input(claims_segment: &str) -> Vec<u8> {
    let mut msg = Vec::with_capacity(SIGNING_DOMAIN.len() + claims_segment.len());
    msg.extend_from_slice(SIGNING_DOMAIN);
    msg.extend_from_slice(claims_segment.as_bytes());
    msg
}

/// Mints reporter tokens. Holds the Ed25519 secret.
pub struct TokenSigner {
    signing_key: SigningKey,
}

impl TokenSigner {
    /// Builds a signer from a 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Builds a signer from the 64-character hex seed used in configuration.
    pub fn from_seed_hex(encoded: &str) -> TokenResult<Self> {
        let bytes = Zeroizing::new(
            hex::decode(encoded.trim())
                .map_err(|e| TokenError::InvalidSigningKey(e.to_string()))?,
        );
        let seed: &[u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            TokenError::InvalidSigningKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self::from_seed(seed))
    }

    /// Generates a signer with a random seed (tests and first-run setup).
    pub fn generate() -> Self {
        let mut seed = Zeroizing::new([0u8; 32]);
        rand::rng().fill_bytes(seed.as_mut_slice());
        Self::from_seed(&seed)
    }

    /// Verifier matching this signer's public key.
    pub fn verifier(&self) -> TokenVerifier {
        TokenVerifier {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// Issues a token for `report_id` of `company_id` valid for `ttl`.
    pub fn issue(
        &self,
        report_id: ReportId,
        company_id: CompanyId,
        ttl: Duration,
    ) -> TokenResult<String> {
        self.issue_at(report_id, company_id, ttl, Utc::now())
    }

    /// Issues a token as if the current time were `now`.
    ///
    /// A zero `ttl` yields a token that is already expired; negative
    /// lifetimes are rejected.
    pub fn issue_at(
        &self,
        report_id: ReportId,
        company_id: CompanyId,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> TokenResult<String> {
        if ttl < Duration::zero() {
            return Err(TokenError::InvalidTtl(format!("{}s", ttl.num_seconds())));
        }
        let iat = now.timestamp();
        let claims = ReporterClaims {
            report_id,
            company_id,
            iat,
            exp: iat.saturating_add(ttl.num_seconds()),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let claims_segment = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signature = self.signing_key.sign(&signing_input(&claims_segment));
        Ok(format!(
            "{claims_segment}.{}",
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        ))
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("public_key", &self.verifier().public_hex())
            .finish_non_exhaustive()
    }
}

/// Checks reporter tokens. Holds only the public key.
#[derive(Clone)]
pub struct TokenVerifier {
    verifying_key: VerifyingKey,
}

impl TokenVerifier {
    pub fn from_public_hex(encoded: &str) -> TokenResult<Self> {
        let bytes =
            hex::decode(encoded.trim()).map_err(|e| TokenError::InvalidVerifyingKey(e.to_string()))?;
        let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            TokenError::InvalidVerifyingKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        let verifying_key = VerifyingKey::from_bytes(&arr)
            .map_err(|e| TokenError::InvalidVerifyingKey(e.to_string()))?;
        Ok(Self { verifying_key })
    }

    pub fn public_hex(&self) -> String {
        hex::encode(self.verifying_key.as_bytes())
    }

    /// Returns the claims of a well-formed, correctly signed, unexpired token.
    pub fn verify(&self, token: &str) -> Option<ReporterClaims> {
        self.verify_at(token, Utc::now())
    }

    /// [`verify`](Self::verify) evaluated at `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<ReporterClaims> {
        let (claims_segment, sig_segment) = token.trim().split_once('.')?;
        if claims_segment.is_empty() || sig_segment.contains('.') {
            trace!("reporter token rejected: malformed");
            return None;
        }

        let sig_bytes = URL_SAFE_NO_PAD.decode(sig_segment).ok()?;
        let signature = Signature::from_slice(&sig_bytes).ok()?;
        if self
            .verifying_key
            .verify(&signing_input(claims_segment), &signature)
            .is_err()
        {
            trace!("reporter token rejected: bad signature");
            return None;
        }

        let claims_json = URL_SAFE_NO_PAD.decode(claims_segment).ok()?;
        let claims: ReporterClaims = serde_json::from_slice(&claims_json).ok()?;
        if claims.is_expired_at(now) {
            trace!(exp = claims.exp, "reporter token rejected: expired");
            return None;
        }
        Some(claims)
    }

    /// Verifies a token and requires it to grant exactly this report.
    pub fn verify_for(
        &self,
        token: &str,
        report_id: &ReportId,
        company_id: &CompanyId,
    ) -> Option<ReporterClaims> {
        self.verify(token)
            .filter(|claims| claims.grants(report_id, company_id))
    }
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("public_key", &self.public_hex())
            .finish()
    }
}
