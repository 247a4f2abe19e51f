//! Reporter capability tokens.
//!
//! A token is `base64url(claims).base64url(signature)` where the signature is
//! Ed25519 over a domain-separated copy of the claims segment. Tokens bind a
//! reporter to exactly one report of one company and expire; verification is
//! self-contained and performs no storage lookups.
//!
//! There is no revocation list. A token stays valid until `exp`; the `jti`
//! claim is carried so a denylist can be layered on top without changing the
//! token format.

mod claims;
mod codec;
mod error;

pub use claims::ReporterClaims;
pub use codec::{TokenSigner, TokenVerifier, DEFAULT_TTL_SECS};
pub use error::{TokenError, TokenResult};
