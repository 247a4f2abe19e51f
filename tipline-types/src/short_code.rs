//! Human-facing report codes and caller-supplied report identifiers.

use crate::error::{TypesError, TypesResult};
use crate::ids::ReportId;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters used for short codes. No `0/O` or `1/I` so codes survive
/// being read aloud or copied from paper.
pub const SHORT_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of every short code.
pub const SHORT_CODE_LEN: usize = 8;

/// Human-facing report code, e.g. `K7M2QX9D`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortCode(String);

impl ShortCode {
    /// Generates a random code. Uniqueness is enforced by the store.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let code = (0..SHORT_CODE_LEN)
            .map(|_| SHORT_CODE_ALPHABET[rng.random_range(0..SHORT_CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    /// Parses a code, normalising case and surrounding whitespace.
    pub fn parse(raw: &str) -> TypesResult<Self> {
        let normalized = raw.trim().to_ascii_uppercase();
        if normalized.len() != SHORT_CODE_LEN
            || !normalized.bytes().all(|b| SHORT_CODE_ALPHABET.contains(&b))
        {
            return Err(TypesError::InvalidShortCode(raw.to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ShortCode {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShortCode> for String {
    fn from(code: ShortCode) -> Self {
        code.0
    }
}

/// A report reference as it arrives in a URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReportIdentifier {
    Id(ReportId),
    ShortCode(ShortCode),
}

impl ReportIdentifier {
    /// Canonical UUID form wins; anything else is tried as a short code.
    /// Returns `None` when the input matches neither shape.
    pub fn parse(raw: &str) -> Option<Self> {
        if let Ok(id) = ReportId::parse(raw) {
            return Some(Self::Id(id));
        }
        ShortCode::parse(raw).ok().map(Self::ShortCode)
    }
}

impl From<ReportId> for ReportIdentifier {
    fn from(id: ReportId) -> Self {
        Self::Id(id)
    }
}

impl From<ShortCode> for ReportIdentifier {
    fn from(code: ShortCode) -> Self {
        Self::ShortCode(code)
    }
}

impl fmt::Display for ReportIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::ShortCode(code) => write!(f, "{code}"),
        }
    }
}
