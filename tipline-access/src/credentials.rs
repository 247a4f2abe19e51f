//! Credentials a request carries, extracted from the HTTP layer.

use http::header::{HeaderName, AUTHORIZATION};
use http::HeaderMap;
use std::fmt;
use tipline_types::SessionPrincipal;

/// Default header carrying an admin-supplied data key.
pub const ENCRYPTION_KEY_HEADER: &str = "x-encryption-key";

/// Default multipart field carrying a reporter token.
pub const FORM_TOKEN_FIELD: &str = "token";

/// Everything a request may present to prove access.
#[derive(Clone, Default)]
pub struct RequestCredentials {
    bearer_token: Option<String>,
    /// An `Authorization: Bearer` header was sent but could not be read.
    bearer_unreadable: bool,
    form_token: Option<String>,
    encryption_key: Option<String>,
    session: Option<SessionPrincipal>,
}

/// Which reporter token, if any, the request presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentedToken<'a> {
    Absent,
    Single(&'a str),
    /// Header and form carried different tokens.
    Conflicting,
    /// A bearer header was sent whose value is not visible ASCII.
    Malformed,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

enum BearerHeader {
    Missing,
    Token(String),
    Unreadable,
}

fn bearer_from(headers: &HeaderMap) -> BearerHeader {
    let Some(raw) = headers.get(AUTHORIZATION) else {
        return BearerHeader::Missing;
    };
    let Ok(value) = raw.to_str() else {
        let bytes = raw.as_bytes().trim_ascii_start();
        let is_bearer = bytes.len() > 6
            && bytes[..6].eq_ignore_ascii_case(b"bearer")
            && bytes[6].is_ascii_whitespace();
        return if is_bearer {
            BearerHeader::Unreadable
        } else {
            BearerHeader::Missing
        };
    };
    match value.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => {
            non_empty(token).map_or(BearerHeader::Missing, BearerHeader::Token)
        }
        _ => BearerHeader::Missing,
    }
}

impl RequestCredentials {
    /// No credentials at all.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Reads `Authorization: Bearer` and the default key header.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_headers_with(headers, ENCRYPTION_KEY_HEADER)
    }

    /// Reads `Authorization: Bearer` and the given key header.
    pub fn from_headers_with(headers: &HeaderMap, key_header: &str) -> Self {
        let encryption_key = headers
            .get(key_header)
            .and_then(|v| v.to_str().ok())
            .and_then(non_empty);
        let (bearer_token, bearer_unreadable) = match bearer_from(headers) {
            BearerHeader::Missing => (None, false),
            BearerHeader::Token(token) => (Some(token), false),
            BearerHeader::Unreadable => (None, true),
        };
        Self {
            bearer_token,
            bearer_unreadable,
            form_token: None,
            encryption_key,
            session: None,
        }
    }

    /// Token submitted as a form field (multipart uploads).
    pub fn with_form_token(mut self, token: impl AsRef<str>) -> Self {
        self.form_token = non_empty(token.as_ref());
        self
    }

    pub fn with_bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.bearer_token = non_empty(token.as_ref());
        self
    }

    pub fn with_encryption_key(mut self, key: impl AsRef<str>) -> Self {
        self.encryption_key = non_empty(key.as_ref());
        self
    }

    /// Session established by the external auth system.
    pub fn with_session(mut self, principal: SessionPrincipal) -> Self {
        self.session = Some(principal);
        self
    }

    pub fn token(&self) -> PresentedToken<'_> {
        if self.bearer_unreadable {
            return PresentedToken::Malformed;
        }
        match (self.bearer_token.as_deref(), self.form_token.as_deref()) {
            (None, None) => PresentedToken::Absent,
            (Some(t), None) | (None, Some(t)) => PresentedToken::Single(t),
            (Some(a), Some(b)) if a == b => PresentedToken::Single(a),
            (Some(_), Some(_)) => PresentedToken::Conflicting,
        }
    }

    pub fn encryption_key(&self) -> Option<&str> {
        self.encryption_key.as_deref()
    }

    pub fn session(&self) -> Option<&SessionPrincipal> {
        self.session.as_ref()
    }
}

impl fmt::Debug for RequestCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestCredentials")
            .field("bearer_token", &self.bearer_token.is_some())
            .field("bearer_unreadable", &self.bearer_unreadable)
            .field("form_token", &self.form_token.is_some())
            .field("encryption_key", &self.encryption_key.is_some())
            .field("session", &self.session)
            .finish()
    }
}

/// Where a deployment expects the admin key header and the form token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialNames {
    key_header: HeaderName,
    form_token_field: String,
}

impl Default for CredentialNames {
    fn default() -> Self {
        Self {
            key_header: HeaderName::from_static(ENCRYPTION_KEY_HEADER),
            form_token_field: FORM_TOKEN_FIELD.to_string(),
        }
    }
}

impl CredentialNames {
    pub fn new(key_header: HeaderName, form_token_field: impl Into<String>) -> Self {
        Self {
            key_header,
            form_token_field: form_token_field.into(),
        }
    }

    pub fn key_header(&self) -> &HeaderName {
        &self.key_header
    }

    pub fn form_token_field(&self) -> &str {
        &self.form_token_field
    }

    /// Builds credentials from request headers and, for multipart requests,
    /// a lookup over the submitted form fields.
    pub fn read(
        &self,
        headers: &HeaderMap,
        form: impl Fn(&str) -> Option<String>,
    ) -> RequestCredentials {
        let creds = RequestCredentials::from_headers_with(headers, self.key_header.as_str());
        match form(&self.form_token_field) {
            Some(token) => creds.with_form_token(token),
            None => creds,
        }
    }
}
