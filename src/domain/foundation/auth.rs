//! Credentials and authentication failures.
//!
//! A request carries at most one `Credential`. The API token wins whenever it
//! is present and non-empty; the session cookie is only consulted otherwise.
//!
//! `AuthFailure` keeps the underlying lookup error as its `source()` so it can
//! be logged in full, while its `Display` is the short reason that is safe to
//! return to the caller.

use std::fmt;

use thiserror::Error;

use super::LookupError;

/// Which credential form a request presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    ApiToken,
    SessionCookie,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialKind::ApiToken => write!(f, "api_token"),
            CredentialKind::SessionCookie => write!(f, "session_cookie"),
        }
    }
}

/// A caller-supplied proof of identity.
///
/// Both variants are guaranteed non-empty: the only way to build one is
/// through [`Credential::api_token`] or [`Credential::session_cookie`], which
/// refuse empty values.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Raw API token taken from the configured header.
    ApiToken(String),
    /// Username decoded from the signed session cookie.
    SessionCookie(String),
}

impl Credential {
    /// Builds an API token credential, or `None` for an empty value.
    pub fn api_token(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        (!value.is_empty()).then_some(Credential::ApiToken(value))
    }

    /// Builds a session credential, or `None` for an empty username.
    pub fn session_cookie(username: impl Into<String>) -> Option<Self> {
        let username = username.into();
        (!username.is_empty()).then_some(Credential::SessionCookie(username))
    }

    pub fn kind(&self) -> CredentialKind {
        match self {
            Credential::ApiToken(_) => CredentialKind::ApiToken,
            Credential::SessionCookie(_) => CredentialKind::SessionCookie,
        }
    }
}

// Tokens never reach log output.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::ApiToken(_) => f.debug_tuple("ApiToken").field(&"<redacted>").finish(),
            Credential::SessionCookie(name) => f.debug_tuple("SessionCookie").field(name).finish(),
        }
    }
}

/// Why identity resolution failed.
///
/// Missing credentials and failed lookups are reported through the same
/// status by the login gate; only the reason string differs.
#[derive(Debug, Clone, Error)]
pub enum AuthFailure {
    /// No token, no cookie, or a cookie that decoded to an empty username.
    #[error("empty username in session")]
    CredentialAbsent,

    /// The user store rejected the API token.
    #[error("token lookup failed")]
    TokenLookup {
        #[source]
        source: LookupError,
    },

    /// The user store rejected the username carried by the session cookie.
    #[error("user lookup by name failed")]
    NameLookup {
        name: String,
        #[source]
        source: LookupError,
    },
}

impl AuthFailure {
    /// The human-readable reason surfaced to the caller.
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// The credential form that was attempted, if any.
    pub fn credential_kind(&self) -> Option<CredentialKind> {
        match self {
            AuthFailure::CredentialAbsent => None,
            AuthFailure::TokenLookup { .. } => Some(CredentialKind::ApiToken),
            AuthFailure::NameLookup { .. } => Some(CredentialKind::SessionCookie),
        }
    }

    /// The username a session cookie asked for, when its lookup failed.
    ///
    /// Tokens are never reported here.
    pub fn attempted_name(&self) -> Option<&str> {
        match self {
            AuthFailure::NameLookup { name, .. } => Some(name),
            AuthFailure::CredentialAbsent | AuthFailure::TokenLookup { .. } => None,
        }
    }

    /// The wrapped lookup error, for internal logging only.
    pub fn cause(&self) -> Option<&LookupError> {
        match self {
            AuthFailure::CredentialAbsent => None,
            AuthFailure::TokenLookup { source } | AuthFailure::NameLookup { source, .. } => {
                Some(source)
            }
        }
    }
}
