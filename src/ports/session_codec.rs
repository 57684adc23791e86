//! Session cookie codec port.
//!
//! The session cookie carries only a username. The codec signs it on login
//! and verifies it on every request that presents the cookie.

use thiserror::Error;

/// Reasons a session cookie value is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionCodecError {
    #[error("malformed session value")]
    Malformed,

    #[error("session signature mismatch")]
    InvalidSignature,

    #[error("session expired")]
    Expired,

    #[error("session issued in the future")]
    IssuedInFuture,
}

/// Signs and verifies session cookie values.
///
/// Both operations are synchronous and perform no I/O.
pub trait SessionCodec: Send + Sync {
    /// Produces a signed cookie value for `username`.
    fn encode(&self, username: &str) -> String;

    /// Verifies a cookie value and returns the username it carries.
    fn decode(&self, value: &str) -> Result<String, SessionCodecError>;
}
