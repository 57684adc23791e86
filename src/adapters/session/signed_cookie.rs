//! HMAC-SHA256 signed session cookies.
//!
//! Cookie value format:
//!
//! ```text
//! <hex(username)>.<issued_at_unix>.<hex(hmac_sha256(secret, "<hex(username)>.<issued_at_unix>"))>
//! ```
//!
//! The username is hex encoded so the value never needs cookie quoting.
//! Signatures are compared in constant time and the issue timestamp bounds
//! the session lifetime.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::AuthConfig;
use crate::ports::{SessionCodec, SessionCodecError};

/// Maximum allowed clock skew for cookies issued "in the future" (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Signs session cookies with a shared secret.
pub struct HmacSessionCodec {
    secret: SecretString,
    max_age_secs: i64,
}

impl HmacSessionCodec {
    /// Creates a codec with the given secret and session lifetime.
    pub fn new(secret: impl Into<String>, max_age_secs: u64) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
            max_age_secs: i64::try_from(max_age_secs).unwrap_or(i64::MAX),
        }
    }

    /// Creates a codec from the authentication configuration.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.session_secret_key.clone(), config.session_max_age_secs)
    }

    /// Encodes with an explicit issue time.
    pub fn encode_at(&self, username: &str, issued_at: i64) -> String {
        let payload = format!("{}.{}", hex::encode(username), issued_at);
        let signature = self.sign(&payload);
        format!("{}.{}", payload, hex::encode(signature))
    }

    /// Decodes relative to an explicit clock.
    pub fn decode_at(&self, value: &str, now: i64) -> Result<String, SessionCodecError> {
        let (payload, signature_hex) = value
            .rsplit_once('.')
            .ok_or(SessionCodecError::Malformed)?;
        let (username_hex, issued_at) = payload
            .split_once('.')
            .ok_or(SessionCodecError::Malformed)?;

        let signature = hex::decode(signature_hex).map_err(|_| SessionCodecError::Malformed)?;
        if !constant_time_compare(&self.sign(payload), &signature) {
            return Err(SessionCodecError::InvalidSignature);
        }

        let issued_at: i64 = issued_at.parse().map_err(|_| SessionCodecError::Malformed)?;
        let age = now.saturating_sub(issued_at);
        if age > self.max_age_secs {
            return Err(SessionCodecError::Expired);
        }
        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(SessionCodecError::IssuedInFuture);
        }

        let username = hex::decode(username_hex).map_err(|_| SessionCodecError::Malformed)?;
        String::from_utf8(username).map_err(|_| SessionCodecError::Malformed)
    }

    fn sign(&self, payload: &str) -> Vec<u8> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key");
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

impl SessionCodec for HmacSessionCodec {
    fn encode(&self, username: &str) -> String {
        self.encode_at(username, chrono::Utc::now().timestamp())
    }

    fn decode(&self, value: &str) -> Result<String, SessionCodecError> {
        self.decode_at(value, chrono::Utc::now().timestamp())
    }
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
