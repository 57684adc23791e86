//! Authentication configuration

use http::HeaderName;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Minimum session secret length accepted in production.
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Authentication configuration (API token header and session cookie)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Key used to sign session cookies
    pub session_secret_key: String,

    /// Header carrying the API token credential
    #[serde(default = "default_api_token_header")]
    pub api_token_header: String,

    /// Name of the signed session cookie
    #[serde(default = "default_session_cookie_name")]
    pub session_cookie_name: String,

    /// Session lifetime in seconds
    #[serde(default = "default_session_max_age")]
    pub session_max_age_secs: u64,
}

impl AuthConfig {
    /// Get session lifetime as Duration
    pub fn session_max_age(&self) -> Duration {
        Duration::from_secs(self.session_max_age_secs)
    }

    /// Parsed API token header name
    pub fn api_token_header_name(&self) -> Result<HeaderName, ValidationError> {
        HeaderName::from_bytes(self.api_token_header.as_bytes())
            .map_err(|_| ValidationError::InvalidHeaderName(self.api_token_header.clone()))
    }

    /// Validate authentication configuration
    ///
    /// In production, requires a session secret of at least
    /// [`MIN_PRODUCTION_SECRET_LEN`] bytes.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.session_secret_key.is_empty() {
            return Err(ValidationError::MissingRequired("SESSION_SECRET_KEY"));
        }
        if *environment == Environment::Production
            && self.session_secret_key.len() < MIN_PRODUCTION_SECRET_LEN
        {
            return Err(ValidationError::SessionSecretTooShort(MIN_PRODUCTION_SECRET_LEN));
        }

        self.api_token_header_name()?;

        if !is_cookie_token(&self.session_cookie_name) {
            return Err(ValidationError::InvalidCookieName(
                self.session_cookie_name.clone(),
            ));
        }
        if self.session_max_age_secs == 0 {
            return Err(ValidationError::InvalidSessionMaxAge);
        }

        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret_key: String::new(),
            api_token_header: default_api_token_header(),
            session_cookie_name: default_session_cookie_name(),
            session_max_age_secs: default_session_max_age(),
        }
    }
}

// RFC 6265 cookie-name is an RFC 7230 token.
fn is_cookie_token(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

fn default_api_token_header() -> String {
    "X-Bundlehub-Api-Token".to_string()
}

fn default_session_cookie_name() -> String {
    "bundlehub-session".to_string()
}

fn default_session_max_age() -> u64 {
    30 * 24 * 3600
}
