//! Credential extraction from request headers.
//!
//! Looks at the API token header first. Only when that header is absent or
//! empty is the session cookie consulted. A cookie that fails to decode is
//! treated the same as no cookie.

use std::sync::Arc;

use axum::http::header::{HeaderMap, HeaderName, COOKIE};

use crate::domain::foundation::Credential;
use crate::ports::SessionCodec;

/// Pulls at most one credential out of a request.
#[derive(Clone)]
pub struct CredentialExtractor {
    token_header: HeaderName,
    cookie_name: String,
    sessions: Arc<dyn SessionCodec>,
}

impl CredentialExtractor {
    pub fn new(
        token_header: HeaderName,
        cookie_name: impl Into<String>,
        sessions: Arc<dyn SessionCodec>,
    ) -> Self {
        Self {
            token_header,
            cookie_name: cookie_name.into(),
            sessions,
        }
    }

    pub fn token_header(&self) -> &HeaderName {
        &self.token_header
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Returns the credential the request presents, if any.
    pub fn extract(&self, headers: &HeaderMap) -> Option<Credential> {
        let token = headers
            .get(&self.token_header)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).trim().to_string())
            .and_then(Credential::api_token);
        if token.is_some() {
            return token;
        }

        let raw = self.cookie_value(headers)?;
        match self.sessions.decode(&raw) {
            Ok(username) => Credential::session_cookie(username),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring undecodable session cookie");
                None
            }
        }
    }

    fn cookie_value(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::session::HmacSessionCodec;
    use axum::http::HeaderValue;

    const TOKEN_HEADER: &str = "x-bundlehub-api-token";
    const COOKIE_NAME: &str = "bundlehub-session";

    fn codec() -> Arc<HmacSessionCodec> {
        Arc::new(HmacSessionCodec::new("test-secret", 3600))
    }

    fn extractor() -> CredentialExtractor {
        CredentialExtractor::new(HeaderName::from_static(TOKEN_HEADER), COOKIE_NAME, codec())
    }

    fn cookie_for(username: &str) -> HeaderValue {
        let value = format!("{}={}", COOKIE_NAME, codec().encode(username));
        HeaderValue::from_str(&value).unwrap()
    }

    #[test]
    fn no_headers_yield_no_credential() {
        assert_eq!(extractor().extract(&HeaderMap::new()), None);
    }

    #[test]
    fn token_header_yields_api_token() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("tok-1"));
        assert_eq!(extractor().extract(&headers), Credential::api_token("tok-1"));
    }

    #[test]
    fn token_wins_over_valid_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("tok-1"));
        headers.insert(COOKIE, cookie_for("alice"));
        assert_eq!(extractor().extract(&headers), Credential::api_token("tok-1"));
    }

    #[test]
    fn empty_token_falls_back_to_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static(""));
        headers.insert(COOKIE, cookie_for("alice"));
        assert_eq!(extractor().extract(&headers), Credential::session_cookie("alice"));
    }

    #[test]
    fn cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        let other = HeaderValue::from_static("theme=dark; lang=en");
        headers.append(COOKIE, other);
        headers.append(COOKIE, cookie_for("bob"));
        assert_eq!(extractor().extract(&headers), Credential::session_cookie("bob"));
    }

    #[test]
    fn tampered_cookie_is_treated_as_absent() {
        let mut headers = HeaderMap::new();
        let forged = format!("{}=616c696365.0.deadbeef", COOKIE_NAME);
        headers.insert(COOKIE, HeaderValue::from_str(&forged).unwrap());
        assert_eq!(extractor().extract(&headers), None);
    }

    #[test]
    fn credential_extractor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CredentialExtractor>();
    }
}
