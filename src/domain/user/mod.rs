//! User records.
//!
//! The login gate only ever reads a `User`: it confirms the record exists and
//! stamps its name into the request context. Creation and mutation belong to
//! the user store.

mod password;

pub use password::PasswordDigest;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A registered user.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Stable, unique login name.
    pub name: String,

    pub email: Option<String>,

    /// Token accepted through the API token header.
    #[serde(skip)]
    pub api_token: Option<String>,

    #[serde(skip)]
    pub password: Option<PasswordDigest>,

    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a user with no credentials attached.
    pub fn new(name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            name: name.into(),
            email,
            api_token: None,
            password: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(PasswordDigest::hash(password));
        self
    }

    /// Returns true if the password matches the stored digest.
    ///
    /// Users without a password (token-only accounts) never match.
    pub fn verify_password(&self, candidate: &str) -> bool {
        self.password
            .as_ref()
            .map(|digest| digest.verify(candidate))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_user_hides_secrets() {
        let user = User::new("alice", Some("alice@example.com".to_string()))
            .with_api_token("tok-alice")
            .with_password("hunter2");

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["name"], "alice");
        assert_eq!(json["email"], "alice@example.com");
        assert!(json.get("api_token").is_none());
        assert!(json.get("password").is_none());
    }

    #[test]
    fn verify_password_checks_digest() {
        let user = User::new("alice", None).with_password("hunter2");
        assert!(user.verify_password("hunter2"));
        assert!(!user.verify_password("hunter3"));
    }

    #[test]
    fn token_only_user_never_matches_a_password() {
        let user = User::new("ci-bot", None).with_api_token("tok");
        assert!(!user.verify_password(""));
        assert!(!user.verify_password("anything"));
    }
}
