//! In-memory user store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::domain::foundation::LookupError;
use crate::domain::user::User;
use crate::ports::UserStore;

/// Why an insert was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsertConflict {
    #[error("user {0} already exists")]
    Name(String),

    #[error("email {0} already registered")]
    Email(String),
}

/// User store backed by a map keyed by user name.
///
/// API tokens are looked up by scanning; the store is meant for development
/// and tests, not for large user counts.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<BTreeMap<String, User>>,
    /// Optional error to return for all lookups (for error testing)
    force_error: RwLock<Option<LookupError>>,
}

impl InMemoryUserStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user while building the store.
    pub fn with_user(mut self, user: User) -> Self {
        self.users.get_mut().insert(user.name.clone(), user);
        self
    }

    /// Forces all lookups to return the specified error.
    pub fn with_error(mut self, error: LookupError) -> Self {
        *self.force_error.get_mut() = Some(error);
        self
    }

    /// Inserts a new user if neither its name nor its email is taken.
    ///
    /// Both checks and the insert happen under one write lock.
    pub async fn insert(&self, user: User) -> Result<(), InsertConflict> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.name) {
            return Err(InsertConflict::Name(user.name));
        }
        if let Some(email) = user.email.as_deref() {
            if users.values().any(|u| u.email.as_deref() == Some(email)) {
                return Err(InsertConflict::Email(email.to_string()));
            }
        }
        users.insert(user.name.clone(), user);
        Ok(())
    }

    /// All users ordered by name.
    pub async fn list(&self) -> Vec<User> {
        self.users.read().await.values().cloned().collect()
    }

    /// Finds a user whose name or email equals `key`.
    pub async fn find_by_name_or_email(&self, key: &str) -> Option<User> {
        let users = self.users.read().await;
        users.get(key).cloned().or_else(|| {
            users
                .values()
                .find(|u| u.email.as_deref() == Some(key))
                .cloned()
        })
    }

    async fn check_forced_error(&self) -> Result<(), LookupError> {
        match self.force_error.read().await.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_by_api_token(&self, token: &str) -> Result<User, LookupError> {
        self.check_forced_error().await?;
        self.users
            .read()
            .await
            .values()
            .find(|u| u.api_token.as_deref().is_some_and(|t| tokens_match(t, token)))
            .cloned()
            .ok_or(LookupError::NotFound)
    }

    async fn get_by_name(&self, name: &str) -> Result<User, LookupError> {
        self.check_forced_error().await?;
        self.users
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or(LookupError::NotFound)
    }
}

fn tokens_match(stored: &str, presented: &str) -> bool {
    stored.as_bytes().ct_eq(presented.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn store() -> InMemoryUserStore {
        InMemoryUserStore::new()
            .with_user(User::new("alice", Some("alice@example.com".to_string())).with_api_token("tok-alice"))
            .with_user(User::new("bob", None))
    }

    #[tokio::test]
    async fn finds_user_by_token() {
        let user = store().get_by_api_token("tok-alice").await.unwrap();
        assert_eq!(user.name, "alice");
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        assert_eq!(
            store().get_by_api_token("tok-nobody").await.unwrap_err(),
            LookupError::NotFound
        );
    }

    #[tokio::test]
    async fn finds_user_by_name() {
        assert_eq!(store().get_by_name("bob").await.unwrap().name, "bob");
        assert_eq!(store().get_by_name("carol").await.unwrap_err(), LookupError::NotFound);
    }

    #[tokio::test]
    async fn forced_error_applies_to_every_lookup() {
        let store = store().with_error(LookupError::unavailable("down"));
        assert_eq!(
            store.get_by_name("alice").await.unwrap_err(),
            LookupError::unavailable("down")
        );
        assert!(store.get_by_api_token("tok-alice").await.is_err());
    }

    #[tokio::test]
    async fn token_prefix_or_extension_does_not_match() {
        let store = store();
        assert!(store.get_by_api_token("tok-alic").await.is_err());
        assert!(store.get_by_api_token("tok-alicex").await.is_err());
        assert!(store.get_by_api_token("").await.is_err());
    }

    #[test]
    fn tokens_match_requires_identical_bytes() {
        assert!(tokens_match("abc", "abc"));
        assert!(!tokens_match("abc", "abd"));
        assert!(!tokens_match("abc", "ab"));
    }

    #[tokio::test]
    async fn insert_refuses_duplicate_name() {
        let store = store();
        assert_eq!(
            store.insert(User::new("alice", None)).await,
            Err(InsertConflict::Name("alice".to_string()))
        );
        assert_eq!(store.insert(User::new("carol", None)).await, Ok(()));
        let names: Vec<_> = store.list().await.into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn insert_refuses_duplicate_email() {
        let store = store();
        let err = store
            .insert(User::new("carol", Some("alice@example.com".to_string())))
            .await
            .unwrap_err();
        assert_eq!(err, InsertConflict::Email("alice@example.com".to_string()));
        assert_eq!(err.to_string(), "email alice@example.com already registered");
        assert!(store.get_by_name("carol").await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_with_same_email_admit_one() {
        for _ in 0..200 {
            let store = Arc::new(InMemoryUserStore::new());
            let handles: Vec<_> = ["u1", "u2"]
                .into_iter()
                .map(|name| {
                    let store = Arc::clone(&store);
                    tokio::spawn(async move {
                        store
                            .insert(User::new(name, Some("same@example.com".to_string())))
                            .await
                    })
                })
                .collect();

            let mut admitted = 0;
            for handle in handles {
                if handle.await.unwrap().is_ok() {
                    admitted += 1;
                }
            }
            assert_eq!(admitted, 1);
            assert_eq!(store.list().await.len(), 1);
        }
    }

    #[tokio::test]
    async fn finds_by_email_as_well_as_name() {
        let store = store();
        assert_eq!(
            store.find_by_name_or_email("alice@example.com").await.map(|u| u.name),
            Some("alice".to_string())
        );
        assert!(store.find_by_name_or_email("nobody").await.is_none());
    }
}
