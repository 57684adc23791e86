//! User lookup port.
//!
//! The identity resolver issues exactly one lookup per request that needs
//! authentication. Lookups are not cached or retried at this layer; any
//! retry policy belongs to the implementation.

use async_trait::async_trait;

use crate::domain::foundation::LookupError;
use crate::domain::user::User;

/// Looks up users by the credentials a request can carry.
///
/// # Contract
///
/// Implementations must:
/// - Return `LookupError::NotFound` when no user matches
/// - Return `LookupError::Unavailable` for transient backend failures
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find the user owning an API token.
    async fn get_by_api_token(&self, token: &str) -> Result<User, LookupError>;

    /// Find a user by login name.
    async fn get_by_name(&self, name: &str) -> Result<User, LookupError>;
}
