//! Identity resolution: credential → user.

use std::sync::Arc;

use axum::http::HeaderMap;

use super::credentials::CredentialExtractor;
use crate::domain::foundation::{AuthFailure, Credential};
use crate::domain::user::User;
use crate::ports::UserStore;

/// Resolves the caller of a request to a `User`.
///
/// Performs exactly one user-store lookup per call, keyed by whichever
/// credential the extractor found. Nothing is cached between requests.
#[derive(Clone)]
pub struct IdentityResolver {
    extractor: CredentialExtractor,
    users: Arc<dyn UserStore>,
}

impl IdentityResolver {
    pub fn new(extractor: CredentialExtractor, users: Arc<dyn UserStore>) -> Self {
        Self { extractor, users }
    }

    pub fn extractor(&self) -> &CredentialExtractor {
        &self.extractor
    }

    pub async fn resolve(&self, headers: &HeaderMap) -> Result<User, AuthFailure> {
        let credential = self.extractor.extract(headers).ok_or(AuthFailure::CredentialAbsent)?;
        tracing::trace!(credential = %credential.kind(), "resolving identity");

        match credential {
            Credential::ApiToken(token) => self
                .users
                .get_by_api_token(&token)
                .await
                .map_err(|source| AuthFailure::TokenLookup { source }),
            Credential::SessionCookie(name) => {
                match self.users.get_by_name(&name).await {
                    Ok(user) => Ok(user),
                    Err(source) => Err(AuthFailure::NameLookup { name, source }),
                }
            }
        }
    }
}
