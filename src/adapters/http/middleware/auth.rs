//! The login gate and its request-context extractor.
//!
//! Guards run before a bound operation and return a tagged outcome instead
//! of short-circuiting on their own:
//!
//! ```text
//! Request → Guard::check ─┬─ Continue(request) → next guard / operation
//!                         └─ Abort(response)   → response sent, operation never runs
//! ```
//!
//! `LoginGate` is the only guard. It requires that *some* user be resolved
//! for the request; it knows nothing about roles or resource ownership.

use async_trait::async_trait;
use axum::{
    extract::Request,
    http::StatusCode,
    response::Response,
};

use crate::adapters::http::dto::MessageResponse;
use crate::adapters::http::identity::IdentityResolver;
use crate::domain::foundation::RequestContext;

/// Result of running one guard.
pub enum GuardOutcome {
    /// Pass the (possibly enriched) request on.
    Continue(Request),
    /// Stop the pipeline and send this response.
    Abort(Response),
}

/// A pre-handler check bound to a route.
#[async_trait]
pub trait Guard: Send + Sync {
    async fn check(&self, request: Request) -> GuardOutcome;
}

/// Requires a resolvable identity.
///
/// On success the request context is stored in the request extensions and
/// the username is recorded on the current request span. On failure the
/// request is aborted with 403 and the failure's reason; the wrapped lookup
/// error is logged but never returned.
#[derive(Clone)]
pub struct LoginGate {
    resolver: IdentityResolver,
}

impl LoginGate {
    pub fn new(resolver: IdentityResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Guard for LoginGate {
    async fn check(&self, mut request: Request) -> GuardOutcome {
        match self.resolver.resolve(request.headers()).await {
            Ok(user) => {
                tracing::Span::current().record("username", user.name.as_str());
                request
                    .extensions_mut()
                    .insert(RequestContext::logged_in(user));
                GuardOutcome::Continue(request)
            }
            Err(failure) => {
                match failure.cause() {
                    Some(cause) => tracing::warn!(
                        reason = %failure,
                        cause = %cause,
                        credential = ?failure.credential_kind(),
                        attempted_name = ?failure.attempted_name(),
                        uri = %request.uri(),
                        "login required"
                    ),
                    None => tracing::debug!(reason = %failure, uri = %request.uri(), "login required"),
                }
                GuardOutcome::Abort(
                    MessageResponse::new(failure.reason()).with_status(StatusCode::FORBIDDEN),
                )
            }
        }
    }
}

/// Extractor for the request context set by the login gate.
///
/// Never rejects: routes without a gate see an anonymous context.
#[derive(Debug, Clone, Default)]
pub struct Identity(pub RequestContext);

impl<S> axum::extract::FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let context = parts
                .extensions
                .get::<RequestContext>()
                .cloned()
                .unwrap_or_else(RequestContext::anonymous);
            Ok(Identity(context))
        })
    }
}
