//! Router assembly.
//!
//! ```text
//! AppConfig + AppServices
//!        │
//!        ▼
//! RouteTree::standard() ── entries() ──► one MethodRouter per path
//!        │                                   └─ dispatch(guards → controller)
//!        ├─ /openapi.json
//!        ├─ static mounts (ServeDir)
//!        └─ fallback: not_found
//! ```

mod dispatch;
mod openapi;
mod tree;

pub use dispatch::{
    dispatch, not_found, openapi_document, static_not_found, AppState, SessionCookieSettings,
    MAX_BODY_BYTES,
};
pub use openapi::{render as render_openapi, API_TITLE, API_VERSION};
pub use tree::{
    BoundOperation, GuardKind, HttpMethod, OperationDoc, RouteEntry, RouteNode, RouteTree,
    RouteTreeError, Segment, Tag, API_PREFIX,
};

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{MatchedPath, Request, State},
    handler::Handler,
    http::{header::HeaderName, HeaderValue, Method},
    routing::{get, MethodRouter},
    Router,
};
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info_span, Span};

use crate::adapters::http::credentials::CredentialExtractor;
use crate::adapters::http::identity::IdentityResolver;
use crate::adapters::http::middleware::LoginGate;
use crate::config::{AppConfig, ValidationError};
use crate::ports::{ResourceController, SessionCodec, UserStore};

/// External collaborators the router dispatches into.
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<dyn UserStore>,
    pub controller: Arc<dyn ResourceController>,
    pub sessions: Arc<dyn SessionCodec>,
}

/// Errors raised while assembling the router.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("invalid route tree: {0}")]
    Routes(#[from] RouteTreeError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationError),
}

/// Builds the application router from the standard route tree.
pub fn build_router(config: &AppConfig, services: AppServices) -> Result<Router, RouterError> {
    build_router_with(RouteTree::standard(), config, services)
}

/// Builds the application router from an explicit route tree.
pub fn build_router_with(
    tree: RouteTree,
    config: &AppConfig,
    services: AppServices,
) -> Result<Router, RouterError> {
    let entries = tree.entries()?;
    let mounts = config.server.static_mounts()?;

    let extractor = CredentialExtractor::new(
        config.auth.api_token_header_name()?,
        config.auth.session_cookie_name.clone(),
        services.sessions.clone(),
    );
    let docs = render_openapi(
        &entries,
        extractor.token_header().as_str(),
        extractor.cookie_name(),
    );
    let login_gate = LoginGate::new(IdentityResolver::new(extractor, services.users));

    let state = AppState {
        login_gate: Arc::new(login_gate),
        controller: services.controller,
        sessions: services.sessions,
        cookie: SessionCookieSettings {
            name: config.auth.session_cookie_name.clone(),
            max_age_secs: config.auth.session_max_age_secs,
            secure: config.is_production(),
        },
        static_prefixes: Arc::new(mounts.iter().map(|m| m.prefix.clone()).collect()),
        docs: Arc::new(docs),
    };

    let mut by_path: BTreeMap<String, MethodRouter<AppState>> = BTreeMap::new();
    for entry in entries {
        let path = entry.path.clone();
        let filter = entry.bound.method.filter();
        let entry = Arc::new(entry);
        let handler = move |State(state): State<AppState>, request: Request| {
            let entry = Arc::clone(&entry);
            async move { dispatch(state, entry, request).await }
        };
        let method_router = match by_path.remove(&path) {
            Some(existing) => existing.on(filter, handler),
            None => axum::routing::on(filter, handler),
        };
        by_path.insert(path, method_router);
    }

    let mut router = Router::new().route("/openapi.json", get(openapi_document));
    for (path, method_router) in by_path {
        router = router.route(&path, method_router.fallback(not_found));
    }

    for mount in &mounts {
        tracing::info!(prefix = %mount.prefix, dir = %mount.dir.display(), "serving static assets");
        let serve_dir = ServeDir::new(&mount.dir)
            .call_fallback_on_method_not_allowed(true)
            .fallback(static_not_found.with_state(state.clone()));
        router = router.nest_service(&mount.prefix, serve_dir);
    }

    let mut router = router.fallback(not_found).with_state(state);

    let origins = config.server.cors_origins_list();
    if !origins.is_empty() {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect();
        router = router.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    config.auth.api_token_header_name()?,
                ])
                .allow_credentials(true),
        );
    }

    let request_id = HeaderName::from_static("x-request-id");
    Ok(router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(PropagateRequestIdLayer::new(request_id)),
    ))
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id,
        username = tracing::field::Empty,
    )
}
