//! Dispatch of matched routes, and the fallback for unmatched ones.
//!
//! A matched route runs its guards in order. Each guard returns
//! `Continue(request)` or `Abort(response)` and the dispatcher checks the
//! tag itself; an aborted request never reaches the controller.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{FromRequestParts, OriginalUri, Path, Request, State},
    http::{header::SET_COOKIE, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use super::tree::{GuardKind, RouteEntry, API_PREFIX};
use crate::adapters::http::dto::MessageResponse;
use crate::adapters::http::middleware::{Guard, GuardOutcome, Identity, LoginGate};
use crate::ports::{
    ControllerError, OperationCall, OperationOutcome, PathParams, ResourceController, SessionCodec,
};

/// Largest request body read before dispatch.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// How the session cookie is written back.
#[derive(Debug, Clone)]
pub struct SessionCookieSettings {
    pub name: String,
    pub max_age_secs: u64,
    pub secure: bool,
}

impl SessionCookieSettings {
    /// Full `Set-Cookie` value for an encoded session.
    pub fn header_value(&self, encoded: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.name, encoded, self.max_age_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// State shared by every route handler.
#[derive(Clone)]
pub struct AppState {
    pub login_gate: Arc<LoginGate>,
    pub controller: Arc<dyn ResourceController>,
    pub sessions: Arc<dyn SessionCodec>,
    pub cookie: SessionCookieSettings,
    /// Prefixes of mounted static directories.
    pub static_prefixes: Arc<Vec<String>>,
    /// Rendered API description served at `/openapi.json`.
    pub docs: Arc<Value>,
}

impl AppState {
    fn guard(&self, kind: GuardKind) -> &dyn Guard {
        match kind {
            GuardKind::RequireLogin => self.login_gate.as_ref(),
        }
    }

    fn is_structured_miss(&self, path: &str) -> bool {
        path.starts_with(API_PREFIX)
            || self
                .static_prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// Runs one matched route end to end.
pub async fn dispatch(state: AppState, entry: Arc<RouteEntry>, request: Request) -> Response {
    let mut request = request;
    for kind in &entry.bound.guards {
        match state.guard(*kind).check(request).await {
            GuardOutcome::Continue(next) => request = next,
            GuardOutcome::Abort(response) => return response,
        }
    }

    let (mut parts, body) = request.into_parts();

    let Identity(context) = match Identity::from_request_parts(&mut parts, &state).await {
        Ok(identity) => identity,
        Err(never) => match never {},
    };

    let params = if entry.params.is_empty() {
        PathParams::default()
    } else {
        match Path::<HashMap<String, String>>::from_request_parts(&mut parts, &state).await {
            Ok(Path(params)) => PathParams::from(params),
            Err(rejection) => {
                return MessageResponse::new(rejection.body_text())
                    .with_status(StatusCode::BAD_REQUEST)
            }
        }
    };

    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => match parse_json(&bytes) {
            Ok(body) => body,
            Err(response) => return response,
        },
        Err(_) => {
            return MessageResponse::new("request body too large or unreadable")
                .with_status(StatusCode::BAD_REQUEST)
        }
    };

    let operation = entry.bound.operation;
    tracing::debug!(%operation, params = params.len(), "dispatching");

    let call = OperationCall {
        params,
        context,
        body,
    };
    match state.controller.invoke(operation, call).await {
        Ok(outcome) => success_response(&state, outcome),
        Err(e) => error_response(operation.as_str(), e),
    }
}

fn parse_json(bytes: &Bytes) -> Result<Option<Value>, Response> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes).map(Some).map_err(|e| {
        MessageResponse::new(format!("invalid JSON body: {}", e)).with_status(StatusCode::BAD_REQUEST)
    })
}

fn success_response(state: &AppState, outcome: OperationOutcome) -> Response {
    let mut response = Json(outcome.body).into_response();
    if let Some(username) = outcome.established_session {
        let cookie = state.cookie.header_value(&state.sessions.encode(&username));
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => {
                tracing::error!(error = %e, "session cookie is not a valid header value");
                return MessageResponse::new("failed to establish session")
                    .with_status(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }
    response
}

fn error_response(operation: &str, error: ControllerError) -> Response {
    let status = match &error {
        ControllerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ControllerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ControllerError::NotFound(_) => StatusCode::NOT_FOUND,
        ControllerError::Conflict(_) => StatusCode::CONFLICT,
        ControllerError::Unsupported(_) => StatusCode::NOT_IMPLEMENTED,
        ControllerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(operation, error = %error, "operation failed");
    } else {
        tracing::debug!(operation, error = %error, "operation rejected");
    }
    MessageResponse::new(error.to_string()).with_status(status)
}

fn route_not_found(method: &Method) -> Response {
    MessageResponse::new(format!("not found this router with method {}", method))
        .with_status(StatusCode::NOT_FOUND)
}

/// Fallback for requests no route matched.
///
/// API and static-prefix paths get the structured message; anything else is
/// a bare 404.
pub async fn not_found(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> Response {
    if state.is_structured_miss(uri.path()) {
        route_not_found(&method)
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

/// Fallback for misses inside a mounted static directory.
pub async fn static_not_found(method: Method) -> Response {
    route_not_found(&method)
}

/// `GET /openapi.json`.
pub async fn openapi_document(State(state): State<AppState>) -> Json<Value> {
    Json(state.docs.as_ref().clone())
}
