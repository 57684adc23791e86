//! Foundation module - Shared domain primitives.
//!
//! Contains the identity vocabulary used by the login gate and
//! by every downstream handler.

mod auth;
mod context;
mod errors;

pub use auth::{AuthFailure, Credential, CredentialKind};
pub use context::RequestContext;
pub use errors::{LookupError, ValidationError};
