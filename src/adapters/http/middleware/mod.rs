//! HTTP middleware for axum.
//!
//! - `auth` - the login gate and the identity extractor

pub mod auth;

pub use auth::{Guard, GuardOutcome, Identity, LoginGate};
