//! Bundlehub - request front door for a multi-tenant model bundle registry.
//!
//! Resolves the caller's identity from an API token header or a signed
//! session cookie, enforces the login gate, and dispatches the
//! organization → cluster → bundle → version route tree to a resource
//! controller.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
