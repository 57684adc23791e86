//! Domain layer - Core types with no HTTP or storage dependencies.
//!
//! - `foundation` - Credentials, authentication failures, request context
//! - `user` - The user record resolved by identity resolution
//! - `registry` - Organization → Cluster → Bundle → BundleVersion records

pub mod foundation;
pub mod registry;
pub mod user;
