//! Adapters - Implementations of port interfaces.
//!
//! - `http` - axum router, login gate and dispatcher
//! - `memory` - in-memory user store and resource controller
//! - `session` - HMAC-signed session cookie codec

pub mod http;
pub mod memory;
pub mod session;

pub use memory::{InMemoryResourceController, InMemoryUserStore};
pub use session::HmacSessionCodec;
