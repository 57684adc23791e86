//! Session cookie adapters.
//!
//! Implementations of the `SessionCodec` port:
//!
//! - `signed_cookie` - HMAC-SHA256 signed, timestamped username cookies

mod signed_cookie;

pub use signed_cookie::HmacSessionCodec;
