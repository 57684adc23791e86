//! In-memory adapters.
//!
//! Implementations of the `UserStore` and `ResourceController` ports that
//! keep everything in process memory. They back the binary out of the box
//! and let the HTTP surface be exercised end to end without a database.

mod controller;
mod requests;
mod user_store;

pub use controller::InMemoryResourceController;
pub use user_store::{InMemoryUserStore, InsertConflict};
