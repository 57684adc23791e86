//! HTTP adapter - the request front door.
//!
//! ```text
//! request ─► router (RouteTree) ─┬─ matched ─► guards ─► ResourceController
//!                                └─ unmatched ─► not_found
//! ```
//!
//! - `credentials` - token header / session cookie extraction
//! - `identity` - credential to user resolution
//! - `middleware` - the login gate and request-context extractor
//! - `routes` - route tree, dispatcher, OpenAPI rendering, router assembly

pub mod credentials;
pub mod dto;
pub mod identity;
pub mod middleware;
pub mod routes;

pub use credentials::CredentialExtractor;
pub use dto::MessageResponse;
pub use identity::IdentityResolver;
pub use middleware::{Guard, GuardOutcome, Identity, LoginGate};
pub use routes::{build_router, build_router_with, AppServices, AppState, RouteTree, RouterError};
