//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the request-dispatch core and the systems it delegates to.
//!
//! - `UserStore` - User lookup by API token or by name
//! - `SessionCodec` - Signing and verification of the session cookie
//! - `ResourceController` - The controller layer behind every route

mod resource_controller;
mod session_codec;
mod user_store;

pub use resource_controller::{
    ControllerError, Operation, OperationCall, OperationOutcome, PathParams, ResourceController,
};
pub use session_codec::{SessionCodec, SessionCodecError};
pub use user_store::UserStore;
