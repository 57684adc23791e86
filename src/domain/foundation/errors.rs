//! Error types for the domain layer.

use thiserror::Error;

/// Errors returned by a user lookup.
///
/// Produced by `UserStore` implementations and wrapped into an
/// `AuthFailure` by the identity resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No user matches the supplied key.
    #[error("user not found")]
    NotFound,

    /// The backing store could not answer.
    #[error("user store unavailable: {0}")]
    Unavailable(String),
}

impl LookupError {
    /// Creates an unavailable error with a message.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField {
            field: field.into(),
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
