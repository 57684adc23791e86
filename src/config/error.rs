//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid static directory mapping: {0}")]
    InvalidStaticDir(String),

    #[error("Session secret must be at least {0} bytes in production")]
    SessionSecretTooShort(usize),

    #[error("Invalid API token header name: {0}")]
    InvalidHeaderName(String),

    #[error("Invalid session cookie name: {0}")]
    InvalidCookieName(String),

    #[error("Session max age must be positive")]
    InvalidSessionMaxAge,
}
