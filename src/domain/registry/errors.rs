//! Registry error types.

use thiserror::Error;

use super::UploadStatus;
use crate::domain::foundation::ValidationError;

/// Errors raised by registry records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("cannot {action} a bundle version whose upload is {from}")]
    InvalidUploadTransition {
        from: UploadStatus,
        action: &'static str,
    },
}
