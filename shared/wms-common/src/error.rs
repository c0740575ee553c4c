//! Common Error Types

use thiserror::Error;

/// Errors raised while constructing shared domain types.
#[derive(Debug, Error)]
pub enum Error {
    /// A permission identifier failed validation.
    #[error("Invalid permission identifier '{value}': {reason}")]
    InvalidPermission {
        value: String,
        reason: &'static str,
    },

    /// A role failed field validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Result alias using the common [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
