//! CLI error types and conversions

use crate::api::ApiError;
use crate::store::StoreError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// API error
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Store error
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Background task failure
    #[error("background task failed: {0}")]
    Runtime(String),
}

impl CliError {
    /// User-facing recovery suggestion, where one applies.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Api(api) => api.recovery_suggestion(),
            _ => None,
        }
    }
}
