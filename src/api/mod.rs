//! Remote API access
//!
//! The [`ApiClient`] issues single decoded requests against the remote
//! service, classifies HTTP outcomes into [`ApiError`], and keeps a
//! budgeted in-memory cache of successful response bodies.

use chrono::{DateTime, Utc};

pub mod client;
pub mod response_cache;

pub use client::{ApiClient, BASE_URL, CLIENT_USER_AGENT};
pub use response_cache::ResponseCache;

/// API errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Endpoint did not form a well-formed URL
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Transport-level failure (DNS, connect, timeout, body read)
    #[error("network error: {0}")]
    NetworkFailed(String),

    /// Response body did not decode into the expected shape
    #[error("decode error: {0}")]
    DecodingFailed(String),

    /// Resource does not exist (HTTP 404)
    #[error("resource not found")]
    NotFound,

    /// Remote API throttled the request (HTTP 429)
    #[error("rate limited by remote API")]
    RateLimited,

    /// Remote server failure (HTTP 500-599)
    #[error("server error: HTTP {0}")]
    ServerError(u16),

    /// Any other non-success HTTP status
    #[error("unexpected HTTP status {0}")]
    HttpError(u16),
}

impl ApiError {
    /// User-facing recovery suggestion, where one applies.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            ApiError::InvalidEndpoint(_) => None,
            ApiError::NetworkFailed(_) => Some("check connectivity and try again"),
            ApiError::DecodingFailed(_) => None,
            ApiError::NotFound => Some("check the id or name spelling"),
            ApiError::RateLimited => Some("wait a moment and retry"),
            ApiError::ServerError(_) => Some("the service is having trouble; retry later"),
            ApiError::HttpError(_) => Some("retry; report if the problem persists"),
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Snapshot of a surfaced fetch failure, kept by the repository for
/// polling surfaces. Never cached alongside entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// Human-readable description of what failed
    pub description: String,
    /// Recovery suggestion, where one applies
    pub suggestion: Option<String>,
    /// When the failure was recorded
    pub occurred_at: DateTime<Utc>,
}

impl From<&ApiError> for ErrorReport {
    fn from(error: &ApiError) -> Self {
        Self {
            description: error.to_string(),
            suggestion: error.recovery_suggestion().map(str::to_string),
            occurred_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_suggestions() {
        assert!(ApiError::RateLimited.recovery_suggestion().is_some());
        assert!(ApiError::NotFound.recovery_suggestion().is_some());
        assert!(ApiError::NetworkFailed("timeout".into())
            .recovery_suggestion()
            .is_some());
        assert!(ApiError::DecodingFailed("bad json".into())
            .recovery_suggestion()
            .is_none());
    }

    #[test]
    fn test_error_report_carries_description_and_suggestion() {
        let report = ErrorReport::from(&ApiError::ServerError(503));
        assert!(report.description.contains("503"));
        assert!(report.suggestion.is_some());
    }
}
