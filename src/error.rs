//! Error types for the aggregation cache
//!
//! Provides unified error handling using thiserror.
//!
//! Validation failures and store failures are deliberately separate variants:
//! callers must be able to tell a bad request apart from degraded
//! infrastructure when deciding whether a retry makes sense.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the aggregation cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Store unreachable or failed its health probe at construction.
    /// Fatal: the process halts rather than degrading silently.
    #[error("Store connection failed: {0}")]
    Connection(String),

    /// Unknown column name or unsupported aggregation function.
    /// Never cached; the caller can retry with corrected input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A store operation failed after a successful startup.
    /// Propagated as-is; retry policy is the caller's concern.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Dataset could not be read or parsed
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Key or field not found (HTTP surface only)
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<csv::Error> for CacheError {
    fn from(err: csv::Error) -> Self {
        CacheError::Dataset(err.to_string())
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Dataset(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::Connection(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            CacheError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CacheError::StoreUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            CacheError::Dataset(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            CacheError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the aggregation cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_and_store_errors_are_distinct() {
        let validation = CacheError::Validation("Column not found: NOPE".to_string());
        let store = CacheError::StoreUnavailable("lock poisoned".to_string());

        assert!(matches!(validation, CacheError::Validation(_)));
        assert!(matches!(store, CacheError::StoreUnavailable(_)));
        assert!(validation.to_string().contains("NOPE"));
    }

    #[test]
    fn test_error_display() {
        let err = CacheError::Connection("refused".to_string());
        assert_eq!(err.to_string(), "Store connection failed: refused");
    }
}
