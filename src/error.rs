//! Error types for the todo service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Failures surfaced by the cache-aside layer and its stores.
///
/// Decode failures and read-side store failures never show up here: the
/// coordinator treats them as cache misses.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache key rejected before any I/O
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    /// Expiration options rejected before any I/O
    #[error("Invalid expiration: {0}")]
    InvalidExpiration(String),

    /// Store unreachable or a store command failed
    #[error("Store failure: {0}")]
    Store(String),

    /// Value could not be encoded for the store
    #[error("Serialization failure: {0}")]
    Serialization(String),

    /// The value factory failed
    #[error("Value factory failed: {0}")]
    Factory(#[source] anyhow::Error),

    /// Caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Store(err.to_string())
    }
}

// == API Error Enum ==
/// Errors returned by the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Cache layer failure
    #[error(transparent)]
    Cache(#[from] CacheError),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Cache(CacheError::Cancelled) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Cache(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Aliases ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Convenience Result type for HTTP handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
