//! Error types for the storefront cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    body::Bytes,
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache and the gateway.
///
/// The type is `Clone` because one fetch result is handed to every caller
/// that joined the same in-flight fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Cache key rejected (empty)
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Invalidation pattern failed to compile
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Fetcher returned an error
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Backend answered with a non-success status
    ///
    /// With a `content_type` the backend body is relayed as is.
    #[error("Upstream returned {status}: {}", String::from_utf8_lossy(.body))]
    Upstream {
        status: u16,
        content_type: Option<String>,
        body: Bytes,
    },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request body exceeds the configured limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for CacheError {
    fn from(err: anyhow::Error) -> Self {
        CacheError::Fetch(format!("{err:#}"))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        if let CacheError::Upstream {
            status,
            content_type: Some(content_type),
            body,
        } = &self
        {
            let code = StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
            let mut response = (code, body.clone()).into_response();
            if let Ok(value) = HeaderValue::from_str(content_type) {
                response.headers_mut().insert(CONTENT_TYPE, value);
            }
            return response;
        }

        let status = match &self {
            CacheError::InvalidKey(_)
            | CacheError::InvalidPattern(_)
            | CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Fetch(_) => StatusCode::BAD_GATEWAY,
            CacheError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the storefront cache.
pub type Result<T> = std::result::Result<T, CacheError>;
