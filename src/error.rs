//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for store operations, persistence and the HTTP layer.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key is absent or its TTL has elapsed
    #[error("Key not found: {0}")]
    NotFound(String),

    /// `set` was called on a key that is already present
    #[error("Key already exists: {0}")]
    AlreadyExists(String),

    /// Snapshot file could not be opened, read, written or renamed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot is corrupt or was written by an incompatible codec version
    #[error("Snapshot decode failed: {0}")]
    Decode(String),

    /// Codec could not encode the current contents
    #[error("Snapshot encode failed: {0}")]
    Encode(String),

    /// A flush was requested on a cache with no persistence file
    #[error("Persistence is not configured")]
    PersistenceDisabled,

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Background task failure
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::AlreadyExists(_) => StatusCode::CONFLICT,
            CacheError::InvalidRequest(_) | CacheError::PersistenceDisabled => {
                StatusCode::BAD_REQUEST
            }
            CacheError::Io(_)
            | CacheError::Decode(_)
            | CacheError::Encode(_)
            | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
