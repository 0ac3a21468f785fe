//! Error types for the cache node
//!
//! Provides unified error handling using thiserror.

use std::error::Error as StdError;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Boxed error returned by application-supplied loaders.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

// == Cache Error Enum ==
/// Unified error type for cache reads and wiring.
///
/// Cloneable so a single deduplicated load can hand the same outcome to every
/// waiting caller.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Empty key on read
    #[error("key is required")]
    InvalidKey,

    /// The loader for a missing key failed; the original error is kept intact
    #[error("{0}")]
    Loader(Arc<dyn StdError + Send + Sync + 'static>),

    /// No group registered under the requested name
    #[error("no such group: {0}")]
    GroupNotFound(String),

    /// Malformed request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Contract violation while wiring groups and peers
    #[error("setup violation: {0}")]
    SetupViolation(String),
}

impl CacheError {
    /// Wraps a loader failure, preserving the original error payload.
    pub fn loader(err: BoxError) -> Self {
        CacheError::Loader(Arc::from(err))
    }

    /// Returns the loader's original error, if this is a loader failure.
    pub fn loader_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            CacheError::Loader(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidKey | CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Loader(_) | CacheError::SetupViolation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache node.
pub type Result<T> = std::result::Result<T, CacheError>;
