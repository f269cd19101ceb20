//! Error types for the web server
//!
//! Provides unified error handling using thiserror.

use std::collections::TryReserveError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

// == Cache Error Enum ==
/// Errors reported by the content cache.
///
/// None of these are fatal: the cache is left exactly as it was before the
/// failing call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The entry handle no longer refers to a live entry
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// The caller passed something the cache cannot accept
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Storage for a new or replaced entry could not be reserved
    #[error("Allocation failed: {0}")]
    Allocation(String),
}

impl From<TryReserveError> for CacheError {
    fn from(err: TryReserveError) -> Self {
        CacheError::Allocation(err.to_string())
    }
}

// == Server Error Enum ==
/// Errors raised while resolving a request to a resource.
#[derive(Error, Debug)]
pub enum ServerError {
    /// No resource exists for the requested path
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Reading a resource from disk failed for a reason other than absence
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cache rejected an operation
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

// == IntoResponse Implementation ==
/// Maps errors to a bare status and message.
///
/// The file handler renders the 404 page itself and only falls back to this
/// for errors other than `NotFound`.
impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Io(_) | ServerError::Cache(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

// == Result Type Aliases ==
/// Convenience Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Convenience Result type for request handling.
pub type Result<T> = std::result::Result<T, ServerError>;
