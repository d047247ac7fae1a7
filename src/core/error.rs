//! Typed error handling for docquery
//!
//! Every failure that can leave the core is an [`ApiError`]. Each variant wraps
//! a more specific category so callers can match on the exact case while the
//! HTTP layer only needs [`ApiError::status_code`] and the `IntoResponse` impl.
//!
//! # Error Categories
//!
//! - [`QueryError`]: query parameters that cannot be compiled (malformed filter or projection)
//! - [`RecordError`]: single-record lookups that found nothing
//! - [`RequestError`]: malformed identifiers, bodies or unknown routes
//! - [`StorageError`]: failures raised by the storage collaborator, passed through
//! - [`ConfigError`]: configuration loading and validation
//!
//! # Example
//!
//! ```rust,ignore
//! match service.find_by_id("courses", id).await {
//!     Ok(envelope) => println!("{:?}", envelope.data),
//!     Err(ApiError::Record(RecordError::NotFound { id, .. })) => {
//!         println!("no record {}", id);
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Boxed source error carried by storage failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for docquery
#[derive(Debug, Error)]
pub enum ApiError {
    /// Query parameters could not be compiled
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Single-record lookups
    #[error(transparent)]
    Record(#[from] RecordError),

    /// HTTP/Request errors
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Storage backend errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `false`, mirrors the `success` flag of result envelopes
    pub success: bool,
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub error: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Query(_) => StatusCode::BAD_REQUEST,
            ApiError::Record(e) => e.status_code(),
            ApiError::Request(e) => e.status_code(),
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Query(e) => e.error_code(),
            ApiError::Record(e) => e.error_code(),
            ApiError::Request(e) => e.error_code(),
            ApiError::Storage(e) => e.error_code(),
            ApiError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            code: self.error_code().to_string(),
            error: self.to_string(),
            details: self.details(),
        }
    }

    /// Get additional details for the error
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Query(QueryError::MalformedFilter { field, reason }) => {
                Some(serde_json::json!({ "field": field, "reason": reason }))
            }
            ApiError::Record(RecordError::NotFound { collection, id }) => {
                Some(serde_json::json!({ "collection": collection, "id": id }))
            }
            ApiError::Request(RequestError::InvalidRecordId { id }) => {
                Some(serde_json::json!({ "id": id }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Query Errors
// =============================================================================

/// Errors raised while compiling raw query parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A filter parameter cannot be turned into a filter expression
    #[error("Malformed filter on '{field}': {reason}")]
    MalformedFilter { field: String, reason: String },

    /// The `select` parameter mixes included and excluded fields
    #[error("Malformed projection: {reason}")]
    MalformedProjection { reason: String },
}

impl QueryError {
    pub(crate) fn filter(field: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryError::MalformedFilter {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::MalformedFilter { .. } => "MALFORMED_FILTER",
            QueryError::MalformedProjection { .. } => "MALFORMED_PROJECTION",
        }
    }
}

// =============================================================================
// Record Errors
// =============================================================================

/// Errors related to single-record operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// No record carries the requested identifier
    #[error("{collection} record not found with id of {id}")]
    NotFound { collection: String, id: String },
}

impl RecordError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RecordError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RecordError::NotFound { .. } => "RECORD_NOT_FOUND",
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to the shape of an HTTP request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Path identifier is not a valid record id
    #[error("Invalid record id: {id}")]
    InvalidRecordId { id: String },

    /// Request body is not a JSON object
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    /// No collection or route is mounted at the path
    #[error("No route for {path}")]
    RouteNotFound { path: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidRecordId { .. } => StatusCode::BAD_REQUEST,
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            RequestError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidRecordId { .. } => "INVALID_RECORD_ID",
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::RouteNotFound { .. } => "ROUTE_NOT_FOUND",
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors raised by the storage collaborator
///
/// The original error is kept as the `source` so callers can walk the chain.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A store operation failed
    #[error("{backend} storage error: {source}")]
    Backend {
        backend: String,
        #[source]
        source: BoxError,
    },

    /// The store could not be reached at all
    #[error("{backend} storage is unavailable: {message}")]
    Unavailable { backend: String, message: String },
}

impl StorageError {
    /// Wrap a backend failure, keeping it as the error source
    pub fn backend(backend: impl Into<String>, source: impl Into<BoxError>) -> Self {
        StorageError::Backend {
            backend: backend.into(),
            source: source.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::Backend { .. } => "STORAGE_ERROR",
            StorageError::Unavailable { .. } => "STORAGE_UNAVAILABLE",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration loading
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file
    #[error("Failed to read config file '{file}': {message}")]
    Io { file: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse config{}: {message}", .file.as_ref().map(|f| format!(" '{}'", f)).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Configuration parsed but is not usable
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Result type alias using ApiError
pub type ApiResult<T> = std::result::Result<T, ApiError>;
