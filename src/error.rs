//! Pipeline error types with HTTP status code mapping.
//!
//! [`EtlError`] is the runtime error type shared by both functions. Every
//! variant is terminal for the current invocation; the entry points log it
//! and render it as a structured failure body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Failure response body shared by both functions.
///
/// ```json
/// { "success": false, "error": "Invalid request format" }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Human-readable error message.
    pub error: String,
}

/// Runtime error enum with HTTP status code mapping.
///
/// Only [`EtlError::InvalidRequestFormat`] is a client error; everything
/// else is a server or dependency failure and maps to 500.
#[derive(Debug, thiserror::Error)]
pub enum EtlError {
    /// The remote source could not be reached, answered non-2xx, or sent
    /// a body that is not JSON.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// Writing an object to the bucket failed.
    #[error("failed to write gs://{bucket}/{name}: {reason}")]
    StorageWrite {
        /// Target bucket.
        bucket: String,
        /// Target object name.
        name: String,
        /// Underlying failure.
        reason: String,
    },

    /// The loader request is not a POSTed JSON push envelope.
    #[error("Invalid request format")]
    InvalidRequestFormat,

    /// The envelope's `message.data` could not be decoded into a storage
    /// event carrying `bucket` and `name`.
    #[error("malformed notification: {0}")]
    MalformedNotification(String),

    /// The referenced object does not exist.
    #[error("object not found: gs://{bucket}/{name}")]
    ObjectNotFound {
        /// Source bucket.
        bucket: String,
        /// Missing object name.
        name: String,
    },

    /// Reading an existing object failed.
    #[error("failed to download gs://{bucket}/{name}: {reason}")]
    Download {
        /// Source bucket.
        bucket: String,
        /// Object name.
        name: String,
        /// Underlying failure.
        reason: String,
    },

    /// Downloaded content is not valid JSON.
    #[error("failed to parse payload: {0}")]
    PayloadParse(#[from] serde_json::Error),

    /// The warehouse rejected the request or reported per-row errors.
    #[error("failed to insert rows into {table}: {detail}")]
    Insert {
        /// Fully qualified table reference.
        table: String,
        /// Complete error detail as reported by the warehouse.
        detail: String,
    },

    /// No access token could be obtained for the cloud APIs.
    #[error("authentication failed: {0}")]
    Auth(String),
}

impl EtlError {
    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestFormat => StatusCode::BAD_REQUEST,
            Self::SourceUnavailable(_)
            | Self::StorageWrite { .. }
            | Self::MalformedNotification(_)
            | Self::ObjectNotFound { .. }
            | Self::Download { .. }
            | Self::PayloadParse(_)
            | Self::Insert { .. }
            | Self::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short, stable name of the variant for log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SourceUnavailable(_) => "source_unavailable",
            Self::StorageWrite { .. } => "storage_write",
            Self::InvalidRequestFormat => "invalid_request_format",
            Self::MalformedNotification(_) => "malformed_notification",
            Self::ObjectNotFound { .. } => "object_not_found",
            Self::Download { .. } => "download",
            Self::PayloadParse(_) => "payload_parse",
            Self::Insert { .. } => "insert",
            Self::Auth(_) => "auth",
        }
    }
}

impl IntoResponse for EtlError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
        };
        (status, axum::Json(body)).into_response()
    }
}

/// Startup-only configuration failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable required by the selected target/backend is not set.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set to a value outside its accepted set.
    #[error("invalid value {value:?} for {key}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },
}
