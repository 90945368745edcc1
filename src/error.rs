//! Gateway error types and JSON error response formatting.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Gateway operations, used to label storage failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateContainer,
    ListBlobs,
    UploadBlob,
    DeleteBlob,
}

impl Operation {
    /// Returns the message reported to the caller when this operation fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::CreateContainer => "Error creating container",
            Operation::ListBlobs => "Error retrieving blobs",
            Operation::UploadBlob => "Error uploading file",
            Operation::DeleteBlob => "Error deleting blob",
        }
    }
}

/// Error raised by a storage backend. Carries the backend's message unmodified.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    /// Creates a new store error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<azure_core::Error> for StoreError {
    fn from(err: azure_core::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Error returned by request handlers.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A required request parameter was missing or malformed.
    #[error("{0}")]
    BadRequest(String),

    /// The multipart form could not be read, or exceeded the upload limit.
    #[error("{message}")]
    Form { status: StatusCode, message: String },

    /// The storage call failed.
    #[error("{}: {source}", .operation.failure_message())]
    Storage {
        operation: Operation,
        #[source]
        source: StoreError,
    },
}

impl GatewayError {
    /// Creates a client error with the given message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        GatewayError::BadRequest(message.into())
    }

    /// Wraps a store error raised while performing `operation`.
    pub fn storage(operation: Operation, source: impl Into<StoreError>) -> Self {
        GatewayError::Storage {
            operation,
            source: source.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Form { status, .. } => *status,
            GatewayError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MultipartError> for GatewayError {
    fn from(err: MultipartError) -> Self {
        let status = err.status();
        let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "File too large".to_string()
        } else {
            err.body_text()
        };
        GatewayError::Form { status, message }
    }
}

/// Error raised while staging an uploaded file part on local disk.
#[derive(Debug, Error)]
pub enum StageError {
    /// Reading the part from the request failed.
    #[error(transparent)]
    Form(#[from] MultipartError),

    /// Writing the staged file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<StageError> for GatewayError {
    fn from(err: StageError) -> Self {
        match err {
            StageError::Form(err) => err.into(),
            StageError::Io(err) => GatewayError::storage(Operation::UploadBlob, err),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            GatewayError::BadRequest(message) | GatewayError::Form { message, .. } => ErrorBody {
                message,
                error: None,
            },
            GatewayError::Storage { operation, source } => ErrorBody {
                message: operation.failure_message(),
                error: Some(source.to_string()),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for storage backend calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for request handlers.
pub type GatewayResult<T> = Result<T, GatewayError>;
