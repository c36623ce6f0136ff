use crate::services::{
    metadata_service::MetadataError, object_store::StoreError, upload_service::UploadError,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for general errors that keeps the message local.
///
/// Service failures are logged with their full cause chain and collapsed
/// into a generic caller-visible message; the underlying reason never
/// leaves the process.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 400 Bad Request (malformed or incomplete request body)
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = ?err, "object store operation failed");
        AppError::internal("operation failed")
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::DocumentNotFound(id) => {
                AppError::not_found(format!("document {id} not found"))
            }
            UploadError::StartFailed(_) => {
                tracing::error!(error = ?err, "start-upload failed");
                AppError::internal("failed to start upload")
            }
            UploadError::ChunkFailed(_) => {
                tracing::error!(error = ?err, "chunk upload failed");
                AppError::internal("failed to upload chunk")
            }
            UploadError::CompletionFailed(_) => {
                tracing::error!(error = ?err, "upload completion failed");
                AppError::internal("failed to complete upload")
            }
        }
    }
}

impl From<MetadataError> for AppError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::CaseNotFound(id) => AppError::not_found(format!("case {id} not found")),
            MetadataError::DocumentNotFound(id) => {
                AppError::not_found(format!("document {id} not found"))
            }
            MetadataError::Database(_) => {
                tracing::error!(error = ?err, "metadata operation failed");
                AppError::internal("operation failed")
            }
        }
    }
}
