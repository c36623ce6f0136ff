//! Defines routes for the upload pipeline and its metadata records.
//!
//! ## Structure
//! - **Upload endpoints**
//!   - `POST /files/start-upload`    — open a multipart session
//!   - `POST /files/upload`          — transmit one chunk (multipart form)
//!   - `POST /files/complete-upload` — assemble parts, record the File
//!
//! - **Metadata endpoints**
//!   - `GET/POST /cases`       — list / create cases
//!   - `GET/POST /documents`   — list / create documents
//!   - `GET /documents/{id}`   — document detail with signed file links

use crate::handlers::{
    AppState,
    case_handlers::{create_case, list_cases},
    document_handlers::{create_document, get_document, list_documents},
    file_handlers::{complete_upload, start_upload, upload_chunk},
    health_handlers::{healthz, readyz},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for all endpoints.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // upload pipeline
        .route("/files/start-upload", post(start_upload))
        .route("/files/upload", post(upload_chunk))
        .route("/files/complete-upload", post(complete_upload))
        // metadata records
        .route("/cases", get(list_cases).post(create_case))
        .route("/documents", get(list_documents).post(create_document))
        .route("/documents/{id}", get(get_document))
}
