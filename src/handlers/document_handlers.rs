//! HTTP handlers for document records.
//!
//! The detail endpoint is the read side of the upload pipeline: it joins
//! the document's files with resolved content types and freshly signed
//! links.

use crate::{
    errors::AppError,
    handlers::AppState,
    models::document::Document,
    util::content_type_for,
};
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentReq {
    pub name: String,
    pub case_id: i64,
    pub posting_date: Option<DateTime<Utc>>,
}

/// One file in a document detail response, with a temporary read link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileWithLink {
    pub name: String,
    pub content_type: &'static str,
    pub file_link: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub document: Document,
    pub files: Vec<FileWithLink>,
}

/// GET `/documents` — all documents, newest first.
pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, AppError> {
    let documents = state.metadata.list_documents().await?;
    Ok(Json(documents))
}

/// POST `/documents` — create a document under an existing case.
pub async fn create_document(
    State(state): State<AppState>,
    Json(req): Json<CreateDocumentReq>,
) -> Result<Json<Document>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }

    let document = state
        .metadata
        .create_document(&req.name, req.case_id, req.posting_date)
        .await?;
    Ok(Json(document))
}

/// GET `/documents/{id}` — a document plus its files, each enriched with a
/// resolved content type and a signed link (1-hour expiry).
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DocumentDetail>, AppError> {
    let document = state.metadata.get_document(id).await?;
    let files = state.metadata.files_for_document(id).await?;

    let bucket = state.uploads.bucket();
    let mut enriched = Vec::with_capacity(files.len());
    for file in files {
        let content_type = content_type_for(&file.name);
        let file_link = state.store.file_link(bucket, &file.name, content_type).await?;
        enriched.push(FileWithLink {
            name: file.name,
            content_type,
            file_link,
        });
    }

    Ok(Json(DocumentDetail {
        document,
        files: enriched,
    }))
}
