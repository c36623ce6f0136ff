//! HTTP handlers for the three-phase upload protocol.
//!
//! Thin controllers: request decoding and validation live here, every
//! decision about buckets, naming, and ordering lives in the services.

use crate::{
    errors::AppError,
    handlers::AppState,
    models::{
        file::File,
        upload::{Part, UploadSession},
    },
};
use axum::{
    Json,
    extract::{Multipart, State},
};
use bytes::Bytes;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct StartUploadReq {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteUploadReq {
    pub object_name: String,
    pub upload_id: String,
    pub parts: Vec<Part>,
    pub document_id: i64,
}

/// POST `/files/start-upload` — open a multipart session.
///
/// The returned descriptor is the entire session; the caller presents
/// `uploadId` and the final key on every subsequent call.
pub async fn start_upload(
    State(state): State<AppState>,
    Json(req): Json<StartUploadReq>,
) -> Result<Json<UploadSession>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }

    let session = state.uploads.start_upload(&req.name).await?;
    Ok(Json(session))
}

/// POST `/files/upload` — one chunk as a multipart form.
///
/// Expects a `file` part plus `objectName`, `uploadId`, `partNumber`
/// fields. Chunks may arrive in any order.
pub async fn upload_chunk(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Part>, AppError> {
    let mut object_name: Option<String> = None;
    let mut upload_id: Option<String> = None;
    let mut part_number: Option<i32> = None;
    let mut body: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("malformed multipart body: {err}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                body = Some(field.bytes().await.map_err(|err| {
                    AppError::bad_request(format!("could not read file chunk: {err}"))
                })?);
            }
            Some("objectName") => object_name = Some(read_text(field).await?),
            Some("uploadId") => upload_id = Some(read_text(field).await?),
            Some("partNumber") => {
                let raw = read_text(field).await?;
                let parsed = raw
                    .parse::<i32>()
                    .map_err(|_| AppError::bad_request("partNumber must be an integer"))?;
                part_number = Some(parsed);
            }
            _ => {} // unknown fields are ignored
        }
    }

    let object_name = object_name.ok_or_else(|| AppError::bad_request("objectName is required"))?;
    let upload_id = upload_id.ok_or_else(|| AppError::bad_request("uploadId is required"))?;
    let part_number = part_number.ok_or_else(|| AppError::bad_request("partNumber is required"))?;
    let body = body.ok_or_else(|| AppError::bad_request("file chunk is required"))?;
    if part_number < 1 {
        return Err(AppError::bad_request("partNumber must be positive"));
    }

    let bucket = state.uploads.bucket().to_string();
    let part = state
        .uploads
        .upload_chunk(&bucket, &object_name, &upload_id, part_number, body)
        .await?;
    Ok(Json(part))
}

/// POST `/files/complete-upload` — assemble the parts and record the File.
pub async fn complete_upload(
    State(state): State<AppState>,
    Json(req): Json<CompleteUploadReq>,
) -> Result<Json<File>, AppError> {
    if req.parts.is_empty() {
        return Err(AppError::bad_request("parts must not be empty"));
    }

    let bucket = state.uploads.bucket().to_string();
    let file = state
        .uploads
        .complete_upload(
            &bucket,
            &req.object_name,
            &req.upload_id,
            req.parts,
            req.document_id,
        )
        .await?;
    Ok(Json(file))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|err| AppError::bad_request(format!("malformed multipart field: {err}")))
}
