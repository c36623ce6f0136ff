//! HTTP handlers for case records. Pass-through persistence only.

use crate::{errors::AppError, handlers::AppState, models::case::Case};
use axum::{Json, extract::State};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateCaseReq {
    pub name: String,
}

/// GET `/cases` — all cases, newest first.
pub async fn list_cases(State(state): State<AppState>) -> Result<Json<Vec<Case>>, AppError> {
    let cases = state.metadata.list_cases().await?;
    Ok(Json(cases))
}

/// POST `/cases` — create a case.
pub async fn create_case(
    State(state): State<AppState>,
    Json(req): Json<CreateCaseReq>,
) -> Result<Json<Case>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }

    let case = state.metadata.create_case(&req.name).await?;
    Ok(Json(case))
}
