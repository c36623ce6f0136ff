//! Represents a legal case — the top-level container for documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A case groups related documents.
///
/// Cases are simple pass-through records; the upload pipeline never touches
/// them directly, but every uploaded file ultimately hangs off a case
/// through its document.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    /// Row id (SQLite autoincrement).
    pub id: i64,

    /// Human-readable case name.
    pub name: String,

    /// When this case was created.
    pub created_at: DateTime<Utc>,
}
