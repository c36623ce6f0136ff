//! Represents a finished upload recorded against a document.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Metadata row for an object that finished uploading.
///
/// Created exactly once, at upload completion, and immutable afterwards.
/// The only deletion path is the cascade from its owning document.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// Row id (SQLite autoincrement).
    pub id: i64,

    /// Object key as stored in the bucket (post collision resolution).
    pub name: String,

    /// Owning document.
    pub document_id: i64,

    /// Canonical `bucket/key` location of the object.
    pub path: String,
}
