//! Represents a document belonging to a case; documents own files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A document within a case.
///
/// Files reference documents by foreign key; deleting a document cascades
/// to its files (enforced at the schema level).
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Row id (SQLite autoincrement).
    pub id: i64,

    /// Document title.
    pub name: String,

    /// Owning case.
    pub case_id: i64,

    /// Business date the document was posted, if known.
    pub posting_date: Option<DateTime<Utc>>,

    /// When this record was created.
    pub created_at: DateTime<Utc>,
}
