//! Ephemeral multipart-upload value objects.
//!
//! Nothing here is persisted. The session descriptor is handed to the
//! client at start and presented back on every subsequent call; the server
//! holds no per-upload state of its own (the opaque `upload_id` issued by
//! the object store is the whole session).

use serde::{Deserialize, Serialize};

/// Descriptor returned when a multipart upload is opened.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadSession {
    /// Opaque token issued by the object store.
    pub upload_id: String,

    /// Key the store opened the session under.
    pub key: String,

    /// Bucket the object will land in.
    pub bucket: String,

    /// Name the caller asked for.
    pub original_name: String,

    /// Key after collision resolution; equals `original_name` when the
    /// requested name was free.
    pub final_name: String,
}

/// One uploaded chunk, acknowledged by the store.
///
/// Part numbers are caller-assigned, 1-based, and need not arrive in
/// order; re-uploading a `(upload_id, part_number)` pair overwrites the
/// earlier attempt at the store.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Integrity token returned by the store for this part.
    pub e_tag: String,

    /// 1-based part number.
    pub part_number: i32,
}
