//! Object-store capability surface.
//!
//! The trait splits into two layers: required wire primitives that map
//! one-to-one onto S3 commands, and provided policy methods built on top of
//! them — idempotent bucket provisioning, collision-safe object naming,
//! ascending part ordering before assembly, and fixed-expiry link issuance.
//! Backends only implement the primitives, so every policy is shared (and
//! testable) across S3-compatible stores.

use crate::models::upload::{Part, UploadSession};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Signed links expire after exactly one hour; no renewal, no revocation.
pub const LINK_TTL_SECS: u64 = 3600;

/// Existence probes spent on collision-free naming before falling back.
const UNIQUE_NAME_ATTEMPTS: usize = 10;

const FALLBACK_RAND_CEILING: u32 = 10_000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of a single-shot (non-chunked) object write.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PutOutcome {
    pub bucket: String,
    pub original_name: String,
    pub final_name: String,
    pub e_tag: Option<String>,
}

/// S3-compatible store, expressed as a capability set.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    // --- wire primitives, implemented per backend ---

    /// Names of all buckets visible to the credentials in use.
    async fn list_buckets(&self) -> StoreResult<Vec<String>>;

    /// Create a bucket. Duplicate creation must be treated as success;
    /// concurrent creators racing on the same name end up with the same
    /// bucket either way.
    async fn create_bucket(&self, bucket: &str) -> StoreResult<()>;

    /// Existence probe for a single key.
    async fn object_exists(&self, bucket: &str, key: &str) -> StoreResult<bool>;

    /// Open a multipart session; returns the store-issued upload id.
    async fn create_multipart_upload(&self, bucket: &str, key: &str) -> StoreResult<String>;

    /// Transmit one part under an open session. No local retry; the store
    /// keeps the latest upload for a given `(upload_id, part_number)`.
    async fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: i32,
        body: Bytes,
    ) -> StoreResult<Part>;

    /// Assemble parts into the final object. `parts` must already be in
    /// ascending part-number order; callers go through
    /// [`ObjectStore::complete_multipart`], which enforces that.
    async fn assemble_multipart(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: Vec<Part>,
    ) -> StoreResult<()>;

    /// Single-shot object write; returns the store's etag when present.
    async fn put_object(&self, bucket: &str, key: &str, body: Bytes)
    -> StoreResult<Option<String>>;

    /// Presign a GET for inline access with the declared content type.
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        expires_in_secs: u64,
    ) -> StoreResult<String>;

    // --- policies, shared across backends ---

    /// Create `bucket` if the listing does not already contain it.
    ///
    /// The list-then-create sequence has a benign race: a concurrent
    /// creator produces the same bucket, and `create_bucket` treats the
    /// duplicate as success.
    async fn ensure_bucket(&self, bucket: &str) -> StoreResult<()> {
        let buckets = self.list_buckets().await?;
        if buckets.iter().any(|name| name == bucket) {
            return Ok(());
        }
        self.create_bucket(bucket).await?;
        tracing::info!(bucket, "bucket created");
        Ok(())
    }

    /// Resolve a key that does not collide with an existing object.
    ///
    /// Probes the requested name first, then up to the attempt budget of
    /// random-suffix candidates. If every probe collides, returns a
    /// timestamp-plus-random fallback without a further existence check:
    /// bounded latency is worth the vanishing residual collision odds.
    async fn unique_object_name(&self, bucket: &str, requested: &str) -> StoreResult<String> {
        let mut candidate = requested.to_string();
        for _ in 0..UNIQUE_NAME_ATTEMPTS {
            if !self.object_exists(bucket, &candidate).await? {
                return Ok(candidate);
            }
            candidate = suffixed_name(requested, &Uuid::new_v4().to_string());
        }
        Ok(fallback_name(requested))
    }

    /// Ensure the bucket, resolve the final key, and open a multipart
    /// session. The returned descriptor is the entire session state; the
    /// caller presents it back on every subsequent call.
    async fn start_multipart(
        &self,
        bucket: &str,
        object_name: &str,
        prevent_overwrite: bool,
    ) -> StoreResult<UploadSession> {
        self.ensure_bucket(bucket).await?;

        let final_name = if prevent_overwrite {
            self.unique_object_name(bucket, object_name).await?
        } else {
            object_name.to_string()
        };

        let upload_id = self.create_multipart_upload(bucket, &final_name).await?;
        Ok(UploadSession {
            upload_id,
            key: final_name.clone(),
            bucket: bucket.to_string(),
            original_name: object_name.to_string(),
            final_name,
        })
    }

    /// Sort parts ascending by part number and hand them to the store for
    /// assembly. Gap and duplicate detection stays with the store's own
    /// completion validation.
    async fn complete_multipart(
        &self,
        bucket: &str,
        object_name: &str,
        upload_id: &str,
        parts: Vec<Part>,
    ) -> StoreResult<()> {
        self.assemble_multipart(bucket, object_name, upload_id, sort_parts(parts))
            .await
    }

    /// Non-chunked upload with the same bucket-ensure and naming policy as
    /// [`ObjectStore::start_multipart`].
    async fn upload_file(
        &self,
        bucket: &str,
        object_name: &str,
        body: Bytes,
        prevent_overwrite: bool,
    ) -> StoreResult<PutOutcome> {
        self.ensure_bucket(bucket).await?;

        let final_name = if prevent_overwrite {
            self.unique_object_name(bucket, object_name).await?
        } else {
            object_name.to_string()
        };

        let e_tag = self.put_object(bucket, &final_name, body).await?;
        tracing::info!(bucket, key = %final_name, "object uploaded");
        Ok(PutOutcome {
            bucket: bucket.to_string(),
            original_name: object_name.to_string(),
            final_name,
            e_tag,
        })
    }

    /// Time-limited inline read link for a finished object. Stateless; the
    /// expiry window is always [`LINK_TTL_SECS`].
    async fn file_link(
        &self,
        bucket: &str,
        file_name: &str,
        content_type: &str,
    ) -> StoreResult<String> {
        self.presign_get(bucket, file_name, content_type, LINK_TTL_SECS)
            .await
    }
}

/// Ascending part-number order, as the completion call requires.
pub(crate) fn sort_parts(mut parts: Vec<Part>) -> Vec<Part> {
    parts.sort_by_key(|part| part.part_number);
    parts
}

/// Split `name` into stem and extension (extension keeps its dot).
/// A lone leading dot is not an extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

/// Insert `suffix` between stem and extension: `report.pdf` -> `report_{suffix}.pdf`.
fn suffixed_name(original: &str, suffix: &str) -> String {
    let (stem, ext) = split_extension(original);
    format!("{stem}_{suffix}{ext}")
}

/// Last-resort candidate accepted without an existence probe.
fn fallback_name(original: &str) -> String {
    let n = rand::thread_rng().gen_range(0..FALLBACK_RAND_CEILING);
    suffixed_name(original, &format!("{}_{}", Utc::now().timestamp_millis(), n))
}
