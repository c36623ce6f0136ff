//! aws-sdk-s3 backend for the [`ObjectStore`] trait.
//!
//! Works against any S3-compatible endpoint (MinIO, R2, AWS) using
//! path-style addressing and static credentials. A second client bound to
//! the public endpoint signs download links, so issued URLs stay valid
//! outside the deployment network.

use crate::config::AppConfig;
use crate::models::upload::Part;
use crate::services::object_store::{ObjectStore, StoreError, StoreResult};
use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{Builder, Credentials, Region},
    error::DisplayErrorContext,
    presigning::PresigningConfig,
    primitives::ByteStream,
    types::{CompletedMultipartUpload, CompletedPart},
};
use bytes::Bytes;
use std::time::Duration;

pub struct S3ObjectStore {
    client: Client,
    link_client: Client,
}

impl S3ObjectStore {
    pub fn new(cfg: &AppConfig) -> Self {
        let client = build_client(cfg, &cfg.store_endpoint);
        let link_endpoint = cfg
            .store_public_endpoint
            .as_deref()
            .unwrap_or(&cfg.store_endpoint);
        let link_client = build_client(cfg, link_endpoint);

        Self {
            client,
            link_client,
        }
    }
}

fn build_client(cfg: &AppConfig, endpoint: &str) -> Client {
    let credentials = Credentials::new(
        &cfg.store_access_key,
        &cfg.store_secret_key,
        None,
        None,
        "static",
    );

    let conf = Builder::new()
        .behavior_version_latest()
        .region(Region::new(cfg.store_region.clone()))
        .endpoint_url(endpoint)
        .force_path_style(true)
        .credentials_provider(credentials)
        .build();

    Client::from_conf(conf)
}

/// Collapse any SDK failure into [`StoreError::Unavailable`], keeping the
/// full error context for internal logs.
fn unavailable<E>(err: E) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
{
    StoreError::Unavailable(DisplayErrorContext(&err).to_string())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_buckets(&self) -> StoreResult<Vec<String>> {
        let out = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(unavailable)?;

        Ok(out
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name().map(str::to_string))
            .collect())
    }

    async fn create_bucket(&self, bucket: &str) -> StoreResult<()> {
        match self.client.create_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(()),
            Err(err) => {
                let service_err = err.into_service_error();
                // benign when a concurrent creator won the race
                if service_err.is_bucket_already_owned_by_you()
                    || service_err.is_bucket_already_exists()
                {
                    Ok(())
                } else {
                    Err(unavailable(service_err))
                }
            }
        }
    }

    async fn object_exists(&self, bucket: &str, key: &str) -> StoreResult<bool> {
        match self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(unavailable(service_err))
                }
            }
        }
    }

    async fn create_multipart_upload(&self, bucket: &str, key: &str) -> StoreResult<String> {
        let out = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(unavailable)?;

        out.upload_id()
            .map(str::to_string)
            .ok_or_else(|| StoreError::Unavailable("store returned no upload id".into()))
    }

    async fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: i32,
        body: Bytes,
    ) -> StoreResult<Part> {
        let out = self
            .client
            .upload_part()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(unavailable)?;

        Ok(Part {
            e_tag: out.e_tag().unwrap_or_default().to_string(),
            part_number,
        })
    }

    async fn assemble_multipart(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: Vec<Part>,
    ) -> StoreResult<()> {
        let completed: Vec<CompletedPart> = parts
            .into_iter()
            .map(|part| {
                CompletedPart::builder()
                    .part_number(part.part_number)
                    .e_tag(part.e_tag)
                    .build()
            })
            .collect();

        self.client
            .complete_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed))
                    .build(),
            )
            .send()
            .await
            .map_err(unavailable)?;

        tracing::info!(bucket, key, "multipart upload assembled");
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
    ) -> StoreResult<Option<String>> {
        let out = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(unavailable)?;

        Ok(out.e_tag().map(str::to_string))
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        expires_in_secs: u64,
    ) -> StoreResult<String> {
        let presigning = PresigningConfig::expires_in(Duration::from_secs(expires_in_secs))
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        let request = self
            .link_client
            .get_object()
            .bucket(bucket)
            .key(key)
            .response_content_disposition("inline")
            .response_content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(unavailable)?;

        Ok(request.uri().to_string())
    }
}
