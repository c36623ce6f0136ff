//! HTTP handlers and the shared application state they operate on.

use crate::services::{
    metadata_service::MetadataService, object_store::ObjectStore, upload_service::UploadService,
};
use std::sync::Arc;

pub mod case_handlers;
pub mod document_handlers;
pub mod file_handlers;
pub mod health_handlers;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub metadata: MetadataService,
    pub uploads: UploadService,
}
