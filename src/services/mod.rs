//! Service layer: object-store access, upload orchestration, and
//! relational metadata persistence.

pub mod metadata_service;
pub mod object_store;
pub mod s3_store;
pub mod upload_service;
