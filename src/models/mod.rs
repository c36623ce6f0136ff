//! Core data models for the case-file upload service.
//!
//! Persisted entities (`Case`, `Document`, `File`) map to SQLite tables via
//! `sqlx::FromRow`; the upload types are ephemeral value objects that only
//! travel over the wire.

pub mod case;
pub mod document;
pub mod file;
pub mod upload;
