//! Toonshelf Core Library
//!
//! This crate provides the domain types, error metadata and configuration
//! shared by the storage, ingest and CLI crates.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, UploadConfig};
pub use error::{ErrorMetadata, LogLevel};
pub use models::ImageKind;
pub use storage_types::StorageBackend;
