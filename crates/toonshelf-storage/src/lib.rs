//! Toonshelf Storage Library
//!
//! This crate provides the storage collaborator used by the ingest pipeline:
//! the `Storage` trait plus S3 and local filesystem implementations.
//!
//! # Storage key format
//!
//! Keys are owner-scoped. All backends use the same layout:
//!
//! - **Archive panels**: `{owner_id}/{session_id}-panel-{index:03}-{source_name}`
//! - **Plain images**: `{owner_id}/{unix_millis}-{file_name}`
//!
//! Keys must not be empty, contain a `..` segment or start with `/`. Key
//! generation lives in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use toonshelf_core::StorageBackend;
pub use traits::{Storage, StorageError, StorageResult, UploadOptions};
