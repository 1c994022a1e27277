//! SkyMap Storage Library
//!
//! This crate provides the object store abstraction that uploaded sky photos are written to,
//! with implementations for S3 (and S3-compatible providers) and the local filesystem.
//!
//! # Storage key format
//!
//! Every upload lands under a single prefix: `sky-images/{millis}-{filename}`, where
//! `millis` is the upload time in milliseconds since the Unix epoch. The filename is used
//! verbatim; backends reject empty keys, keys with a leading `/`, and keys with a `..` segment.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{generate_storage_key, is_valid_key};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use skymap_core::StorageBackend;
pub use traits::{Storage, StorageError, StorageResult};
