//! Object storage for uploaded documents.
//!
//! [`ObjectStore`] is the seam the API talks to. [`S3ObjectStore`] targets
//! any S3-compatible service (MinIO in development); [`MemoryObjectStore`]
//! keeps objects in process for tests.

use std::time::Duration;

use async_trait::async_trait;

pub mod error;
pub mod memory;
pub mod s3;

pub use error::StorageError;
pub use memory::MemoryObjectStore;
pub use s3::{S3ObjectStore, S3Settings};

/// Minimal object-store interface used by the document endpoints.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create the bucket if it does not exist yet.
    async fn ensure_bucket(&self) -> Result<(), StorageError>;

    /// Store `data` under `key`, replacing any existing object.
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    /// A time-limited URL a browser can use to fetch `key` directly.
    async fn presigned_get(&self, key: &str, expires_in: Duration)
        -> Result<String, StorageError>;

    /// Remove `key`. Deleting a missing object is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
