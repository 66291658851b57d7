//! Object storage collaborator.
//!
//! [`ObjectStore`] is the seam between the pipeline and the bucket. The
//! Cloud Storage implementation talks to the JSON API; the in-memory one
//! backs local runs and tests.

pub mod gcs;
pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::EtlError;

pub use gcs::GcsObjectStore;
pub use memory::MemoryObjectStore;

/// Content type of every object the extractor writes.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Byte-level access to named objects in buckets.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    /// Creates or replaces `bucket/name` with `content`.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::StorageWrite`] on any write failure.
    async fn write(
        &self,
        bucket: &str,
        name: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<(), EtlError>;

    /// Reads the full content of `bucket/name`.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::ObjectNotFound`] if the object does not exist
    /// and [`EtlError::Download`] on any other read failure.
    async fn read(&self, bucket: &str, name: &str) -> Result<Bytes, EtlError>;
}
