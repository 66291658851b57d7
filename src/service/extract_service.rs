//! Extract stage: fetch from the source, store as a timestamped object.

use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;

use crate::domain::{ObjectName, ObjectRef};
use crate::error::EtlError;
use crate::source::HttpSource;
use crate::storage::{JSON_CONTENT_TYPE, ObjectStore};

/// Result of one successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOutcome {
    /// Where the payload was written.
    pub object: ObjectRef,
}

/// Orchestrates `fetch` then `store`.
#[derive(Debug, Clone)]
pub struct ExtractService {
    source: HttpSource,
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ExtractService {
    /// Creates the service writing into `bucket`.
    #[must_use]
    pub fn new(source: HttpSource, store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            source,
            store,
            bucket: bucket.into(),
        }
    }

    /// Target bucket.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Fetches the current payload from the source.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::SourceUnavailable`] on any fetch failure.
    pub async fn fetch(&self) -> Result<Value, EtlError> {
        self.source.fetch().await
    }

    /// Writes `payload` under a name derived from the current time.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::StorageWrite`] if the write fails.
    pub async fn store(&self, payload: &Value) -> Result<ObjectName, EtlError> {
        let name = ObjectName::now();
        self.store_as(payload, &name).await?;
        Ok(name)
    }

    /// Writes `payload` as JSON text under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::StorageWrite`] if the write fails.
    pub async fn store_as(&self, payload: &Value, name: &ObjectName) -> Result<(), EtlError> {
        let object = ObjectRef::new(self.bucket.as_str(), name.as_str());
        tracing::info!(%object, "uploading data");

        let content = Bytes::from(payload.to_string());
        self.store
            .write(&self.bucket, name.as_str(), content, JSON_CONTENT_TYPE)
            .await?;

        tracing::info!(%object, "data uploaded");
        Ok(())
    }

    /// Runs the whole stage.
    ///
    /// # Errors
    ///
    /// Propagates the first failure of [`Self::fetch`] or [`Self::store`].
    pub async fn extract(&self) -> Result<ExtractOutcome, EtlError> {
        let payload = self.fetch().await?;
        let name = self.store(&payload).await?;
        Ok(ExtractOutcome {
            object: ObjectRef::new(self.bucket.as_str(), name),
        })
    }
}
