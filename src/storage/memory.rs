//! In-process object store.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use super::ObjectStore;
use crate::error::EtlError;

/// A stored object and the content type it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Raw content.
    pub content: Bytes,
    /// Content type given at write time.
    pub content_type: String,
}

/// Object store backed by a map keyed by `(bucket, name)`.
///
/// Writes replace existing objects, like a bucket without versioning.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<(String, String), StoredObject>>,
}

impl MemoryObjectStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a stored object with its metadata.
    pub async fn get(&self, bucket: &str, name: &str) -> Option<StoredObject> {
        let objects = self.objects.read().await;
        objects
            .get(&(bucket.to_string(), name.to_string()))
            .cloned()
    }

    /// Names of every object in `bucket`, sorted.
    pub async fn list(&self, bucket: &str) -> Vec<String> {
        let objects = self.objects.read().await;
        let mut names: Vec<String> = objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, n)| n.clone())
            .collect();
        names.sort();
        names
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn write(
        &self,
        bucket: &str,
        name: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<(), EtlError> {
        let mut objects = self.objects.write().await;
        objects.insert(
            (bucket.to_string(), name.to_string()),
            StoredObject {
                content,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn read(&self, bucket: &str, name: &str) -> Result<Bytes, EtlError> {
        self.get(bucket, name)
            .await
            .map(|object| object.content)
            .ok_or_else(|| EtlError::ObjectNotFound {
                bucket: bucket.to_string(),
                name: name.to_string(),
            })
    }
}
