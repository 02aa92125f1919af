//! In-process storage backend for tests and local development.
//!
//! `put_object` stands in for the direct client upload that S3 would receive,
//! including the metadata headers the scoped credential pins.

use crate::traits::{ObjectMetadata, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use odolog_core::models::ExpectedUpload;
use odolog_core::StorageBackend;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

struct StoredObject {
    data: Vec<u8>,
    metadata: ObjectMetadata,
}

/// Memory storage implementation
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, StoredObject>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    /// Store an object as if a client had uploaded it with the given metadata.
    pub async fn put_object(&self, storage_key: &str, data: Vec<u8>, metadata: ObjectMetadata) {
        self.objects
            .lock()
            .await
            .insert(storage_key.to_string(), StoredObject { data, metadata });
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn scoped_put_url(
        &self,
        storage_key: &str,
        _expected: &ExpectedUpload,
        expires_in: Duration,
    ) -> StorageResult<String> {
        Ok(format!(
            "memory://{}?expires={}",
            storage_key,
            expires_in.as_secs()
        ))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().await.contains_key(storage_key))
    }

    async fn object_metadata(&self, storage_key: &str) -> StorageResult<ObjectMetadata> {
        self.objects
            .lock()
            .await
            .get(storage_key)
            .map(|o| o.metadata.clone())
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .lock()
            .await
            .get(storage_key)
            .map(|o| o.data.clone())
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip_with_metadata() {
        let storage = MemoryStorage::new();
        let metadata = ObjectMetadata {
            content_type: Some("image/jpeg".to_string()),
            image_sha256: Some("a".repeat(64)),
            lat: Some(1.0),
            lng: None,
            taken_at: None,
        };
        storage
            .put_object("submissions/open/x/original.jpg", vec![1, 2, 3], metadata.clone())
            .await;

        assert!(storage.exists("submissions/open/x/original.jpg").await.unwrap());
        assert_eq!(
            storage.object_metadata("submissions/open/x/original.jpg").await.unwrap(),
            metadata
        );
        assert_eq!(
            storage.download("submissions/open/x/original.jpg").await.unwrap(),
            vec![1, 2, 3]
        );
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let storage = MemoryStorage::new();
        assert!(!storage.exists("nope").await.unwrap());
        assert!(matches!(
            storage.object_metadata("nope").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
