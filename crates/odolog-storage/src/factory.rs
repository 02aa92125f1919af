//! Storage factory

use crate::memory::MemoryStorage;
use crate::s3::S3Storage;
use crate::traits::{Storage, StorageError, StorageResult};
use odolog_core::{Config, StorageBackend};
use std::sync::Arc;

/// Create the storage backend named by the configuration.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend() {
        StorageBackend::S3 => {
            let bucket = config.s3_bucket().ok_or_else(|| {
                StorageError::ConfigError("S3_BUCKET is required when STORAGE_BACKEND=s3".into())
            })?;
            let region = config.s3_region().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION is required when STORAGE_BACKEND=s3".into())
            })?;
            let storage = S3Storage::new(
                bucket.to_string(),
                region.to_string(),
                config.s3_endpoint().map(str::to_string),
            )
            .await?;
            Ok(Arc::new(storage))
        }
        StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new())),
    }
}
