//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use odolog_core::models::ExpectedUpload;
use odolog_core::StorageBackend;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

// Custom metadata keys pinned into the upload credential and read back
// from the stored object. S3 carries them as `x-amz-meta-{key}` headers.
pub const META_IMAGE_SHA256: &str = "image-sha256";
pub const META_LAT: &str = "lat";
pub const META_LNG: &str = "lng";
pub const META_TAKEN_AT: &str = "taken-at";

/// Metadata the object store recorded for an uploaded object.
///
/// This is what the upload actually carried, as opposed to what the client
/// declared when the session was opened. Coordinates that fail to parse as
/// floats are treated as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectMetadata {
    pub content_type: Option<String>,
    pub image_sha256: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Raw capture-time string as uploaded; parsed leniently downstream.
    pub taken_at: Option<String>,
}

/// Storage abstraction trait
///
/// All storage backends (S3, in-memory) must implement this trait. The
/// completion verifier works against it without coupling to a provider.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Build a scoped PUT credential for `storage_key`.
    ///
    /// The returned URL is only valid for a PUT of the declared content type
    /// carrying the declared metadata headers; changing any of them breaks
    /// the signature. Expires after `expires_in`.
    async fn scoped_put_url(
        &self,
        storage_key: &str,
        expected: &ExpectedUpload,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Check if an object exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Read the metadata the store recorded for an object
    async fn object_metadata(&self, storage_key: &str) -> StorageResult<ObjectMetadata>;

    /// Download an object by its storage key
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
