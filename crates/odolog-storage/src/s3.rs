use crate::sign::{presign_put, SigningContext};
use crate::traits::{
    ObjectMetadata, Storage, StorageError, StorageResult, META_IMAGE_SHA256, META_LAT, META_LNG,
    META_TAKEN_AT,
};
use async_trait::async_trait;
use chrono::Utc;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{Attribute, GetOptions, ObjectStore, ObjectStoreExt, Result as ObjectResult};
use odolog_core::models::ExpectedUpload;
use odolog_core::StorageBackend;
use std::env;
use std::time::Duration;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    signing: SigningContext,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    ///
    /// Credentials come from the standard AWS environment variables; presigning
    /// needs them directly, so missing credentials fail here rather than on the
    /// first request.
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let access_key = env::var("AWS_ACCESS_KEY_ID")
            .map_err(|_| StorageError::ConfigError("AWS_ACCESS_KEY_ID not set".to_string()))?;
        let secret_key = env::var("AWS_SECRET_ACCESS_KEY")
            .map_err(|_| StorageError::ConfigError("AWS_SECRET_ACCESS_KEY not set".to_string()))?;
        let session_token = env::var("AWS_SESSION_TOKEN").ok();

        let signing = SigningContext {
            access_key,
            secret_key,
            session_token,
            region,
            bucket: bucket.clone(),
            endpoint_url,
        };

        Ok(S3Storage {
            store,
            signing,
            bucket,
        })
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn scoped_put_url(
        &self,
        storage_key: &str,
        expected: &ExpectedUpload,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let url = presign_put(&self.signing, storage_key, expected, expires_in, Utc::now());

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            expires_secs = expires_in.as_secs(),
            "issued scoped PUT credential"
        );

        Ok(url)
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let location = Path::from(storage_key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn object_metadata(&self, storage_key: &str) -> StorageResult<ObjectMetadata> {
        let location = Path::from(storage_key.to_string());
        let options = GetOptions {
            head: true,
            ..Default::default()
        };

        let result: ObjectResult<_> = self.store.get_opts(&location, options).await;
        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(storage_key.to_string()),
            other => StorageError::BackendError(other.to_string()),
        })?;

        let mut metadata = ObjectMetadata::default();
        for (attribute, value) in result.attributes.iter() {
            match attribute {
                Attribute::ContentType => metadata.content_type = Some(value.to_string()),
                Attribute::Metadata(key) => match key.as_ref() {
                    META_IMAGE_SHA256 => metadata.image_sha256 = Some(value.to_string()),
                    META_LAT => metadata.lat = value.parse().ok(),
                    META_LNG => metadata.lng = value.parse().ok(),
                    META_TAKEN_AT => metadata.taken_at = Some(value.to_string()),
                    _ => {}
                },
                _ => {}
            }
        }

        Ok(metadata)
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let start = std::time::Instant::now();
        let location = Path::from(storage_key.to_string());

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(storage_key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(bytes.to_vec())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
