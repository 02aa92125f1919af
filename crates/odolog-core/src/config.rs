//! Configuration module
//!
//! This module provides the environment-driven configuration for the
//! submission service: server, database, object storage, session protocol,
//! OCR, and identity verification settings.

use std::env;
use std::str::FromStr;

use crate::storage_types::StorageBackend;

// Common defaults
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const UPLOAD_URL_TTL_SECONDS: i64 = 120;
const COMPLETION_GRACE_SECONDS: i64 = 300;
const OCR_RAW_TEXT_MAX_CHARS: usize = 4000;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const MAX_BODY_BYTES: usize = 1024 * 1024;
const VISION_BASE_URL: &str = "https://vision.googleapis.com";

/// Base configuration shared across the service
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub request_timeout_secs: u64,
    pub max_body_bytes: usize,
}

/// Submission service configuration
#[derive(Clone, Debug)]
pub struct SubmissionServiceConfig {
    pub base: BaseConfig,
    // Database configuration
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers
    // Session protocol configuration
    pub upload_url_ttl_seconds: i64,
    pub completion_grace_seconds: i64,
    pub open_sessions_enabled: bool,
    // OCR configuration
    pub vision_api_key: Option<String>,
    pub vision_base_url: String,
    pub ocr_raw_text_max_chars: usize,
    // Identity verification
    pub identity_jwks_url: Option<String>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<SubmissionServiceConfig>);

impl Config {
    fn inner(&self) -> &SubmissionServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = SubmissionServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.inner().base.request_timeout_secs
    }

    pub fn max_body_bytes(&self) -> usize {
        self.inner().base.max_body_bytes
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().db_timeout_seconds
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn upload_url_ttl_seconds(&self) -> i64 {
        self.inner().upload_url_ttl_seconds
    }

    pub fn completion_grace_seconds(&self) -> i64 {
        self.inner().completion_grace_seconds
    }

    pub fn open_sessions_enabled(&self) -> bool {
        self.inner().open_sessions_enabled
    }

    pub fn vision_api_key(&self) -> Option<&str> {
        self.inner().vision_api_key.as_deref()
    }

    pub fn vision_base_url(&self) -> &str {
        &self.inner().vision_base_url
    }

    pub fn ocr_raw_text_max_chars(&self) -> usize {
        self.inner().ocr_raw_text_max_chars
    }

    pub fn identity_jwks_url(&self) -> Option<&str> {
        self.inner().identity_jwks_url.as_deref()
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn env_list(key: &str, default: &str) -> Vec<String> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl SubmissionServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let base = BaseConfig {
            server_port: env_or("SERVER_PORT", 8080),
            cors_origins: env_list("CORS_ORIGINS", "*"),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", REQUEST_TIMEOUT_SECS).max(1),
            max_body_bytes: env_or("MAX_BODY_BYTES", MAX_BODY_BYTES),
        };

        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "s3".to_string())
            .parse::<StorageBackend>()
            .map_err(|e| anyhow::anyhow!(e))?;

        Ok(SubmissionServiceConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable not set"))?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            storage_backend,
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION"),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            upload_url_ttl_seconds: env_or("UPLOAD_URL_TTL_SECONDS", UPLOAD_URL_TTL_SECONDS),
            completion_grace_seconds: env_or("COMPLETION_GRACE_SECONDS", COMPLETION_GRACE_SECONDS),
            open_sessions_enabled: env_or("OPEN_SESSIONS_ENABLED", true),
            vision_api_key: env_opt("GOOGLE_VISION_API_KEY"),
            vision_base_url: env::var("GOOGLE_VISION_BASE_URL")
                .unwrap_or_else(|_| VISION_BASE_URL.to_string()),
            ocr_raw_text_max_chars: env_or("OCR_RAW_TEXT_MAX_CHARS", OCR_RAW_TEXT_MAX_CHARS),
            identity_jwks_url: env_opt("IDENTITY_JWKS_URL"),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.storage_backend == StorageBackend::S3 {
            if self.s3_bucket.is_none() {
                anyhow::bail!("S3_BUCKET is required when STORAGE_BACKEND=s3");
            }
            if self.s3_region.is_none() {
                anyhow::bail!("S3_REGION is required when STORAGE_BACKEND=s3");
            }
        }
        if self.upload_url_ttl_seconds <= 0 {
            anyhow::bail!("UPLOAD_URL_TTL_SECONDS must be positive");
        }
        if self.completion_grace_seconds < 0 {
            anyhow::bail!("COMPLETION_GRACE_SECONDS must not be negative");
        }
        if self.identity_jwks_url.is_none() {
            anyhow::bail!("IDENTITY_JWKS_URL environment variable not set");
        }
        Ok(())
    }
}
