//! Odolog Storage Library
//!
//! This crate provides the object storage abstraction for odometer
//! submissions: the Storage trait, an S3 implementation, an in-memory
//! implementation for tests, and the SigV4 presigner that issues scoped
//! upload credentials.
//!
//! # Storage key format
//!
//! Uploads land at `submissions/open/{session_id}/original.jpg`. The path is
//! derived from the session id alone so it carries no owner dependency; see
//! `odolog_core::models::bucket_path_for`.

pub mod factory;
pub mod memory;
pub mod s3;
pub mod sign;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use memory::MemoryStorage;
pub use odolog_core::StorageBackend;
pub use s3::S3Storage;
pub use traits::{ObjectMetadata, Storage, StorageError, StorageResult};
