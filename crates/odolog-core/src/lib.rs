//! Odolog Core Library
//!
//! This crate provides the domain models, error types, configuration, and the
//! odometer extraction heuristic shared across all Odolog components.

pub mod config;
pub mod error;
pub mod models;
pub mod odometer;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use odometer::{extract_odometer, OdometerReading};
pub use storage_types::StorageBackend;
