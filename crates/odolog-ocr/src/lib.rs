//! Odolog OCR Library
//!
//! Text extraction from submission photos. The `TextExtractor` trait keeps
//! the HTTP layer independent of the provider; the only production
//! implementation talks to the Google Cloud Vision API.

pub mod google_vision;

use async_trait::async_trait;
use thiserror::Error;

pub use google_vision::GoogleVisionOcr;

/// OCR operation errors
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR request failed: {0}")]
    Request(String),

    #[error("OCR provider error: {0}")]
    Provider(String),

    #[error("OCR response malformed: {0}")]
    Malformed(String),
}

/// Raw text extraction from image bytes.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract all text the provider can read from the image.
    ///
    /// Returns an empty string when the image contains no readable text;
    /// that is a normal outcome, not an error.
    async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError>;
}
