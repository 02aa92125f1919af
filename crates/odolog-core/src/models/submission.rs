//! Committed submission record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// GPS coordinates attached to a submission. Either axis may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Output of the extraction heuristic as stored on the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrReading {
    /// Raw OCR text, truncated to the configured cap.
    pub raw_text: String,
    /// Best-guess odometer value, if any candidate qualified.
    pub value: Option<u32>,
    pub confidence: f64,
}

/// One immutable odometer submission.
///
/// Written exactly once by the commit transaction; never updated afterwards.
/// `id` equals the session id that produced it, which is what makes the
/// commit idempotence check a plain primary-key conflict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    /// Verified identity of the submitter.
    pub uid: String,
    pub bucket_path: String,
    /// Hash recorded by the object store at upload time.
    pub image_sha256: String,
    pub gps: GpsPoint,
    pub taken_at: Option<DateTime<Utc>>,
    pub ocr: OcrReading,
    /// Server-side commit time, authoritative over any client clock.
    pub server_timestamp: DateTime<Utc>,
}
