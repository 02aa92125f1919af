use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

static SHA256_HEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{64}$").expect("valid sha-256 hex regex"));

/// Request to open an upload session for one submission
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubmissionSessionRequest {
    /// Content type (MIME type) the upload will carry
    #[validate(length(
        min = 1,
        max = 255,
        message = "Content type must be between 1 and 255 characters"
    ))]
    pub content_type: String,
    /// Declared file size in bytes
    #[validate(range(
        min = 1,
        max = 104_857_600,
        message = "Size must be between 1 byte and 100 MiB"
    ))]
    pub size_bytes: u64,
    /// SHA-256 of the image the client intends to upload, lowercase hex
    #[validate(regex(
        path = *SHA256_HEX_RE,
        message = "imageHash must be 64 lowercase hex characters"
    ))]
    pub image_hash: String,
    /// Capture latitude, degrees
    #[validate(range(min = -90.0, max = 90.0, message = "lat must be in [-90, 90]"))]
    pub lat: Option<f64>,
    /// Capture longitude, degrees
    #[validate(range(min = -180.0, max = 180.0, message = "lng must be in [-180, 180]"))]
    pub lng: Option<f64>,
    /// Capture time reported by the client
    pub taken_at: Option<DateTime<Utc>>,
}

/// Response containing the scoped upload credential and completion token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubmissionSessionResponse {
    /// Session id, equal to the id of the submission a successful completion creates
    pub submission_id: Uuid,
    /// Signed PUT URL, valid only for the declared path, content type and metadata
    pub upload_url: String,
    /// Single-use token required to complete the session
    pub nonce: Uuid,
    /// Credential expiry
    pub expires_at: DateTime<Utc>,
    /// Object-store key the upload must land on
    pub bucket_path: String,
}

/// Request to verify and commit an uploaded submission
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSubmissionRequest {
    /// Session id from the create response
    pub submission_id: Uuid,
    /// Completion token from the create response
    pub nonce: Uuid,
}

/// Response after a successful commit
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompleteSubmissionResponse {
    /// Always "ok"; the committed record is not echoed back
    pub status: String,
}

impl CompleteSubmissionResponse {
    pub fn ok() -> Self {
        CompleteSubmissionResponse {
            status: "ok".to_string(),
        }
    }
}
