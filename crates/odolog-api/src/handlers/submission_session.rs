//! Session open and completion handlers.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Duration, Utc};
use odolog_core::models::{
    CompleteSubmissionRequest, CompleteSubmissionResponse, CreateSubmissionSessionRequest,
    CreateSubmissionSessionResponse, ExpectedUpload, GpsPoint, OcrReading, Submission,
    UploadSession,
};
use odolog_core::{extract_odometer, AppError};
use validator::Validate;

use crate::auth::middleware::AuthedUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::verify::verify_completion;

/// Open an upload session.
///
/// Stages a session, signs a scoped PUT credential for it, and returns both
/// together with the single-use completion nonce. Nothing here touches the
/// object store beyond producing the signature.
#[utoipa::path(
    post,
    path = "/createSubmissionSession",
    tag = "submissions",
    request_body = CreateSubmissionSessionRequest,
    responses(
        (status = 200, description = "Session opened", body = CreateSubmissionSessionResponse),
        (status = 400, description = "Invalid declaration", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(size_bytes = request.size_bytes))]
pub async fn create_submission_session(
    State(state): State<Arc<AppState>>,
    identity: Option<Extension<AuthedUser>>,
    ValidatedJson(request): ValidatedJson<CreateSubmissionSessionRequest>,
) -> Result<Json<CreateSubmissionSessionResponse>, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let owner_uid = identity.map(|Extension(AuthedUser(uid))| uid);
    if owner_uid.is_none() && !state.config.open_sessions_enabled() {
        return Err(AppError::Unauthorized(
            "Authentication is required to open a session".to_string(),
        )
        .into());
    }

    let expected = ExpectedUpload {
        content_type: request.content_type,
        size_bytes: request.size_bytes as i64,
        image_sha256: request.image_hash,
        lat: request.lat,
        lng: request.lng,
        taken_at: request.taken_at,
    };

    let ttl_seconds = state.config.upload_url_ttl_seconds();
    let session = UploadSession::stage(owner_uid, expected, Duration::seconds(ttl_seconds));

    let upload_url = state
        .storage
        .scoped_put_url(
            &session.bucket_path,
            &session.expected,
            StdDuration::from_secs(ttl_seconds as u64),
        )
        .await
        .map_err(HttpAppError::from)?;

    state.sessions.create_session(&session).await?;

    tracing::info!(
        session_id = %session.id,
        owned = session.owner_uid.is_some(),
        "opened upload session"
    );

    Ok(Json(CreateSubmissionSessionResponse {
        submission_id: session.id,
        upload_url,
        nonce: session.nonce,
        expires_at: session.expires_at,
        bucket_path: session.bucket_path,
    }))
}

/// Verify an uploaded photo and commit the submission record.
///
/// Runs the ordered completion checks, extracts the odometer reading from the
/// uploaded image, and commits the record atomically. The session is consumed
/// exactly once; losing a concurrent race surfaces as a conflict.
#[utoipa::path(
    post,
    path = "/completeSubmission",
    tag = "submissions",
    request_body = CompleteSubmissionRequest,
    responses(
        (status = 200, description = "Submission committed", body = CompleteSubmissionResponse),
        (status = 400, description = "Nonce or upload integrity check failed", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Session owned by another identity", body = ErrorResponse),
        (status = 404, description = "Session or upload not found", body = ErrorResponse),
        (status = 409, description = "Session already completed", body = ErrorResponse),
        (status = 410, description = "Session expired", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(session_id = %request.submission_id))]
pub async fn complete_submission(
    State(state): State<Arc<AppState>>,
    Extension(AuthedUser(uid)): Extension<AuthedUser>,
    ValidatedJson(request): ValidatedJson<CompleteSubmissionRequest>,
) -> Result<Json<CompleteSubmissionResponse>, HttpAppError> {
    let grace = Duration::seconds(state.config.completion_grace_seconds());
    let verified = verify_completion(
        state.sessions.as_ref(),
        state.storage.as_ref(),
        &request,
        &uid,
        grace,
        Utc::now(),
    )
    .await?;

    let image = state
        .storage
        .download(&verified.session.bucket_path)
        .await
        .map_err(HttpAppError::from)?;

    let extracted = state
        .ocr
        .extract_text(&image)
        .await
        .map_err(HttpAppError::from)?;
    let raw_text = extracted.trim();

    // Extraction sees the full text; only the persisted copy is capped.
    let reading = extract_odometer(raw_text);
    tracing::info!(
        session_id = %verified.session.id,
        value = ?reading.value,
        confidence = reading.confidence,
        "extracted odometer reading"
    );

    let submission = Submission {
        id: verified.session.id,
        uid,
        bucket_path: verified.session.bucket_path.clone(),
        image_sha256: verified.image_sha256,
        gps: GpsPoint {
            lat: verified.lat,
            lng: verified.lng,
        },
        taken_at: verified.taken_at.as_deref().and_then(parse_capture_time),
        ocr: OcrReading {
            raw_text: truncate_chars(raw_text, state.config.ocr_raw_text_max_chars()),
            value: reading.value,
            confidence: reading.confidence,
        },
        server_timestamp: Utc::now(),
    };

    state.committer.commit(&submission).await?;

    Ok(Json(CompleteSubmissionResponse::ok()))
}

/// Cap stored OCR text; anything past the limit only inflates the record.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

/// Lenient RFC 3339 parse of the capture-time metadata string. Uploads carry
/// whatever the client wrote into the header, so a bad value becomes None
/// rather than failing the completion.
fn parse_capture_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("abcdef", 4), "abcd");
        assert_eq!(truncate_chars("abc", 4), "abc");
        // Multi-byte characters count as one
        assert_eq!(truncate_chars("kmのkmの", 3), "kmの");
    }

    #[test]
    fn test_parse_capture_time_lenient() {
        assert!(parse_capture_time("2026-08-30T12:00:00Z").is_some());
        assert!(parse_capture_time("2026-08-30T12:00:00+02:00").is_some());
        assert!(parse_capture_time("yesterday").is_none());
        assert!(parse_capture_time("").is_none());
    }
}
