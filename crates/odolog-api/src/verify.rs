//! Completion verification.
//!
//! Before anything is committed, the session and the uploaded object are
//! checked in a fixed order so each failure mode maps to one stable error.
//! The object store's recorded metadata is the source of truth for the hash
//! comparison; the client-declared value only lives on the session.

use chrono::{DateTime, Duration, Utc};
use odolog_core::models::{CompleteSubmissionRequest, UploadSession};
use odolog_core::AppError;
use odolog_db::SessionStore;
use odolog_storage::{Storage, StorageError};

/// Outcome of a successful verification: the session plus the upload facts
/// the record will be built from.
#[derive(Debug)]
pub struct VerifiedUpload {
    pub session: UploadSession,
    /// Hash the object store recorded at upload time.
    pub image_sha256: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Raw capture-time string from object metadata.
    pub taken_at: Option<String>,
}

fn storage_to_app(err: StorageError) -> AppError {
    match err {
        StorageError::NotFound(msg) => AppError::NotFound(msg),
        other => AppError::Storage(other.to_string()),
    }
}

/// Run the ordered completion checks for one session.
///
/// Check order: session exists, ownership, not yet used, nonce, expiry
/// (deadline plus grace), object uploaded, object hash recorded, hash
/// matches the declaration. The first failing check decides the error.
pub async fn verify_completion(
    sessions: &dyn SessionStore,
    storage: &dyn Storage,
    request: &CompleteSubmissionRequest,
    claimant_uid: &str,
    grace: Duration,
    now: DateTime<Utc>,
) -> Result<VerifiedUpload, AppError> {
    let session = sessions
        .get_session(request.submission_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("session {} does not exist", request.submission_id))
        })?;

    if let Some(owner) = &session.owner_uid {
        if owner != claimant_uid {
            return Err(AppError::Forbidden(format!(
                "session {} belongs to another identity",
                session.id
            )));
        }
    }

    if session.used {
        return Err(AppError::Conflict(format!(
            "session {} already completed",
            session.id
        )));
    }

    if session.nonce != request.nonce {
        return Err(AppError::InvalidInput(format!(
            "nonce does not match session {}",
            session.id
        )));
    }

    if session.is_expired(now, grace) {
        return Err(AppError::Expired(format!("session {} expired", session.id)));
    }

    let uploaded = storage
        .exists(&session.bucket_path)
        .await
        .map_err(storage_to_app)?;
    if !uploaded {
        return Err(AppError::NotFound(format!(
            "no upload found at {}",
            session.bucket_path
        )));
    }

    let metadata = storage
        .object_metadata(&session.bucket_path)
        .await
        .map_err(storage_to_app)?;

    let recorded_hash = metadata.image_sha256.ok_or_else(|| {
        AppError::InvalidInput(format!(
            "upload at {} carries no image hash metadata",
            session.bucket_path
        ))
    })?;

    if recorded_hash != session.expected.image_sha256 {
        return Err(AppError::InvalidInput(format!(
            "uploaded image hash does not match the declared hash for session {}",
            session.id
        )));
    }

    Ok(VerifiedUpload {
        session,
        image_sha256: recorded_hash,
        lat: metadata.lat,
        lng: metadata.lng,
        taken_at: metadata.taken_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use odolog_core::models::ExpectedUpload;
    use odolog_db::MemorySubmissionStore;
    use odolog_storage::{MemoryStorage, ObjectMetadata};
    use uuid::Uuid;

    const GRACE: i64 = 300;

    fn expected() -> ExpectedUpload {
        ExpectedUpload {
            content_type: "image/jpeg".to_string(),
            size_bytes: 1000,
            image_sha256: "a".repeat(64),
            lat: Some(48.85),
            lng: Some(2.35),
            taken_at: None,
        }
    }

    fn matching_metadata() -> ObjectMetadata {
        ObjectMetadata {
            content_type: Some("image/jpeg".to_string()),
            image_sha256: Some("a".repeat(64)),
            lat: Some(48.85),
            lng: Some(2.35),
            taken_at: Some("2026-08-30T12:00:00Z".to_string()),
        }
    }

    async fn staged(
        sessions: &MemorySubmissionStore,
        owner_uid: Option<&str>,
    ) -> UploadSession {
        let session = UploadSession::stage(
            owner_uid.map(str::to_string),
            expected(),
            Duration::seconds(120),
        );
        odolog_db::SessionStore::create_session(sessions, &session)
            .await
            .unwrap();
        session
    }

    fn request_for(session: &UploadSession) -> CompleteSubmissionRequest {
        CompleteSubmissionRequest {
            submission_id: session.id,
            nonce: session.nonce,
        }
    }

    #[tokio::test]
    async fn test_happy_path_returns_recorded_facts() {
        let sessions = MemorySubmissionStore::new();
        let storage = MemoryStorage::new();
        let session = staged(&sessions, None).await;
        storage
            .put_object(&session.bucket_path, vec![1], matching_metadata())
            .await;

        let verified = verify_completion(
            &sessions,
            &storage,
            &request_for(&session),
            "user-1",
            Duration::seconds(GRACE),
            Utc::now(),
        )
        .await
        .unwrap();

        assert_eq!(verified.session.id, session.id);
        assert_eq!(verified.image_sha256, "a".repeat(64));
        assert_eq!(verified.lat, Some(48.85));
        assert_eq!(verified.taken_at.as_deref(), Some("2026-08-30T12:00:00Z"));
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let sessions = MemorySubmissionStore::new();
        let storage = MemoryStorage::new();
        let request = CompleteSubmissionRequest {
            submission_id: Uuid::new_v4(),
            nonce: Uuid::new_v4(),
        };

        let err = verify_completion(
            &sessions,
            &storage,
            &request,
            "user-1",
            Duration::seconds(GRACE),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_foreign_owner_is_forbidden() {
        let sessions = MemorySubmissionStore::new();
        let storage = MemoryStorage::new();
        let session = staged(&sessions, Some("owner-uid")).await;
        storage
            .put_object(&session.bucket_path, vec![1], matching_metadata())
            .await;

        let err = verify_completion(
            &sessions,
            &storage,
            &request_for(&session),
            "someone-else",
            Duration::seconds(GRACE),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_used_session_is_conflict_even_with_bad_nonce() {
        let sessions = MemorySubmissionStore::new();
        let storage = MemoryStorage::new();
        let session = staged(&sessions, None).await;
        sessions
            .update_session(session.id, |s| s.used = true)
            .await;

        // The used check runs before the nonce check
        let request = CompleteSubmissionRequest {
            submission_id: session.id,
            nonce: Uuid::new_v4(),
        };
        let err = verify_completion(
            &sessions,
            &storage,
            &request,
            "user-1",
            Duration::seconds(GRACE),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_wrong_nonce_is_invalid_input() {
        let sessions = MemorySubmissionStore::new();
        let storage = MemoryStorage::new();
        let session = staged(&sessions, None).await;

        let request = CompleteSubmissionRequest {
            submission_id: session.id,
            nonce: Uuid::new_v4(),
        };
        let err = verify_completion(
            &sessions,
            &storage,
            &request,
            "user-1",
            Duration::seconds(GRACE),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_expiry_applies_after_grace_only() {
        let sessions = MemorySubmissionStore::new();
        let storage = MemoryStorage::new();
        let session = staged(&sessions, None).await;
        storage
            .put_object(&session.bucket_path, vec![1], matching_metadata())
            .await;

        // Inside the grace window completion still verifies
        let within_grace = session.expires_at + Duration::seconds(GRACE - 1);
        assert!(verify_completion(
            &sessions,
            &storage,
            &request_for(&session),
            "user-1",
            Duration::seconds(GRACE),
            within_grace,
        )
        .await
        .is_ok());

        let past_grace = session.expires_at + Duration::seconds(GRACE + 1);
        let err = verify_completion(
            &sessions,
            &storage,
            &request_for(&session),
            "user-1",
            Duration::seconds(GRACE),
            past_grace,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Expired(_)));
    }

    #[tokio::test]
    async fn test_missing_upload_is_not_found() {
        let sessions = MemorySubmissionStore::new();
        let storage = MemoryStorage::new();
        let session = staged(&sessions, None).await;

        let err = verify_completion(
            &sessions,
            &storage,
            &request_for(&session),
            "user-1",
            Duration::seconds(GRACE),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_upload_without_hash_metadata_is_invalid() {
        let sessions = MemorySubmissionStore::new();
        let storage = MemoryStorage::new();
        let session = staged(&sessions, None).await;
        let metadata = ObjectMetadata {
            image_sha256: None,
            ..matching_metadata()
        };
        storage.put_object(&session.bucket_path, vec![1], metadata).await;

        let err = verify_completion(
            &sessions,
            &storage,
            &request_for(&session),
            "user-1",
            Duration::seconds(GRACE),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_hash_mismatch_is_invalid() {
        let sessions = MemorySubmissionStore::new();
        let storage = MemoryStorage::new();
        let session = staged(&sessions, None).await;
        let metadata = ObjectMetadata {
            image_sha256: Some("b".repeat(64)),
            ..matching_metadata()
        };
        storage.put_object(&session.bucket_path, vec![1], metadata).await;

        let err = verify_completion(
            &sessions,
            &storage,
            &request_for(&session),
            "user-1",
            Duration::seconds(GRACE),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
