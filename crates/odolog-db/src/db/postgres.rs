use async_trait::async_trait;
use chrono::{DateTime, Utc};
use odolog_core::models::{ExpectedUpload, Submission, UploadSession};
use odolog_core::AppError;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::db::traits::{SessionStore, SubmissionCommitter};
use crate::db::transaction::TransactionGuard;

/// PostgreSQL store for upload sessions and submissions
#[derive(Clone)]
pub struct PgSubmissionStore {
    pool: PgPool,
}

impl PgSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSubmissionStore {
    async fn create_session(&self, session: &UploadSession) -> Result<(), AppError> {
        // Dynamic SQLx queries to avoid requiring DATABASE_URL/sqlx prepare
        let result = sqlx::query(
            r#"
            INSERT INTO submission_sessions (
                id, owner_uid, nonce, bucket_path, expires_at, used,
                expected_content_type, expected_size_bytes, expected_image_sha256,
                expected_lat, expected_lng, expected_taken_at,
                created_at, completed_at
            )
            VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7, $8, $9, $10, $11, $12, NULL)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(session.id)
        .bind(&session.owner_uid)
        .bind(session.nonce)
        .bind(&session.bucket_path)
        .bind(session.expires_at)
        .bind(&session.expected.content_type)
        .bind(session.expected.size_bytes)
        .bind(&session.expected.image_sha256)
        .bind(session.expected.lat)
        .bind(session.expected.lng)
        .bind(session.expected.taken_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        // Ids are v4 UUIDs; a collision here is a server fault.
        if result.rows_affected() != 1 {
            return Err(AppError::Internal(format!(
                "session id collision for {}",
                session.id
            )));
        }

        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<UploadSession>, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                id, owner_uid, nonce, bucket_path, expires_at, used,
                expected_content_type, expected_size_bytes, expected_image_sha256,
                expected_lat, expected_lng, expected_taken_at,
                created_at, completed_at
            FROM submission_sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRow::into_session))
    }
}

#[async_trait]
impl SubmissionCommitter for PgSubmissionStore {
    async fn commit(&self, submission: &Submission) -> Result<(), AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        // Consume the session first: the row-level lock on the session is
        // what serializes concurrent completions of the same id.
        let consumed = sqlx::query(
            r#"
            UPDATE submission_sessions
            SET used = TRUE, owner_uid = $2, completed_at = $3
            WHERE id = $1 AND used = FALSE
            "#,
        )
        .bind(submission.id)
        .bind(&submission.uid)
        .bind(submission.server_timestamp)
        .execute(&mut **tx)
        .await?;

        if consumed.rows_affected() != 1 {
            tx.rollback().await?;
            return Err(AppError::Conflict(format!(
                "session {} already consumed",
                submission.id
            )));
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO submissions (
                id, uid, bucket_path, image_sha256, gps_lat, gps_lng, taken_at,
                ocr_raw_text, ocr_value, ocr_confidence, server_timestamp
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(submission.id)
        .bind(&submission.uid)
        .bind(&submission.bucket_path)
        .bind(&submission.image_sha256)
        .bind(submission.gps.lat)
        .bind(submission.gps.lng)
        .bind(submission.taken_at)
        .bind(&submission.ocr.raw_text)
        .bind(submission.ocr.value.map(i64::from))
        .bind(submission.ocr.confidence)
        .bind(submission.server_timestamp)
        .execute(&mut **tx)
        .await?;

        if inserted.rows_affected() != 1 {
            tx.rollback().await?;
            return Err(AppError::Conflict(format!(
                "submission {} already exists",
                submission.id
            )));
        }

        tx.commit().await?;

        tracing::info!(
            submission_id = %submission.id,
            uid = %submission.uid,
            "submission committed"
        );

        Ok(())
    }
}

/// Session row as stored
#[derive(Debug)]
struct SessionRow {
    id: Uuid,
    owner_uid: Option<String>,
    nonce: Uuid,
    bucket_path: String,
    expires_at: DateTime<Utc>,
    used: bool,
    expected_content_type: String,
    expected_size_bytes: i64,
    expected_image_sha256: String,
    expected_lat: Option<f64>,
    expected_lng: Option<f64>,
    expected_taken_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for SessionRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(SessionRow {
            id: row.get("id"),
            owner_uid: row.get("owner_uid"),
            nonce: row.get("nonce"),
            bucket_path: row.get("bucket_path"),
            expires_at: row.get("expires_at"),
            used: row.get("used"),
            expected_content_type: row.get("expected_content_type"),
            expected_size_bytes: row.get("expected_size_bytes"),
            expected_image_sha256: row.get("expected_image_sha256"),
            expected_lat: row.get("expected_lat"),
            expected_lng: row.get("expected_lng"),
            expected_taken_at: row.get("expected_taken_at"),
            created_at: row.get("created_at"),
            completed_at: row.get("completed_at"),
        })
    }
}

impl SessionRow {
    fn into_session(self) -> UploadSession {
        UploadSession {
            id: self.id,
            owner_uid: self.owner_uid,
            nonce: self.nonce,
            bucket_path: self.bucket_path,
            expires_at: self.expires_at,
            used: self.used,
            expected: ExpectedUpload {
                content_type: self.expected_content_type,
                size_bytes: self.expected_size_bytes,
                image_sha256: self.expected_image_sha256,
                lat: self.expected_lat,
                lng: self.expected_lng,
                taken_at: self.expected_taken_at,
            },
            created_at: self.created_at,
            completed_at: self.completed_at,
        }
    }
}
