//! Upload session domain model.
//!
//! A session represents one staged upload: it is created together with a
//! scoped write credential, and consumed exactly once when the completion
//! transaction commits.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Immutable snapshot of what the client declared at session-open time.
///
/// These values are never the source of truth for the committed record; they
/// exist to cross-check what the object store actually recorded at upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedUpload {
    pub content_type: String,
    pub size_bytes: i64,
    pub image_sha256: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub taken_at: Option<DateTime<Utc>>,
}

/// One staged upload and its lifecycle state.
///
/// Invariant: `used` transitions false -> true at most once, and only inside
/// the commit transaction that creates the matching [`Submission`](super::Submission).
#[derive(Debug, Clone)]
pub struct UploadSession {
    pub id: Uuid,
    /// Identity subject. None until completion for open sessions; fixed
    /// permanently once set.
    pub owner_uid: Option<String>,
    /// Single-use completion token.
    pub nonce: Uuid,
    /// Object-store key the client must upload to.
    pub bucket_path: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub expected: ExpectedUpload,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Derive the object-store key for a session.
///
/// Files live under an "open" area so the path has no owner dependency.
pub fn bucket_path_for(session_id: Uuid) -> String {
    format!("submissions/open/{}/original.jpg", session_id)
}

impl UploadSession {
    /// Stage a new session: fresh id and nonce, derived object path,
    /// `used = false`, expiry at `now + ttl`.
    pub fn stage(owner_uid: Option<String>, expected: ExpectedUpload, ttl: Duration) -> Self {
        let id = Uuid::new_v4();
        let now = Utc::now();
        UploadSession {
            id,
            owner_uid,
            nonce: Uuid::new_v4(),
            bucket_path: bucket_path_for(id),
            expires_at: now + ttl,
            used: false,
            expected,
            created_at: now,
            completed_at: None,
        }
    }

    /// Whether the session is past its deadline plus the completion grace
    /// period (bounded slack for clock/network skew).
    pub fn is_expired(&self, now: DateTime<Utc>, grace: Duration) -> bool {
        self.expires_at < now - grace
    }
}
