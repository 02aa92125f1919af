//! Store traits for sessions and submissions.

use async_trait::async_trait;
use odolog_core::models::{Submission, UploadSession};
use odolog_core::AppError;
use uuid::Uuid;

/// Persistence for upload sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a freshly staged session.
    ///
    /// Session ids are generated, so a collision is a server fault rather
    /// than a client conflict.
    async fn create_session(&self, session: &UploadSession) -> Result<(), AppError>;

    /// Fetch a session by id.
    async fn get_session(&self, id: Uuid) -> Result<Option<UploadSession>, AppError>;
}

/// Exactly-once commit of a verified submission.
#[async_trait]
pub trait SubmissionCommitter: Send + Sync {
    /// Atomically consume the session and write the submission record.
    ///
    /// In one transaction: inserts the record (id equals the session id) and
    /// flips the session to `used`, fixing its owner to `submission.uid`.
    /// Returns `Conflict` if the session was already consumed or the record
    /// already exists; on any error nothing is written.
    async fn commit(&self, submission: &Submission) -> Result<(), AppError>;
}
