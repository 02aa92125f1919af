//! In-memory store for tests.
//!
//! A single lock guards both maps so the commit has the same
//! all-or-nothing behavior as the PostgreSQL transaction.

use async_trait::async_trait;
use odolog_core::models::{Submission, UploadSession};
use odolog_core::AppError;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    sessions: HashMap<Uuid, UploadSession>,
    submissions: HashMap<Uuid, Submission>,
}

/// Memory store implementation
#[derive(Default)]
pub struct MemorySubmissionStore {
    inner: Mutex<Inner>,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        MemorySubmissionStore::default()
    }

    /// Test hook: mutate a stored session in place.
    pub async fn update_session<F>(&self, id: Uuid, f: F)
    where
        F: FnOnce(&mut UploadSession),
    {
        if let Some(session) = self.inner.lock().await.sessions.get_mut(&id) {
            f(session);
        }
    }

    /// Test hook: read back a committed submission.
    pub async fn get_submission(&self, id: Uuid) -> Option<Submission> {
        self.inner.lock().await.submissions.get(&id).cloned()
    }
}

#[async_trait]
impl crate::db::traits::SessionStore for MemorySubmissionStore {
    async fn create_session(&self, session: &UploadSession) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;
        if inner.sessions.contains_key(&session.id) {
            return Err(AppError::Internal(format!(
                "session id collision for {}",
                session.id
            )));
        }
        inner.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<UploadSession>, AppError> {
        Ok(self.inner.lock().await.sessions.get(&id).cloned())
    }
}

#[async_trait]
impl crate::db::traits::SubmissionCommitter for MemorySubmissionStore {
    async fn commit(&self, submission: &Submission) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;

        let session = inner.sessions.get(&submission.id).ok_or_else(|| {
            AppError::NotFound(format!("session {} does not exist", submission.id))
        })?;
        if session.used {
            return Err(AppError::Conflict(format!(
                "session {} already consumed",
                submission.id
            )));
        }
        if inner.submissions.contains_key(&submission.id) {
            return Err(AppError::Conflict(format!(
                "submission {} already exists",
                submission.id
            )));
        }

        inner.submissions.insert(submission.id, submission.clone());
        if let Some(session) = inner.sessions.get_mut(&submission.id) {
            session.used = true;
            session.owner_uid = Some(submission.uid.clone());
            session.completed_at = Some(submission.server_timestamp);
        }

        Ok(())
    }
}
