use std::sync::Arc;

use odolog_core::Config;
use odolog_db::{SessionStore, SubmissionCommitter};
use odolog_ocr::TextExtractor;
use odolog_storage::Storage;

use crate::auth::IdentityVerifier;

/// Shared application state, behind an `Arc` in every handler.
///
/// All collaborators are trait objects wired at startup, so tests can swap in
/// in-memory implementations without touching the router.
pub struct AppState {
    pub config: Config,
    pub sessions: Arc<dyn SessionStore>,
    pub committer: Arc<dyn SubmissionCommitter>,
    pub storage: Arc<dyn Storage>,
    pub ocr: Arc<dyn TextExtractor>,
    pub identity: Arc<dyn IdentityVerifier>,
}
