//! Production service wiring.

use std::sync::Arc;

use anyhow::Context;
use odolog_core::Config;
use odolog_db::{
    create_pool, run_migrations, PgSubmissionStore, SessionStore, SubmissionCommitter,
};
use odolog_ocr::{GoogleVisionOcr, TextExtractor};
use odolog_storage::{create_storage, Storage};

use crate::auth::{IdentityVerifier, JwksIdentityVerifier};

/// The collaborators every request handler depends on.
pub struct Services {
    pub sessions: Arc<dyn SessionStore>,
    pub committer: Arc<dyn SubmissionCommitter>,
    pub storage: Arc<dyn Storage>,
    pub ocr: Arc<dyn TextExtractor>,
    pub identity: Arc<dyn IdentityVerifier>,
}

/// Construct the production services from configuration: PostgreSQL store
/// (with migrations applied), the configured storage backend, Vision OCR,
/// and JWKS identity verification.
pub async fn create_services(config: &Config) -> anyhow::Result<Services> {
    let pool = create_pool(config)
        .await
        .context("failed to create database pool")?;
    run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;
    let store = Arc::new(PgSubmissionStore::new(pool));

    let storage = create_storage(config)
        .await
        .context("failed to create storage backend")?;
    tracing::info!(backend = %storage.backend_type(), "storage backend ready");

    let api_key = config
        .vision_api_key()
        .context("GOOGLE_VISION_API_KEY environment variable not set")?;
    let ocr = Arc::new(
        GoogleVisionOcr::new(api_key.to_string(), config.vision_base_url().to_string())
            .context("failed to create Vision client")?,
    );

    // validate() already requires the JWKS URL; this guards direct callers.
    let jwks_url = config
        .identity_jwks_url()
        .context("IDENTITY_JWKS_URL environment variable not set")?;
    let identity = Arc::new(
        JwksIdentityVerifier::new(jwks_url.to_string())
            .context("failed to create identity verifier")?,
    );

    Ok(Services {
        sessions: store.clone(),
        committer: store,
        storage,
        ocr,
        identity,
    })
}
