pub mod routes;
pub mod server;
pub mod services;

use std::sync::Arc;

use axum::Router;
use odolog_core::Config;

use crate::state::AppState;

/// Wire configuration, services, and routes into a runnable application.
pub async fn initialize_app(config: Config) -> anyhow::Result<(Arc<AppState>, Router)> {
    config.validate()?;

    let services = services::create_services(&config).await?;

    let state = Arc::new(AppState {
        config,
        sessions: services.sessions,
        committer: services.committer,
        storage: services.storage,
        ocr: services.ocr,
        identity: services.identity,
    });

    let router = routes::create_router(state.clone());
    Ok((state, router))
}
