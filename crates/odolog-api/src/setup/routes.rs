//! Router assembly.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Json, Router,
};
use odolog_core::Config;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa_rapidoc::RapiDoc;

use crate::api_doc;
use crate::auth::middleware::{optional_auth, require_auth};
use crate::handlers::{health, submission_session};
use crate::state::AppState;

pub fn setup_cors(config: &Config) -> CorsLayer {
    let origins = config.cors_origins();
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(parsed)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(api_doc::get_openapi_spec())
}

/// Build the full application router.
///
/// Session creation accepts anonymous callers (subject to the open-sessions
/// flag, enforced in the handler); completion always requires a verified
/// identity.
pub fn create_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/ping", get(health::ping))
        .route("/api/openapi.json", get(openapi_spec))
        .merge(RapiDoc::new("/api/openapi.json").path("/docs"));

    let create = Router::new()
        .route(
            "/createSubmissionSession",
            post(submission_session::create_submission_session),
        )
        .layer(middleware::from_fn_with_state(state.clone(), optional_auth));

    let complete = Router::new()
        .route(
            "/completeSubmission",
            post(submission_session::complete_submission),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(create)
        .merge(complete)
        .layer(TraceLayer::new_for_http())
        .layer(setup_cors(&state.config))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_bytes()))
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.request_timeout_secs(),
        )))
        .with_state(state)
}
