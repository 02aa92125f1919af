//! Bearer-auth middleware.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use odolog_core::AppError;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Verified caller identity, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct AuthedUser(pub String);

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

/// Reject the request unless it carries a valid bearer token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpAppError> {
    let token = bearer_token(&req)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;
    let claims = state.identity.verify(&token).await?;
    req.extensions_mut().insert(AuthedUser(claims.uid));
    Ok(next.run(req).await)
}

/// Attach the caller identity when a bearer token is present.
///
/// A missing token passes through with no identity; a present but invalid
/// token is still rejected, so callers never proceed with a broken credential.
pub async fn optional_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpAppError> {
    if let Some(token) = bearer_token(&req) {
        let claims = state.identity.verify(&token).await?;
        req.extensions_mut().insert(AuthedUser(claims.uid));
    }
    Ok(next.run(req).await)
}
