//! Identity verification.
//!
//! Bearer tokens are verified against the identity provider's JWKS endpoint.
//! The trait seam exists so integration tests can stub verification without
//! a live provider.

pub mod jwks;
pub mod middleware;

use async_trait::async_trait;
use odolog_core::AppError;

pub use jwks::JwksIdentityVerifier;

/// Claims carried by a verified identity token.
#[derive(Debug, Clone)]
pub struct IdentityClaims {
    /// Stable subject identifier of the authenticated user.
    pub uid: String,
}

/// Verifies bearer tokens and extracts the caller's identity.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify a raw bearer token. Returns `Unauthorized` for any token that
    /// fails signature, expiry, or structural checks.
    async fn verify(&self, token: &str) -> Result<IdentityClaims, AppError>;
}
