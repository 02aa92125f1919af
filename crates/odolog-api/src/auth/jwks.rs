//! JWKS-backed token verification.
//!
//! Decoding keys are fetched from the identity provider's JWKS endpoint and
//! cached per `kid`. A token whose `kid` is not cached triggers a refetch, so
//! provider key rotation is picked up without a restart.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use odolog_core::AppError;
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{IdentityClaims, IdentityVerifier};

const KEY_CACHE_TTL_SECONDS: u64 = 3600;

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: Option<String>,
    kty: String,
    // RSA components
    n: Option<String>,
    e: Option<String>,
    // EC components
    crv: Option<String>,
    x: Option<String>,
    y: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    exp: usize,
}

struct CachedKey {
    key: DecodingKey,
    algorithm: Algorithm,
    fetched_at: Instant,
}

/// Verifies RS256/ES256 bearer tokens against a JWKS endpoint.
pub struct JwksIdentityVerifier {
    http_client: reqwest::Client,
    jwks_url: String,
    keys: RwLock<HashMap<String, CachedKey>>,
    cache_ttl: Duration,
}

impl JwksIdentityVerifier {
    pub fn new(jwks_url: String) -> Result<Self, AppError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            jwks_url,
            keys: RwLock::new(HashMap::new()),
            cache_ttl: Duration::from_secs(KEY_CACHE_TTL_SECONDS),
        })
    }

    async fn cached_key(&self, kid: &str) -> Option<(DecodingKey, Algorithm)> {
        let keys = self.keys.read().await;
        keys.get(kid)
            .filter(|cached| cached.fetched_at.elapsed() < self.cache_ttl)
            .map(|cached| (cached.key.clone(), cached.algorithm))
    }

    async fn refresh_keys(&self) -> Result<(), AppError> {
        let jwks: Jwks = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("JWKS fetch failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("JWKS response malformed: {}", e)))?;

        let now = Instant::now();
        let mut fresh = HashMap::new();
        for jwk in jwks.keys {
            let Some(kid) = jwk.kid.clone() else {
                continue;
            };
            // Keys we cannot build are skipped rather than failing the whole set.
            if let Some((key, algorithm)) = build_decoding_key(&jwk) {
                fresh.insert(
                    kid,
                    CachedKey {
                        key,
                        algorithm,
                        fetched_at: now,
                    },
                );
            }
        }

        tracing::debug!(key_count = fresh.len(), "refreshed JWKS key cache");
        *self.keys.write().await = fresh;
        Ok(())
    }
}

fn build_decoding_key(jwk: &Jwk) -> Option<(DecodingKey, Algorithm)> {
    match jwk.kty.as_str() {
        "RSA" => {
            let (n, e) = (jwk.n.as_deref()?, jwk.e.as_deref()?);
            let key = DecodingKey::from_rsa_components(n, e).ok()?;
            Some((key, Algorithm::RS256))
        }
        "EC" if jwk.crv.as_deref() == Some("P-256") => {
            let (x, y) = (jwk.x.as_deref()?, jwk.y.as_deref()?);
            let key = DecodingKey::from_ec_components(x, y).ok()?;
            Some((key, Algorithm::ES256))
        }
        _ => None,
    }
}

#[async_trait]
impl IdentityVerifier for JwksIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<IdentityClaims, AppError> {
        let header = decode_header(token)
            .map_err(|e| AppError::Unauthorized(format!("Malformed token: {}", e)))?;
        let kid = header
            .kid
            .ok_or_else(|| AppError::Unauthorized("Token has no key id".to_string()))?;

        let (key, algorithm) = match self.cached_key(&kid).await {
            Some(entry) => entry,
            None => {
                self.refresh_keys().await?;
                self.cached_key(&kid).await.ok_or_else(|| {
                    AppError::Unauthorized(format!("Unknown signing key: {}", kid))
                })?
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_aud = false;

        let token_data = decode::<Claims>(token, &key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(IdentityClaims {
            uid: token_data.claims.sub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_decoding_key_skips_unsupported_kty() {
        let jwk = Jwk {
            kid: Some("k1".to_string()),
            kty: "oct".to_string(),
            n: None,
            e: None,
            crv: None,
            x: None,
            y: None,
        };
        assert!(build_decoding_key(&jwk).is_none());
    }

    #[test]
    fn test_jwks_parses_mixed_key_set() {
        let json = r#"{"keys": [
            {"kid": "rsa-1", "kty": "RSA", "n": "AQAB", "e": "AQAB"},
            {"kid": "ec-1", "kty": "EC", "crv": "P-256", "x": "AA", "y": "AA"},
            {"kty": "RSA", "n": "AQAB", "e": "AQAB"}
        ]}"#;
        let jwks: Jwks = serde_json::from_str(json).unwrap();
        assert_eq!(jwks.keys.len(), 3);
        assert!(jwks.keys[2].kid.is_none());
    }

    #[tokio::test]
    async fn test_verify_rejects_garbage_token() {
        let verifier =
            JwksIdentityVerifier::new("https://example.com/jwks.json".to_string()).unwrap();
        let err = verifier.verify("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
