//! Verification of identity tokens issued by Google Sign-In.

use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

pub const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
pub const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Identity asserted by an external provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedIdentity {
    pub email: String,
    pub subject_id: String,
}

/// An external identity provider able to vouch for a token.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify `token` was issued for `audience` and return who it identifies.
    async fn verify_id_token(&self, token: &str, audience: &str) -> AppResult<FederatedIdentity>;
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    sub: String,
    email: Option<String>,
    email_verified: Option<bool>,
}

fn identity_from_claims(claims: GoogleClaims) -> AppResult<FederatedIdentity> {
    if claims.email_verified == Some(false) {
        return Err(AppError::Unauthorized);
    }
    let email = claims
        .email
        .filter(|e| !e.is_empty())
        .ok_or(AppError::Unauthorized)?;
    Ok(FederatedIdentity {
        email,
        subject_id: claims.sub,
    })
}

struct CachedKeys {
    keys: JwkSet,
    expires_at: DateTime<Utc>,
}

impl CachedKeys {
    fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Validates RS256 ID tokens against Google's published signing keys.
pub struct GoogleIdentityProvider {
    http: reqwest::Client,
    certs_url: String,
    cache: RwLock<Option<CachedKeys>>,
    cache_ttl: Duration,
}

impl GoogleIdentityProvider {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            certs_url: GOOGLE_CERTS_URL.to_string(),
            cache: RwLock::new(None),
            cache_ttl: Duration::hours(1),
        }
    }

    async fn signing_keys(&self, force_refresh: bool) -> AppResult<JwkSet> {
        if !force_refresh {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref().filter(|c| !c.is_expired()) {
                return Ok(cached.keys.clone());
            }
        }

        let response = self
            .http
            .get(&self.certs_url)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("fetching Google certificates: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Google certificates request failed: {}",
                response.status()
            )));
        }

        let keys: JwkSet = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("decoding Google certificates: {e}")))?;

        let mut cache = self.cache.write().await;
        *cache = Some(CachedKeys {
            keys: keys.clone(),
            expires_at: Utc::now() + self.cache_ttl,
        });
        Ok(keys)
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    async fn verify_id_token(&self, token: &str, audience: &str) -> AppResult<FederatedIdentity> {
        let header = decode_header(token).map_err(|_| AppError::Unauthorized)?;
        let kid = header.kid.ok_or(AppError::Unauthorized)?;

        // Google rotates keys; an unknown kid triggers one refetch.
        let mut keys = self.signing_keys(false).await?;
        if keys.find(&kid).is_none() {
            keys = self.signing_keys(true).await?;
        }
        let jwk = keys.find(&kid).ok_or(AppError::Unauthorized)?;
        let key = DecodingKey::from_jwk(jwk).map_err(|_| AppError::Unauthorized)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[audience]);
        validation.set_issuer(&GOOGLE_ISSUERS);

        let claims = decode::<GoogleClaims>(token, &key, &validation)
            .map_err(|e| {
                tracing::debug!("Google ID token rejected: {e}");
                AppError::Unauthorized
            })?
            .claims;

        identity_from_claims(claims)
    }
}
