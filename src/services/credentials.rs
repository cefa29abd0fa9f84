//! Bearer credential verification.
//!
//! A credential is either a session token minted by [`TokenIssuer`] or an ID
//! token from the federated identity provider. Strategies are tried in a
//! fixed order (local first, then federated); the first one that accepts the
//! credential decides the subject. None of this touches the user store.

use crate::error::{AppError, AppResult};
use crate::services::federated::{FederatedIdentity, IdentityProvider};
use crate::utils::TokenIssuer;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Stable subject identifier: the account email.
pub type SubjectId = String;

#[async_trait]
pub trait CredentialStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn verify(&self, credential: &str) -> AppResult<SubjectId>;
}

/// Accepts session tokens signed by this service.
pub struct LocalStrategy {
    issuer: Arc<TokenIssuer>,
}

impl LocalStrategy {
    pub fn new(issuer: Arc<TokenIssuer>) -> Self {
        Self { issuer }
    }
}

#[async_trait]
impl CredentialStrategy for LocalStrategy {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn verify(&self, credential: &str) -> AppResult<SubjectId> {
        self.issuer
            .validate(credential)
            .map(|token| token.subject_email)
            .map_err(|e| {
                tracing::debug!("local token rejected: {e}");
                AppError::Unauthorized
            })
    }
}

/// Accepts ID tokens from the external identity provider, bounded by a timeout.
pub struct FederatedStrategy {
    provider: Arc<dyn IdentityProvider>,
    audience: Option<String>,
    timeout: Duration,
}

impl FederatedStrategy {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        audience: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            audience,
            timeout,
        }
    }

    /// Every provider failure (bad token, outage, timeout) is reported as
    /// `Unauthorized`; the provider can never fail a request any other way.
    pub async fn verify_identity(&self, token: &str) -> AppResult<FederatedIdentity> {
        let audience = self.audience.as_deref().ok_or(AppError::Unauthorized)?;

        match tokio::time::timeout(self.timeout, self.provider.verify_id_token(token, audience))
            .await
        {
            Ok(Ok(identity)) => Ok(identity),
            Ok(Err(AppError::Unauthorized)) => Err(AppError::Unauthorized),
            Ok(Err(e)) => {
                tracing::warn!("federated verification failed: {e}");
                Err(AppError::Unauthorized)
            }
            Err(_) => {
                tracing::warn!(
                    "federated verification timed out after {:?}",
                    self.timeout
                );
                Err(AppError::Unauthorized)
            }
        }
    }
}

#[async_trait]
impl CredentialStrategy for FederatedStrategy {
    fn name(&self) -> &'static str {
        "federated"
    }

    async fn verify(&self, credential: &str) -> AppResult<SubjectId> {
        self.verify_identity(credential)
            .await
            .map(|identity| identity.email)
    }
}

pub struct CredentialVerifier {
    strategies: Vec<Arc<dyn CredentialStrategy>>,
}

impl CredentialVerifier {
    pub fn new(strategies: Vec<Arc<dyn CredentialStrategy>>) -> Self {
        Self { strategies }
    }

    /// The canonical chain: local session tokens, then federated ID tokens.
    pub fn local_first(issuer: Arc<TokenIssuer>, federated: Arc<FederatedStrategy>) -> Self {
        Self::new(vec![Arc::new(LocalStrategy::new(issuer)), federated])
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn resolve_identity(&self, credential: &str) -> AppResult<SubjectId> {
        if credential.trim().is_empty() {
            return Err(AppError::Unauthorized);
        }

        for strategy in &self.strategies {
            match strategy.verify(credential).await {
                Ok(subject) => return Ok(subject),
                Err(e) => tracing::debug!(strategy = strategy.name(), "credential rejected: {e}"),
            }
        }

        Err(AppError::Unauthorized)
    }
}
