use crate::config::jwt::JwtConfig;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // email
    pub exp: i64,    // expiration time
    pub iat: i64,    // issued at
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed or its signature is invalid")]
    Invalid,
    #[error("token has expired")]
    Expired,
}

/// Subject and expiry extracted from a valid session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedToken {
    pub subject_email: String,
    pub expiry: DateTime<Utc>,
}

/// Mints and validates HS256 session tokens. Stateless: nothing is stored.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    default_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, default_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            default_ttl,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(
            &config.secret,
            Duration::seconds(config.access_token_expiry as i64),
        )
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn issue(&self, subject_email: &str, ttl: Duration) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject_email.to_owned(),
            exp: now + ttl.num_seconds(),
            iat: now,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to encode session token: {}", e))
    }

    /// Issue a token with the configured session lifetime.
    pub fn issue_session(&self, subject_email: &str) -> Result<String> {
        self.issue(subject_email, self.default_ttl)
    }

    /// Expiry is checked here rather than by `jsonwebtoken` so that a token is
    /// rejected as soon as `now >= exp`, with no leeway.
    pub fn validate(&self, token: &str) -> Result<ValidatedToken, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?
            .claims;

        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        if claims.sub.is_empty() {
            return Err(TokenError::Invalid);
        }

        let expiry = DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::Invalid)?;
        Ok(ValidatedToken {
            subject_email: claims.sub,
            expiry,
        })
    }
}
