use anyhow::Result;
use std::env;

/// Development-only signing secret. Release builds refuse to start with it.
pub const INSECURE_DEFAULT_SECRET: &str = "your_super_secret_key";

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry: u64, // 30 minutes
}

impl JwtConfig {
    pub fn from_env() -> Result<Self> {
        let secret = resolve_secret(env::var("JWT_SECRET").ok(), cfg!(debug_assertions))?;

        let access_token_expiry = env::var("JWT_ACCESS_EXPIRATION")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1800); // 30 minutes

        Ok(Self {
            secret,
            access_token_expiry,
        })
    }
}

/// Pick the signing secret. The built-in default is only tolerated when
/// `allow_insecure_default` is set (debug builds).
pub fn resolve_secret(raw: Option<String>, allow_insecure_default: bool) -> Result<String> {
    match raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
        Some(secret) if secret == INSECURE_DEFAULT_SECRET => {
            if allow_insecure_default {
                tracing::warn!("JWT_SECRET is the insecure development default");
                Ok(secret)
            } else {
                Err(anyhow::anyhow!(
                    "JWT_SECRET must not be the insecure default in release builds"
                ))
            }
        }
        Some(secret) => {
            if secret.len() < MIN_SECRET_LEN {
                return Err(anyhow::anyhow!(
                    "JWT_SECRET must be at least {MIN_SECRET_LEN} characters"
                ));
            }
            Ok(secret)
        }
        None if allow_insecure_default => {
            tracing::warn!("JWT_SECRET not set, using the insecure development default");
            Ok(INSECURE_DEFAULT_SECRET.to_string())
        }
        None => Err(anyhow::anyhow!(
            "JWT_SECRET environment variable must be set"
        )),
    }
}
