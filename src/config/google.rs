use super::non_empty_env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth client id; federated tokens must carry it as audience.
    pub client_id: Option<String>,
    pub verify_timeout: Duration,
}

impl GoogleConfig {
    pub fn from_env() -> Self {
        let client_id = non_empty_env("GOOGLE_CLIENT_ID");
        if client_id.is_none() {
            tracing::warn!("GOOGLE_CLIENT_ID not set, federated sign-in is disabled");
        }

        let verify_timeout = non_empty_env("FEDERATED_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(5));

        Self {
            client_id,
            verify_timeout,
        }
    }
}
