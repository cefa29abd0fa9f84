use super::non_empty_env;
use std::env;

#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
    /// Mailbox that receives contact-form submissions.
    pub contact_inbox: String,
}

impl EmailConfig {
    /// Read email config from environment variables.
    /// Returns None if SMTP is not configured; contact messages are then only logged.
    pub fn from_env() -> Option<Self> {
        let smtp_host = non_empty_env("SMTP_HOST")?;
        let smtp_port = env::var("SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);
        let smtp_username = non_empty_env("SMTP_USERNAME")?;
        let smtp_password = non_empty_env("SMTP_PASSWORD")?;
        let from_address = non_empty_env("SMTP_FROM")
            .unwrap_or_else(|| format!("StreetVoice <{}>", smtp_username));
        let contact_inbox = non_empty_env("CONTACT_INBOX").unwrap_or_else(|| smtp_username.clone());

        Some(Self {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            from_address,
            contact_inbox,
        })
    }
}
