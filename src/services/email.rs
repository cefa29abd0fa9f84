use crate::config::email::EmailConfig;
use anyhow::Result;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// A message submitted through the public contact form.
#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Clone)]
pub struct EmailService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: Option<String>,
    inbox: Option<String>,
}

impl EmailService {
    /// Build from environment variables. Without SMTP configuration contact
    /// messages are only written to the log.
    pub fn from_env() -> Self {
        let Some(cfg) = EmailConfig::from_env() else {
            return Self::disabled();
        };

        let creds = Credentials::new(cfg.smtp_username.clone(), cfg.smtp_password.clone());
        match AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host)
            .map(|builder| builder.port(cfg.smtp_port).credentials(creds).build())
        {
            Ok(t) => Self {
                transport: Some(t),
                from_address: Some(cfg.from_address),
                inbox: Some(cfg.contact_inbox),
            },
            Err(e) => {
                tracing::warn!("Failed to build SMTP transport: {e}");
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self {
            transport: None,
            from_address: None,
            inbox: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    /// Deliver a contact-form submission to the team inbox.
    pub async fn forward_contact(&self, contact: &ContactMessage) -> Result<()> {
        let (Some(transport), Some(from), Some(inbox)) =
            (&self.transport, &self.from_address, &self.inbox)
        else {
            tracing::info!(
                name = %contact.name,
                email = %contact.email,
                "contact message received: {}",
                contact.message
            );
            return Ok(());
        };

        let from_mailbox: Mailbox = from.parse().map_err(|e: lettre::address::AddressError| {
            anyhow::anyhow!("Invalid from address '{}': {}", from, e)
        })?;
        let to_mailbox: Mailbox = inbox.parse().map_err(|e: lettre::address::AddressError| {
            anyhow::anyhow!("Invalid inbox address '{}': {}", inbox, e)
        })?;
        let reply_to: Mailbox =
            contact
                .email
                .parse()
                .map_err(|e: lettre::address::AddressError| {
                    anyhow::anyhow!("Invalid sender address '{}': {}", contact.email, e)
                })?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .reply_to(reply_to)
            .subject(format!("Contact form: {}", contact.name))
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "From: {} <{}>\n\n{}",
                contact.name, contact.email, contact.message
            ))?;

        transport.send(email).await?;
        tracing::info!("Contact message from {} forwarded", contact.email);
        Ok(())
    }
}
