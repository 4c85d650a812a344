use anyhow::{Context, Result};
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::core::config::EmailConfig;

/// Environment variable holding the SMTP password.
pub const SMTP_PASSWORD_ENV: &str = "ORGCOST_SMTP_PASSWORD";

/// Sends the rendered report as a single HTML email.
pub struct Mailer {
    config: EmailConfig,
}

impl Mailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Build the report message: configured subject, sender and recipient,
    /// with the combined HTML document as the sole body part.
    fn build_message(&self, html_body: &str) -> Result<Message> {
        let from: Mailbox = self
            .config
            .sender
            .parse()
            .context("Invalid sender email address")?;
        let to: Mailbox = self
            .config
            .recipient
            .parse()
            .context("Invalid recipient email address")?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(&self.config.subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .context("Failed to build email message")
    }

    /// Submit the report for delivery over SMTP with STARTTLS and log the
    /// server's acknowledgment. A send failure propagates; there is no retry.
    pub async fn send(&self, html_body: &str) -> Result<()> {
        let email = self.build_message(html_body)?;

        let password = std::env::var(SMTP_PASSWORD_ENV)
            .with_context(|| format!("{} env var not set", SMTP_PASSWORD_ENV))?;
        let username = self
            .config
            .smtp_username
            .clone()
            .unwrap_or_else(|| self.config.sender.clone());
        let creds = Credentials::new(username, password);

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
                .context("Failed to create SMTP transport")?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build();

        let response = mailer
            .send(email)
            .await
            .context("Failed to send report email via SMTP")?;

        info!(
            to = %self.config.recipient,
            subject = %self.config.subject,
            code = %response.code(),
            "Report email accepted for delivery"
        );

        Ok(())
    }
}
