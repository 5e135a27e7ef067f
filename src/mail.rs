//! SMTP mail transport via lettre.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;

use crate::config::SmtpConfig;
use crate::error::TransportError;
use crate::notify::{MailTransport, OutgoingMail};

/// Sends notifications as HTML mail through an SMTP relay.
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send_mail(&self, mail: OutgoingMail) -> Result<(), TransportError> {
        let config = self.config.clone();
        let recipient = mail.to.clone();
        tokio::task::spawn_blocking(move || send_blocking(&config, mail))
            .await
            .map_err(|e| TransportError::SendFailed {
                recipient,
                reason: format!("send task failed: {e}"),
            })?
    }
}

/// Build the message and send it synchronously.
fn send_blocking(config: &SmtpConfig, mail: OutgoingMail) -> Result<(), TransportError> {
    let email = build_message(mail.clone())?;

    let creds = Credentials::new(
        config.username.clone(),
        config.password.expose_secret().to_string(),
    );

    let transport = SmtpTransport::relay(&config.host)
        .map_err(|e| TransportError::SendFailed {
            recipient: mail.to.clone(),
            reason: format!("SMTP relay error: {e}"),
        })?
        .port(config.port)
        .credentials(creds)
        .build();

    transport.send(&email).map_err(|e| TransportError::SendFailed {
        recipient: mail.to.clone(),
        reason: format!("SMTP send failed: {e}"),
    })?;

    tracing::debug!(to = %mail.to, "SMTP accepted notification");
    Ok(())
}

fn build_message(mail: OutgoingMail) -> Result<Message, TransportError> {
    Message::builder()
        .from(mail.from.parse().map_err(|e| TransportError::InvalidAddress {
            address: mail.from.clone(),
            reason: format!("{e}"),
        })?)
        .to(mail.to.parse().map_err(|e| TransportError::InvalidAddress {
            address: mail.to.clone(),
            reason: format!("{e}"),
        })?)
        .subject(mail.subject)
        .header(ContentType::TEXT_HTML)
        .body(mail.html)
        .map_err(|e| TransportError::SendFailed {
            recipient: mail.to,
            reason: format!("Failed to build email: {e}"),
        })
}
