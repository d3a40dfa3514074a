//! Email delivery via SMTP.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, warn};

use busway_core::config::EmailConfig;
use busway_core::error::{AppError, ErrorKind};
use busway_entity::notification::DeliveryChannel;

use super::{DeliveryReport, DeliveryTransport};

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(#[from] lettre::error::Error),
}

/// Sends plain-text notification emails through a STARTTLS relay.
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpTransport {
    /// Build the SMTP client. Requires `smtp_host` to be set.
    pub fn new(config: &EmailConfig) -> Result<Self, AppError> {
        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| AppError::configuration("notification.email.smtp_host is not set"))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::with_source(ErrorKind::Configuration, "Invalid SMTP relay", e))?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let from = config.from_address.parse::<Mailbox>().map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid from address", e)
        })?;

        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }

    async fn deliver(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        self.mailer.send(email).await?;
        Ok(())
    }
}

#[async_trait]
impl DeliveryTransport for SmtpTransport {
    fn channel(&self) -> DeliveryChannel {
        DeliveryChannel::Email
    }

    async fn send(&self, to: &str, title: &str, body: &str) -> DeliveryReport {
        match self.deliver(to, title, body).await {
            Ok(()) => {
                debug!(to, title, "Notification email sent");
                DeliveryReport::delivered()
            }
            Err(e) => {
                warn!(to, error = %e, "Notification email failed");
                DeliveryReport::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_host_is_a_configuration_error() {
        let err = SmtpTransport::new(&EmailConfig::default()).err().unwrap();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn email_error_display_address() {
        let addr_err: Result<lettre::Address, _> = "not-an-email".parse();
        let err = EmailError::Address(addr_err.unwrap_err());
        assert!(err.to_string().contains("Email address parse error"));
    }
}
