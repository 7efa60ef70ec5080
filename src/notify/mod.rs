//! # Notification Sinks
//!
//! Delivery of a rendered report to the configured recipient list.
//!
//! - [`SmtpNotificationSink`] sends one message over an implicit-TLS SMTP relay
//!   with the report attached as `application/pdf`.
//! - [`DisabledNotificationSink`] logs and succeeds; selected when
//!   `mail.enabled = false`.
//!
//! The transport is built once and reused for every run. Delivery is attempted
//! exactly once per run; a failure is reported to the coordinator and never
//! retried.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::MailConfig;
use crate::constants;
use crate::error::DeliveryError;

/// Outbound delivery of a rendered report
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Send `attachment` to every address in `recipients`
    async fn send(&self, attachment: &Path, recipients: &[String]) -> Result<(), DeliveryError>;

    fn name(&self) -> &'static str;
}

/// Pick the sink for a mail configuration
pub fn from_config(config: &MailConfig) -> Result<Arc<dyn NotificationSink>, DeliveryError> {
    if config.enabled {
        Ok(Arc::new(SmtpNotificationSink::new(config)?))
    } else {
        info!("📭 MAIL: Delivery disabled by configuration");
        Ok(Arc::new(DisabledNotificationSink))
    }
}

/// SMTP delivery through `lettre`
pub struct SmtpNotificationSink {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    timeout_override: Option<Duration>,
    from: String,
    subject: String,
    body: String,
}

impl std::fmt::Debug for SmtpNotificationSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotificationSink")
            .field("from", &self.from)
            .field("subject", &self.subject)
            .field("timeout_override", &self.timeout_override)
            .finish_non_exhaustive()
    }
}

impl SmtpNotificationSink {
    pub fn new(config: &MailConfig) -> Result<Self, DeliveryError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| DeliveryError::Transport {
                message: e.to_string(),
            })?
            .port(config.smtp_port);

        // Passing `None` would remove the relay's own timeout, so only override when set
        let timeout_override = config.timeout();
        if let Some(timeout) = timeout_override {
            builder = builder.timeout(Some(timeout));
        }

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        debug!(
            host = %config.smtp_host,
            port = config.smtp_port,
            authenticated = !config.username.is_empty(),
            timeout_override = ?timeout_override,
            "SMTP transport configured"
        );

        Ok(Self {
            mailer: builder.build(),
            timeout_override,
            from: config.from.clone(),
            subject: config.subject.clone(),
            body: config.body.clone(),
        })
    }

    /// Timeout set on the transport, or `None` when the relay default is kept
    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout_override
    }

    /// Assemble the message without touching the network
    pub fn build_message(
        &self,
        attachment_name: &str,
        attachment: Vec<u8>,
        recipients: &[String],
    ) -> Result<Message, DeliveryError> {
        if recipients.is_empty() {
            return Err(DeliveryError::NoRecipients);
        }

        let mut builder = Message::builder()
            .from(parse_mailbox(&self.from)?)
            .subject(self.subject.clone());
        for recipient in recipients {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        let content_type = ContentType::parse(constants::mail::ATTACHMENT_CONTENT_TYPE)
            .map_err(|e| DeliveryError::MessageBuild {
                message: e.to_string(),
            })?;

        builder
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(self.body.clone()))
                    .singlepart(
                        Attachment::new(attachment_name.to_string()).body(attachment, content_type),
                    ),
            )
            .map_err(|e| DeliveryError::MessageBuild {
                message: e.to_string(),
            })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| DeliveryError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

fn attachment_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| {
            format!(
                "{}.{}",
                constants::report::DEFAULT_FILE_PREFIX,
                constants::report::FILE_EXTENSION
            )
        })
}

#[async_trait]
impl NotificationSink for SmtpNotificationSink {
    async fn send(&self, attachment: &Path, recipients: &[String]) -> Result<(), DeliveryError> {
        let bytes = tokio::fs::read(attachment)
            .await
            .map_err(|source| DeliveryError::Attachment {
                path: attachment.to_path_buf(),
                source,
            })?;

        let message = self.build_message(&attachment_name(attachment), bytes, recipients)?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| DeliveryError::Transport {
                message: e.to_string(),
            })?;

        info!(
            recipients = recipients.len(),
            attachment = %attachment.display(),
            "📧 Report emailed"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

/// No-op sink for environments without mail
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotificationSink;

#[async_trait]
impl NotificationSink for DisabledNotificationSink {
    async fn send(&self, attachment: &Path, recipients: &[String]) -> Result<(), DeliveryError> {
        info!(
            recipients = recipients.len(),
            attachment = %attachment.display(),
            "📭 Mail disabled, skipping delivery"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
