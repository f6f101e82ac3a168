/// Mail transport service: SMTP or SES, both composed with lettre
use crate::config::{MailConfig, MailTransport, SmtpConfig};
use crate::error::VowsError;
use crate::models::MailMessage;
use async_trait::async_trait;
use lettre::message::{Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

#[async_trait]
pub trait MailSender: Send + Sync {
    /// Sends one message; returns the transport's message reference
    async fn send(&self, message: &MailMessage) -> Result<String, VowsError>;
}

fn to_mailbox(address: &str) -> Result<Mailbox, VowsError> {
    address
        .parse()
        .map_err(|e| VowsError::Validation(format!("Invalid email address '{}': {}", address, e)))
}

/// Builds the RFC 5322 message for a mail request
pub fn compose(message: &MailMessage) -> Result<Message, VowsError> {
    let mut builder = Message::builder()
        .from(to_mailbox(&message.from)?)
        .subject(&message.subject);

    for to in &message.to {
        builder = builder.to(to_mailbox(to)?);
    }

    if let Some(reply_to) = &message.reply_to {
        builder = builder.reply_to(to_mailbox(reply_to)?);
    }

    let built = match (&message.text, &message.html) {
        (Some(text), Some(html)) => {
            builder.multipart(MultiPart::alternative_plain_html(text.clone(), html.clone()))
        }
        (Some(text), None) => builder.singlepart(SinglePart::plain(text.clone())),
        (None, Some(html)) => builder.singlepart(SinglePart::html(html.clone())),
        (None, None) => {
            return Err(VowsError::Validation(
                "Email must have text or HTML body".to_string(),
            ));
        }
    };

    built.map_err(|e| VowsError::Mail(format!("Failed to build email: {}", e)))
}

pub struct SmtpMailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailSender {
    pub fn new(config: &SmtpConfig) -> Result<Self, VowsError> {
        let invalid = |e: lettre::transport::smtp::Error| {
            VowsError::Config(format!("Invalid SMTP relay '{}': {}", config.host, e))
        };

        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host).map_err(invalid)?
        } else {
            // STARTTLS when the relay offers it, plain text otherwise
            let tls = TlsParameters::new(config.host.clone()).map_err(invalid)?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.host.as_str())
                .tls(Tls::Opportunistic(tls))
        }
        .port(config.port);

        let builder = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl MailSender for SmtpMailSender {
    async fn send(&self, message: &MailMessage) -> Result<String, VowsError> {
        let email = compose(message)?;

        let response = self
            .transport
            .send(email)
            .await
            .map_err(|e| VowsError::Mail(format!("SMTP send failed: {}", e)))?;

        let reference = response.message().collect::<Vec<_>>().join(" ");
        info!(recipients = message.to.len(), "Sent email via SMTP");
        Ok(reference)
    }
}

pub struct SesMailSender {
    client: aws_sdk_ses::Client,
}

impl SesMailSender {
    pub fn new(client: aws_sdk_ses::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MailSender for SesMailSender {
    async fn send(&self, message: &MailMessage) -> Result<String, VowsError> {
        use aws_sdk_ses::primitives::Blob;

        let raw = compose(message)?.formatted();

        let raw_message = aws_sdk_ses::types::RawMessage::builder()
            .data(Blob::new(raw))
            .build()
            .map_err(|e| VowsError::Mail(format!("Failed to build raw message: {}", e)))?;

        let response = self
            .client
            .send_raw_email()
            .raw_message(raw_message)
            .source(&message.from)
            .set_destinations(Some(message.to.clone()))
            .send()
            .await
            .map_err(|e| VowsError::Mail(format!("SES send_raw_email failed: {}", e)))?;

        info!(message_id = %response.message_id, recipients = message.to.len(), "Sent email via SES");
        Ok(response.message_id)
    }
}

/// Captures sent mail in memory; can be told to fail for given recipients
#[derive(Default)]
pub struct InMemoryMailSender {
    sent: tokio::sync::Mutex<Vec<MailMessage>>,
    failing: HashSet<String>,
}

impl InMemoryMailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send addressed to `address` fails with a mail error
    pub fn failing_for(mut self, address: &str) -> Self {
        self.failing.insert(address.to_ascii_lowercase());
        self
    }

    pub async fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl MailSender for InMemoryMailSender {
    async fn send(&self, message: &MailMessage) -> Result<String, VowsError> {
        if let Some(to) = message
            .to
            .iter()
            .find(|to| self.failing.contains(&to.to_ascii_lowercase()))
        {
            return Err(VowsError::Mail(format!("Mailbox unavailable: {}", to)));
        }

        // Same composition path as the real transports
        compose(message)?;

        let mut sent = self.sent.lock().await;
        sent.push(message.clone());
        Ok(format!("local-{}", sent.len()))
    }
}

/// Builds the configured mail transport
pub fn build_mail_sender(
    config: &MailConfig,
    aws_config: &aws_config::SdkConfig,
) -> Result<Arc<dyn MailSender>, VowsError> {
    match &config.transport {
        MailTransport::Smtp(smtp) => Ok(Arc::new(SmtpMailSender::new(smtp)?)),
        MailTransport::Ses => Ok(Arc::new(SesMailSender::new(aws_sdk_ses::Client::new(
            aws_config,
        )))),
    }
}
