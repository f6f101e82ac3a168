/// Contact form delivery
use crate::config::MailConfig;
use crate::error::VowsError;
use crate::models::{ContactMessage, MailMessage};
use crate::services::mail::MailSender;
use crate::utils::email_domain;
use std::sync::Arc;
use tracing::info;

pub struct ContactService {
    mailer: Arc<dyn MailSender>,
    from: String,
    recipient: String,
}

impl ContactService {
    pub fn new(mailer: Arc<dyn MailSender>, config: &MailConfig) -> Self {
        Self {
            mailer,
            from: config.from.clone(),
            recipient: config.contact_recipient.clone(),
        }
    }

    /// Mails the message to the site owner with `Reply-To` set to the sender
    pub async fn send(&self, message: &ContactMessage) -> Result<String, VowsError> {
        let mail = MailMessage::builder()
            .from(self.from.as_str())
            .to(vec![self.recipient.clone()])
            .reply_to(message.email.as_str())
            .subject(format!("Wedding site message from {}", message.name))
            .text(message.render_text())
            .build();

        let reference = self.mailer.send(&mail).await?;
        info!(sender_domain = %email_domain(&message.email), "Contact message sent");
        Ok(reference)
    }
}
