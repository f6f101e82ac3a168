/// New-comment notifications for photo subscribers
use crate::config::{SiteConfig, TableConfig};
use crate::error::VowsError;
use crate::models::{Comment, CommentCreated, MailMessage};
use crate::services::comments::find_comment;
use crate::services::mail::MailSender;
use crate::services::store::KeyValueStore;
use crate::services::subscriptions::SubscriptionService;
use crate::utils::redact_email;
use std::sync::Arc;
use tracing::{info, warn};

/// What happened to one `CommentCreated` event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationReport {
    pub comment_found: bool,
    pub sent: usize,
    pub failed: usize,
}

pub struct NotificationService {
    store: Arc<dyn KeyValueStore>,
    subscriptions: SubscriptionService,
    mailer: Arc<dyn MailSender>,
    tables: TableConfig,
    from: String,
    api_base_url: String,
}

impl NotificationService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        mailer: Arc<dyn MailSender>,
        config: &SiteConfig,
    ) -> Self {
        Self {
            subscriptions: SubscriptionService::new(store.clone(), config.tables.subscriptions.as_str()),
            store,
            mailer,
            tables: config.tables.clone(),
            from: config.mail.from.clone(),
            api_base_url: config.api_base_url.clone(),
        }
    }

    /// Mails every subscriber of the photo. Only store failures are errors;
    /// a failed recipient is logged and the fan-out continues.
    pub async fn notify(&self, event: &CommentCreated) -> Result<NotificationReport, VowsError> {
        let Some(comment) = find_comment(self.store.as_ref(), &self.tables, &event.comment_id).await?
        else {
            warn!(
                photo_id = %event.photo_id,
                comment_id = %event.comment_id,
                "Comment not found, skipping notification"
            );
            return Ok(NotificationReport::default());
        };

        let subscribers = self.subscriptions.subscribers_for(&comment.photo_id).await?;
        let mut report = NotificationReport {
            comment_found: true,
            ..Default::default()
        };

        for subscriber in &subscribers {
            let message = self.compose(&comment, &subscriber.email)?;
            match self.mailer.send(&message).await {
                Ok(_) => report.sent += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        comment_id = %comment.comment_id,
                        recipient = %redact_email(&subscriber.email),
                        error = %e,
                        "Failed to notify subscriber"
                    );
                }
            }
        }

        info!(
            photo_id = %comment.photo_id,
            comment_id = %comment.comment_id,
            sent = report.sent,
            failed = report.failed,
            "Subscribers notified"
        );

        Ok(report)
    }

    fn compose(&self, comment: &Comment, email: &str) -> Result<MailMessage, VowsError> {
        let unsubscribe = unsubscribe_link(&self.api_base_url, &comment.photo_id, email)?;

        let text = format!(
            "{} commented on a photo you follow:\n\n{}\n\nStop these emails: {}\n",
            comment.author_name, comment.content, unsubscribe
        );

        Ok(MailMessage::builder()
            .from(self.from.as_str())
            .to(vec![email.to_string()])
            .subject(format!("New comment from {}", comment.author_name))
            .text(text)
            .build())
    }
}

/// `{apiBaseUrl}/photos/{photoId}/subscriptions/{email}` with encoded segments
pub fn unsubscribe_link(api_base_url: &str, photo_id: &str, email: &str) -> Result<String, VowsError> {
    let mut url = url::Url::parse(api_base_url)
        .map_err(|e| VowsError::Config(format!("Invalid API_BASE_URL '{}': {}", api_base_url, e)))?;

    url.path_segments_mut()
        .map_err(|_| VowsError::Config(format!("API_BASE_URL cannot be a base: {}", api_base_url)))?
        .pop_if_empty()
        .extend(["photos", photo_id, "subscriptions", email]);

    Ok(url.to_string())
}
