/// Queued email dispatch
use crate::error::VowsError;
use crate::models::MailMessage;
use crate::services::mail::MailSender;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent { reference: String },
    /// The payload can never be delivered; retrying would not help
    Rejected { reason: String },
}

pub struct MailDispatcher {
    mailer: Arc<dyn MailSender>,
}

impl MailDispatcher {
    pub fn new(mailer: Arc<dyn MailSender>) -> Self {
        Self { mailer }
    }

    /// Parses, validates and sends one queued message
    ///
    /// Malformed payloads come back as `Rejected`; transport failures are
    /// errors so the queue can redeliver.
    pub async fn dispatch(&self, body: &str) -> Result<DispatchOutcome, VowsError> {
        let message: MailMessage = match serde_json::from_str(body) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Dropping queued mail with malformed payload");
                return Ok(DispatchOutcome::Rejected {
                    reason: e.to_string(),
                });
            }
        };

        if let Err(e) = message.validate() {
            warn!(error = %e, "Dropping invalid queued mail");
            return Ok(DispatchOutcome::Rejected {
                reason: e.to_string(),
            });
        }

        match self.mailer.send(&message).await {
            Ok(reference) => {
                info!(recipients = message.to.len(), "Queued mail sent");
                Ok(DispatchOutcome::Sent { reference })
            }
            Err(VowsError::Validation(reason)) => {
                warn!(reason = %reason, "Dropping queued mail the transport cannot compose");
                Ok(DispatchOutcome::Rejected { reason })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mail::InMemoryMailSender;
    use serde_json::json;

    fn body(to: &str) -> String {
        json!({
            "from": "noreply@example.com",
            "to": [to],
            "subject": "Thank you",
            "text": "Thanks for coming!"
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_dispatch_sends_valid_mail() {
        let mailer = Arc::new(InMemoryMailSender::new());
        let dispatcher = MailDispatcher::new(mailer.clone());

        let outcome = dispatcher.dispatch(&body("guest@example.com")).await.unwrap();
        assert!(matches!(outcome, DispatchOutcome::Sent { .. }));
        assert_eq!(mailer.sent().await[0].subject, "Thank you");
    }

    #[tokio::test]
    async fn test_invalid_payloads_are_rejected() {
        let mailer = Arc::new(InMemoryMailSender::new());
        let dispatcher = MailDispatcher::new(mailer.clone());

        for payload in ["not json".to_string(), body("not-an-address"), json!({"to": []}).to_string()] {
            assert!(matches!(
                dispatcher.dispatch(&payload).await.unwrap(),
                DispatchOutcome::Rejected { .. }
            ));
        }
        assert!(mailer.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_error() {
        let dispatcher = MailDispatcher::new(Arc::new(
            InMemoryMailSender::new().failing_for("guest@example.com"),
        ));

        let result = dispatcher.dispatch(&body("guest@example.com")).await;
        assert!(matches!(result, Err(VowsError::Mail(_))));
    }
}
