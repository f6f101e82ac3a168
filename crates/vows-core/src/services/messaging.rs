/// Publish/subscribe messaging service
use crate::error::VowsError;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publishes a JSON message and returns the bus-assigned message id
    async fn publish(&self, topic: &str, message: &str) -> Result<String, VowsError>;
}

pub struct SnsPublisher {
    client: aws_sdk_sns::Client,
}

impl SnsPublisher {
    pub fn new(client: aws_sdk_sns::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessagePublisher for SnsPublisher {
    async fn publish(&self, topic: &str, message: &str) -> Result<String, VowsError> {
        let response = self
            .client
            .publish()
            .topic_arn(topic)
            .message(message)
            .send()
            .await
            .map_err(|e| VowsError::Messaging(format!("SNS publish failed: {}", e)))?;

        let message_id = response.message_id().unwrap_or_default().to_string();
        info!(topic = %topic, message_id = %message_id, "Published message");
        Ok(message_id)
    }
}

/// Records published messages in memory
#[derive(Default)]
pub struct InMemoryPublisher {
    published: tokio::sync::Mutex<Vec<(String, String)>>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(topic, message)` pairs in publish order
    pub async fn published(&self) -> Vec<(String, String)> {
        self.published.lock().await.clone()
    }
}

#[async_trait]
impl MessagePublisher for InMemoryPublisher {
    async fn publish(&self, topic: &str, message: &str) -> Result<String, VowsError> {
        let mut published = self.published.lock().await;
        published.push((topic.to_string(), message.to_string()));
        Ok(format!("local-{}", published.len()))
    }
}

/// Result of a best-effort publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published { message_id: String },
    /// Logged and dropped; the caller's request still succeeds
    Dropped { reason: String },
}

/// Publishes at most once without failing the caller
///
/// Used after a primary write has already succeeded: the write is the source
/// of truth and notification delivery is not guaranteed.
pub async fn publish_best_effort<T: Serialize>(
    publisher: &dyn MessagePublisher,
    topic: &str,
    payload: &T,
) -> PublishOutcome {
    let message = match serde_json::to_string(payload) {
        Ok(message) => message,
        Err(e) => {
            warn!(topic = %topic, error = %e, "Failed to serialize notification, dropping it");
            return PublishOutcome::Dropped {
                reason: e.to_string(),
            };
        }
    };

    match publisher.publish(topic, &message).await {
        Ok(message_id) => PublishOutcome::Published { message_id },
        Err(e) => {
            warn!(topic = %topic, error = %e, "Failed to publish notification, dropping it");
            PublishOutcome::Dropped {
                reason: e.to_string(),
            }
        }
    }
}
