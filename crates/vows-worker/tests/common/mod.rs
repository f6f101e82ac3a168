//! Common test utilities for the worker integration tests
#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use lambda_runtime::{Context, LambdaEvent};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use vows_core::SiteConfig;
use vows_core::constants::ATTR_SORT_KEY;
use vows_core::models::{Comment, SubscriptionKey};
use vows_core::services::store::KeyValueStore;
use vows_core::services::{InMemoryMailSender, InMemoryStore, SubscriptionService};
use vows_worker::WorkerContext;

pub fn test_config() -> SiteConfig {
    let env = HashMap::from([
        ("COMMENTS_TABLE", "wedding-comments"),
        ("SUBSCRIPTIONS_TABLE", "wedding-subscriptions"),
        ("SMTP_HOST", "smtp.example.com"),
        ("MAIL_FROM", "noreply@example.com"),
        ("CONTACT_RECIPIENT", "couple@example.com"),
        ("COMMENT_TOPIC_ARN", "arn:aws:sns:us-east-1:123:comments"),
        ("SITE_BASE_URL", "https://wedding.example.com"),
        ("API_BASE_URL", "https://api.wedding.example.com"),
    ]);
    SiteConfig::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap()
}

/// Worker context over in-memory collaborators
pub struct TestWorker {
    pub ctx: Arc<WorkerContext>,
    pub config: SiteConfig,
    pub store: Arc<InMemoryStore>,
    pub mailer: Arc<InMemoryMailSender>,
}

impl TestWorker {
    pub fn new() -> Self {
        Self::with_mailer(InMemoryMailSender::new())
    }

    pub fn with_mailer(mailer: InMemoryMailSender) -> Self {
        let config = test_config();
        let store = Arc::new(InMemoryStore::for_site(&config.tables));
        let mailer = Arc::new(mailer);
        let ctx = WorkerContext::with_services(&config, store.clone(), mailer.clone());

        Self {
            ctx,
            config,
            store,
            mailer,
        }
    }

    /// Stores a comment directly, bypassing the publish step
    pub async fn seed_comment(&self, photo_id: &str, comment_id: &str) -> Comment {
        let comment = Comment {
            photo_id: photo_id.to_string(),
            comment_id: comment_id.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 18, 30, 0).unwrap(),
            author_name: "Aunt May".to_string(),
            content: "What a day!".to_string(),
        };
        self.store
            .put_if_absent(&self.config.tables.comments, comment.to_item(), ATTR_SORT_KEY)
            .await
            .unwrap();
        comment
    }

    pub async fn subscribe(&self, photo_id: &str, email: &str) {
        let subscriptions = SubscriptionService::new(
            self.store.clone(),
            self.config.tables.subscriptions.as_str(),
        );
        subscriptions
            .subscribe(SubscriptionKey::parse(photo_id, email).unwrap())
            .await
            .unwrap();
    }

    pub async fn invoke(&self, payload: Value) -> Result<Value, lambda_runtime::Error> {
        let event = LambdaEvent::new(payload, Context::default());
        vows_worker::handler(self.ctx.clone(), event).await
    }
}

pub fn comment_created(photo_id: &str, comment_id: &str) -> String {
    json!({"photoId": photo_id, "commentId": comment_id}).to_string()
}

pub fn mail_body(to: &str) -> String {
    json!({
        "from": "noreply@example.com",
        "to": [to],
        "subject": "Thank you for coming",
        "text": "It meant the world to us."
    })
    .to_string()
}

pub fn sns_event(messages: &[&str]) -> Value {
    let records: Vec<Value> = messages
        .iter()
        .enumerate()
        .map(|(i, message)| {
            json!({
                "EventSource": "aws:sns",
                "EventVersion": "1.0",
                "Sns": {
                    "Type": "Notification",
                    "MessageId": format!("sns-{}", i + 1),
                    "TopicArn": "arn:aws:sns:us-east-1:123:comments",
                    "Message": message,
                    "Timestamp": "2024-06-01T18:30:00.000Z"
                }
            })
        })
        .collect();
    json!({ "Records": records })
}

pub fn sqs_event(bodies: &[&str]) -> Value {
    let records: Vec<Value> = bodies
        .iter()
        .enumerate()
        .map(|(i, body)| {
            json!({
                "messageId": format!("sqs-{}", i + 1),
                "receiptHandle": format!("rh-{}", i + 1),
                "body": body,
                "attributes": {"ApproximateReceiveCount": "1"},
                "eventSource": "aws:sqs",
                "eventSourceARN": "arn:aws:sqs:us-east-1:123:mail"
            })
        })
        .collect();
    json!({ "Records": records })
}
