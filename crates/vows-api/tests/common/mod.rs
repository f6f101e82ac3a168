//! Common test utilities for the API integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;
use vows_api::ApiContext;
use vows_core::SiteConfig;
use vows_core::services::{
    CaptchaDecision, CaptchaVerifier, DisabledCaptcha, InMemoryMailSender, InMemoryPublisher,
    InMemoryStore,
};

/// Answers every verification with the same decision
pub struct FixedCaptcha(pub CaptchaDecision);

#[async_trait]
impl CaptchaVerifier for FixedCaptcha {
    async fn verify(&self, token: Option<&str>, _remote_ip: Option<&str>) -> CaptchaDecision {
        match token {
            None => CaptchaDecision::Invalid {
                reason: "missing-input-response".to_string(),
            },
            Some(_) => self.0.clone(),
        }
    }
}

pub fn test_config() -> SiteConfig {
    let env = HashMap::from([
        ("COMMENTS_TABLE", "wedding-comments"),
        ("SUBSCRIPTIONS_TABLE", "wedding-subscriptions"),
        ("SMTP_HOST", "smtp.example.com"),
        ("MAIL_FROM", "noreply@example.com"),
        ("CONTACT_RECIPIENT", "couple@example.com"),
        ("COMMENT_TOPIC_ARN", "arn:aws:sns:us-east-1:123:comments"),
        ("SITE_BASE_URL", "https://wedding.example.com"),
        ("DEFAULT_PAGE_SIZE", "2"),
    ]);
    SiteConfig::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap()
}

/// In-memory collaborators behind a router
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub publisher: Arc<InMemoryPublisher>,
    pub mailer: Arc<InMemoryMailSender>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_captcha(Arc::new(DisabledCaptcha))
    }

    pub fn with_captcha(captcha: Arc<dyn CaptchaVerifier>) -> Self {
        Self::build(captcha, InMemoryMailSender::new())
    }

    pub fn with_mailer(mailer: InMemoryMailSender) -> Self {
        Self::build(Arc::new(DisabledCaptcha), mailer)
    }

    fn build(captcha: Arc<dyn CaptchaVerifier>, mailer: InMemoryMailSender) -> Self {
        let config = test_config();
        let store = Arc::new(InMemoryStore::for_site(&config.tables));
        let publisher = Arc::new(InMemoryPublisher::new());
        let mailer = Arc::new(mailer);

        let ctx = ApiContext::with_services(
            config,
            store.clone(),
            publisher.clone(),
            mailer.clone(),
            captcha,
        );

        Self {
            router: vows_api::build_router(ctx),
            store,
            publisher,
            mailer,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            json,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(request(Method::GET, uri, None)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(request(Method::POST, uri, Some(body))).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(request(Method::DELETE, uri, None)).await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub json: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn error_code(&self) -> &str {
        self.json["errorCode"].as_str().unwrap_or_default()
    }
}

pub fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
