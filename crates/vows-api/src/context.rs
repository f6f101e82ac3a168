/// API Context - shared state for all API handlers
use lambda_http::Error;
use std::sync::Arc;
use vows_core::SiteConfig;
use vows_core::services::{
    CaptchaVerifier, CommentService, ContactService, DynamoDbStore, KeyValueStore, MailSender,
    MessagePublisher, SnsPublisher, SubscriptionService, build_captcha_verifier, build_mail_sender,
};

/// API Context contains the configuration and the services built from it
pub struct ApiContext {
    pub config: SiteConfig,
    pub comments: CommentService,
    pub subscriptions: SubscriptionService,
    pub contact: ContactService,
    pub captcha: Arc<dyn CaptchaVerifier>,
}

impl ApiContext {
    /// Create the API context with AWS-backed collaborators
    pub async fn new(config: SiteConfig) -> Result<Arc<Self>, Error> {
        // Load AWS config
        let aws_config = aws_config::load_from_env().await;

        let store: Arc<dyn KeyValueStore> =
            Arc::new(DynamoDbStore::new(aws_sdk_dynamodb::Client::new(&aws_config)));
        let publisher: Arc<dyn MessagePublisher> =
            Arc::new(SnsPublisher::new(aws_sdk_sns::Client::new(&aws_config)));
        let mailer = build_mail_sender(&config.mail, &aws_config)?;
        let captcha = build_captcha_verifier(&config.captcha)?;

        Ok(Self::with_services(config, store, publisher, mailer, captcha))
    }

    /// Create the API context from explicit collaborators
    pub fn with_services(
        config: SiteConfig,
        store: Arc<dyn KeyValueStore>,
        publisher: Arc<dyn MessagePublisher>,
        mailer: Arc<dyn MailSender>,
        captcha: Arc<dyn CaptchaVerifier>,
    ) -> Arc<Self> {
        Arc::new(Self {
            comments: CommentService::new(store.clone(), publisher, &config),
            subscriptions: SubscriptionService::new(store, config.tables.subscriptions.as_str()),
            contact: ContactService::new(mailer, &config.mail),
            captcha,
            config,
        })
    }
}
