/// Worker context - services shared across invocations
use std::sync::Arc;
use vows_core::services::{
    DynamoDbStore, KeyValueStore, MailDispatcher, MailSender, NotificationService,
    build_mail_sender,
};
use vows_core::{SiteConfig, VowsError};

pub struct WorkerContext {
    pub notifications: NotificationService,
    pub dispatcher: MailDispatcher,
}

impl WorkerContext {
    /// Create the worker context with AWS-backed collaborators
    pub async fn new(config: &SiteConfig) -> Result<Arc<Self>, VowsError> {
        let aws_config = aws_config::load_from_env().await;

        let store: Arc<dyn KeyValueStore> =
            Arc::new(DynamoDbStore::new(aws_sdk_dynamodb::Client::new(&aws_config)));
        let mailer = build_mail_sender(&config.mail, &aws_config)?;

        Ok(Self::with_services(config, store, mailer))
    }

    pub fn with_services(
        config: &SiteConfig,
        store: Arc<dyn KeyValueStore>,
        mailer: Arc<dyn MailSender>,
    ) -> Arc<Self> {
        Arc::new(Self {
            notifications: NotificationService::new(store, mailer.clone(), config),
            dispatcher: MailDispatcher::new(mailer),
        })
    }
}
