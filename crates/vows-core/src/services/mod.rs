/// Collaborator traits, their implementations, and the domain services
pub mod captcha;
pub mod comments;
pub mod contact;
pub mod dispatch;
pub mod mail;
pub mod messaging;
pub mod notifications;
pub mod store;
pub mod subscriptions;

pub use captcha::{CaptchaDecision, CaptchaVerifier, DisabledCaptcha, RecaptchaVerifier, build_captcha_verifier};
pub use comments::CommentService;
pub use contact::ContactService;
pub use dispatch::{DispatchOutcome, MailDispatcher};
pub use mail::{InMemoryMailSender, MailSender, SesMailSender, SmtpMailSender, build_mail_sender};
pub use messaging::{InMemoryPublisher, MessagePublisher, PublishOutcome, SnsPublisher};
pub use notifications::{NotificationReport, NotificationService};
pub use store::{DynamoDbStore, InMemoryStore, KeyValueStore};
pub use subscriptions::SubscriptionService;
