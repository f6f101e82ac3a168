/// API endpoint modules
pub mod captcha;
pub mod comments;
pub mod common;
pub mod contact;
pub mod health;
pub mod subscriptions;
