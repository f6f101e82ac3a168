/// Outgoing mail message
use crate::error::VowsError;
use crate::utils::validate_email_address;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// A message handed to the mail collaborator
///
/// Also the payload of the email-dispatch queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct MailMessage {
    #[builder(setter(into))]
    pub from: String,
    pub to: Vec<String>,
    #[builder(default, setter(strip_option, into))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[builder(setter(into))]
    pub subject: String,
    #[builder(default, setter(strip_option, into))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[builder(default, setter(strip_option, into))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl MailMessage {
    pub fn validate(&self) -> Result<(), VowsError> {
        if self.to.is_empty() {
            return Err(VowsError::Validation(
                "At least one recipient required".to_string(),
            ));
        }

        if self.subject.trim().is_empty() {
            return Err(VowsError::Validation("Subject required".to_string()));
        }

        if self.text.is_none() && self.html.is_none() {
            return Err(VowsError::Validation(
                "Email must have text or HTML body".to_string(),
            ));
        }

        validate_email_address(&self.from)?;
        for to in &self.to {
            validate_email_address(to)?;
        }
        if let Some(reply_to) = &self.reply_to {
            validate_email_address(reply_to)?;
        }

        Ok(())
    }
}
