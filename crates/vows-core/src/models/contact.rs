/// Contact form models
use crate::constants::{MAX_CONTACT_MESSAGE_LENGTH, MAX_CONTACT_NAME_LENGTH};
use crate::error::VowsError;
use crate::utils::{clean_user_text, normalize_email, validate_text_length};
use serde::Deserialize;

/// Body of `POST /contact`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub recaptcha_token: Option<String>,
}

/// A contact message that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
    pub phone: Option<String>,
}

impl ContactRequest {
    pub fn validate(&self) -> Result<ContactMessage, VowsError> {
        let name = clean_user_text(&self.name);
        validate_text_length("name", &name, MAX_CONTACT_NAME_LENGTH)?;

        let email = normalize_email(&self.email)?;

        let message = clean_user_text(&self.message);
        validate_text_length("message", &message, MAX_CONTACT_MESSAGE_LENGTH)?;

        let phone = self
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| {
                if p.chars().all(|c| c.is_ascii_digit() || " +-().".contains(c)) && p.len() <= 32 {
                    Ok(p.to_string())
                } else {
                    Err(VowsError::Validation(format!("Invalid phone number: {}", p)))
                }
            })
            .transpose()?;

        Ok(ContactMessage {
            name,
            email,
            message,
            phone,
        })
    }
}

impl ContactMessage {
    /// Plain-text body of the mail sent to the site owner
    pub fn render_text(&self) -> String {
        let mut body = format!("From: {} <{}>\n", self.name, self.email);
        if let Some(phone) = &self.phone {
            body.push_str(&format!("Phone: {}\n", phone));
        }
        body.push('\n');
        body.push_str(&self.message);
        body.push('\n');
        body
    }
}
