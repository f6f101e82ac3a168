/// Input validation utilities
use crate::constants::{MAX_AUTHOR_NAME_LENGTH, MAX_EMAIL_ADDRESS_LENGTH};
use crate::error::VowsError;
use regex::Regex;

lazy_static::lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"
    ).unwrap();

    static ref AUTHOR_NAME_REGEX: Regex = Regex::new(
        r"^[\p{L}\p{M}0-9 .'\-]+$"
    ).unwrap();

    static ref PHOTO_ID_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9_.\-]{1,128}$"
    ).unwrap();
}

pub fn validate_email_address(email: &str) -> Result<(), VowsError> {
    if email.len() <= MAX_EMAIL_ADDRESS_LENGTH && EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(VowsError::Validation(format!(
            "Invalid email address: {}",
            email
        )))
    }
}

/// Trims and lowercases an address, then validates it
pub fn normalize_email(email: &str) -> Result<String, VowsError> {
    let normalized = email.trim().to_lowercase();
    validate_email_address(&normalized)?;
    Ok(normalized)
}

pub fn validate_photo_id(photo_id: &str) -> Result<(), VowsError> {
    if photo_id.trim().is_empty() {
        return Err(VowsError::Validation("photoId is required".to_string()));
    }

    if PHOTO_ID_REGEX.is_match(photo_id) {
        Ok(())
    } else {
        Err(VowsError::Validation(format!("Invalid photoId: {}", photo_id)))
    }
}

pub fn validate_author_name(name: &str) -> Result<(), VowsError> {
    let length = name.chars().count();

    if length == 0 {
        return Err(VowsError::Validation("authorName is required".to_string()));
    }

    if length > MAX_AUTHOR_NAME_LENGTH {
        return Err(VowsError::Validation(format!(
            "authorName must be at most {} characters",
            MAX_AUTHOR_NAME_LENGTH
        )));
    }

    if !AUTHOR_NAME_REGEX.is_match(name) {
        return Err(VowsError::Validation(
            "authorName contains unsupported characters".to_string(),
        ));
    }

    Ok(())
}

/// Checks a required text field is non-empty and within `max_chars`
pub fn validate_text_length(field: &str, text: &str, max_chars: usize) -> Result<(), VowsError> {
    let length = text.chars().count();

    if length == 0 {
        Err(VowsError::Validation(format!("{} is required", field)))
    } else if length > max_chars {
        Err(VowsError::Validation(format!(
            "{} must be at most {} characters (got {})",
            field, max_chars, length
        )))
    } else {
        Ok(())
    }
}
