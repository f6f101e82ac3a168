/// Comment-notification subscription models
use crate::constants::{ATTR_CREATED_AT, ATTR_EMAIL, ATTR_PHOTO_ID};
use crate::error::VowsError;
use crate::models::comment::format_timestamp;
use crate::models::item::{AttrValue, Item, required_s};
use crate::utils::{normalize_email, validate_photo_id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A guest subscribed to new comments on one photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub photo_id: String,
    /// Always lowercased
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Composite key `(photoId, email)`
    pub fn key(photo_id: &str, email: &str) -> Item {
        let mut key = Item::new();
        key.insert(ATTR_PHOTO_ID.to_string(), AttrValue::from(photo_id));
        key.insert(ATTR_EMAIL.to_string(), AttrValue::from(email));
        key
    }

    pub fn to_item(&self) -> Item {
        let mut item = Self::key(&self.photo_id, &self.email);
        if let Some(created_at) = &self.created_at {
            item.insert(ATTR_CREATED_AT.to_string(), AttrValue::S(format_timestamp(created_at)));
        }
        item
    }

    pub fn from_item(item: &Item) -> Result<Self, VowsError> {
        let created_at = item
            .get(ATTR_CREATED_AT)
            .and_then(AttrValue::as_s)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| ts.with_timezone(&Utc));

        Ok(Self {
            photo_id: required_s(item, ATTR_PHOTO_ID)?,
            email: required_s(item, ATTR_EMAIL)?,
            created_at,
        })
    }
}

/// Body of `POST /photos/{photoId}/subscriptions`
#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: String,
}

/// Validated `(photoId, email)` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionKey {
    pub photo_id: String,
    pub email: String,
}

impl SubscriptionKey {
    pub fn parse(photo_id: &str, email: &str) -> Result<Self, VowsError> {
        validate_photo_id(photo_id)?;
        Ok(Self {
            photo_id: photo_id.to_string(),
            email: normalize_email(email)?,
        })
    }
}

/// Result of an unsubscribe call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnsubscribeOutcome {
    /// Whether the pair existed before the delete
    pub existed: bool,
}
