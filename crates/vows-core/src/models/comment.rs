/// Photo comment models
use crate::constants::{
    ATTR_AUTHOR_NAME, ATTR_COMMENT_ID, ATTR_CONTENT, ATTR_CREATED_AT, ATTR_PHOTO_ID,
    ATTR_SORT_KEY, MAX_COMMENT_LENGTH, SORT_KEY_SEPARATOR,
};
use crate::error::VowsError;
use crate::models::item::{AttrValue, Item, required_s};
use crate::utils::{clean_user_text, validate_author_name, validate_text_length};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A stored comment on a photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub photo_id: String,
    pub comment_id: String,
    pub created_at: DateTime<Utc>,
    pub author_name: String,
    pub content: String,
}

impl Comment {
    /// Ordering key within the photo partition: `createdAt#commentId`
    ///
    /// Timestamps are fixed-width RFC 3339 with milliseconds so lexicographic
    /// order equals chronological order; the id suffix breaks ties.
    pub fn sort_key(&self) -> String {
        format!(
            "{}{}{}",
            format_timestamp(&self.created_at),
            SORT_KEY_SEPARATOR,
            self.comment_id
        )
    }

    pub fn to_item(&self) -> Item {
        let mut item = Item::new();
        item.insert(ATTR_PHOTO_ID.to_string(), AttrValue::from(self.photo_id.as_str()));
        item.insert(ATTR_SORT_KEY.to_string(), AttrValue::S(self.sort_key()));
        item.insert(ATTR_COMMENT_ID.to_string(), AttrValue::from(self.comment_id.as_str()));
        item.insert(
            ATTR_CREATED_AT.to_string(),
            AttrValue::S(format_timestamp(&self.created_at)),
        );
        item.insert(ATTR_AUTHOR_NAME.to_string(), AttrValue::from(self.author_name.as_str()));
        item.insert(ATTR_CONTENT.to_string(), AttrValue::from(self.content.as_str()));
        item
    }

    pub fn from_item(item: &Item) -> Result<Self, VowsError> {
        let created_at = required_s(item, ATTR_CREATED_AT)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| VowsError::Serialization(format!("Invalid createdAt '{}': {}", created_at, e)))?
            .with_timezone(&Utc);

        Ok(Self {
            photo_id: required_s(item, ATTR_PHOTO_ID)?,
            comment_id: required_s(item, ATTR_COMMENT_ID)?,
            created_at,
            author_name: required_s(item, ATTR_AUTHOR_NAME)?,
            content: required_s(item, ATTR_CONTENT)?,
        })
    }
}

/// ISO-8601 UTC with millisecond precision and a `Z` suffix
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Body of `POST /photos/{photoId}/comments`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub recaptcha_token: Option<String>,
}

/// A comment that passed validation, ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub photo_id: String,
    pub author_name: String,
    pub content: String,
}

impl CreateCommentRequest {
    pub fn validate(&self, photo_id: &str) -> Result<NewComment, VowsError> {
        crate::utils::validate_photo_id(photo_id)?;

        let author_name = self.author_name.trim().to_string();
        validate_author_name(&author_name)?;

        let content = clean_user_text(&self.content);
        validate_text_length("content", &content, MAX_COMMENT_LENGTH)?;

        Ok(NewComment {
            photo_id: photo_id.to_string(),
            author_name,
            content,
        })
    }
}
