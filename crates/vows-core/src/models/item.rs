/// Store value model
///
/// Items are flat maps of attribute name to scalar. The same shape is used for
/// the store's native continuation key, which is what the cursor codec carries.
use crate::error::VowsError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A scalar attribute value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AttrValue {
    S(String),
    /// Numbers travel as strings to keep precision
    N(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
}

impl AttrValue {
    pub fn as_s(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::S(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::S(value)
    }
}

/// A stored item: attribute name -> value
pub type Item = BTreeMap<String, AttrValue>;

/// The store's continuation key, opaque to everything but the store
pub type NativeKey = BTreeMap<String, AttrValue>;

/// Reads a required string attribute from an item
pub fn required_s(item: &Item, attr: &str) -> Result<String, VowsError> {
    item.get(attr)
        .and_then(AttrValue::as_s)
        .map(str::to_string)
        .ok_or_else(|| VowsError::Serialization(format!("Item is missing string attribute '{}'", attr)))
}
