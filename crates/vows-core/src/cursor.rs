/// Opaque pagination cursors
///
/// A cursor is the store's continuation key serialized to JSON and base64
/// encoded with the URL-safe alphabet, so it can travel in a query string.
/// The codec never interprets the key's contents.
use crate::models::NativeKey;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tracing::warn;

/// Encodes a continuation key; `None` when there is no key
pub fn encode(key: Option<&NativeKey>) -> Option<String> {
    let key = key.filter(|k| !k.is_empty())?;

    match serde_json::to_vec(key) {
        Ok(json) => Some(URL_SAFE_NO_PAD.encode(json)),
        Err(e) => {
            // Only possible for non-string map keys, which NativeKey cannot hold
            warn!(error = %e, "Failed to serialize continuation key");
            None
        }
    }
}

/// Decodes a cursor back into a continuation key
///
/// Absent, empty, or malformed cursors all decode to `None`, which callers
/// treat as "start from the beginning". A corrupted cursor never fails the
/// request.
pub fn decode(cursor: Option<&str>) -> Option<NativeKey> {
    let cursor = cursor.map(str::trim).filter(|c| !c.is_empty())?;

    let bytes = match URL_SAFE_NO_PAD.decode(cursor.trim_end_matches('=')) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Ignoring cursor that is not valid base64");
            return None;
        }
    };

    match serde_json::from_slice::<NativeKey>(&bytes) {
        Ok(key) if !key.is_empty() => Some(key),
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, "Ignoring cursor that is not a continuation key");
            None
        }
    }
}
