/// Helpers shared by the endpoint handlers
use axum::body::Bytes;
use axum::http::HeaderMap;
use serde::de::DeserializeOwned;

use crate::context::ApiContext;
use crate::error::ApiError;

/// Parses a JSON request body regardless of its content type
pub fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("Request body is required".to_string()));
    }

    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))
}

/// First hop of `x-forwarded-for`, the client address behind the gateway
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Rejects the request unless the CAPTCHA token verifies
pub async fn require_captcha(
    ctx: &ApiContext,
    token: Option<&str>,
    headers: &HeaderMap,
) -> Result<(), ApiError> {
    let ip = client_ip(headers);
    ctx.captcha.verify(token, ip.as_deref()).await.into_result()?;
    Ok(())
}
