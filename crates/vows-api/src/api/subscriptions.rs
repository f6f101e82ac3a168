/// Comment-notification subscription endpoints
use axum::{
    body::Bytes,
    extract::{Path, State},
};
use std::sync::Arc;
use tracing::warn;
use vows_core::Envelope;
use vows_core::models::{SubscribeRequest, SubscriptionKey};
use vows_core::utils::redact_email;

use crate::api::common::parse_json;
use crate::context::ApiContext;
use crate::error::{ApiError, ApiResponse};
use crate::middleware::Correlation;

/// `POST /photos/{photoId}/subscriptions`
pub async fn subscribe(
    State(ctx): State<Arc<ApiContext>>,
    Correlation(ids): Correlation,
    Path(photo_id): Path<String>,
    body: Bytes,
) -> Result<ApiResponse, ApiError> {
    let request: SubscribeRequest = parse_json(&body)?;
    let key = SubscriptionKey::parse(&photo_id, &request.email)?;

    let subscription = ctx.subscriptions.subscribe(key).await?;

    Ok(ApiResponse(Envelope::success(201, &subscription, Some(&ids))))
}

/// `DELETE /photos/{photoId}/subscriptions/{email}`
///
/// Always succeeds for a well-formed pair; `existed` tells whether it was there.
pub async fn unsubscribe(
    State(ctx): State<Arc<ApiContext>>,
    Correlation(ids): Correlation,
    Path((photo_id, email)): Path<(String, String)>,
) -> Result<ApiResponse, ApiError> {
    let key = SubscriptionKey::parse(&photo_id, &email)?;

    let outcome = ctx.subscriptions.unsubscribe(&key).await?;

    Ok(ApiResponse(Envelope::success(200, &outcome, Some(&ids))))
}

/// `GET /photos/{photoId}/subscriptions/{email}`, the link in notification mail
///
/// Reached by a browser, so every outcome is a redirect to the site.
pub async fn unsubscribe_link(
    State(ctx): State<Arc<ApiContext>>,
    Correlation(ids): Correlation,
    Path((photo_id, email)): Path<(String, String)>,
) -> ApiResponse {
    let result = match SubscriptionKey::parse(&photo_id, &email) {
        Ok(key) => ctx.subscriptions.unsubscribe(&key).await.map(|_| key),
        Err(e) => Err(e),
    };

    let location = match result {
        Ok(key) => unsubscribed_page(&ctx.config.site_base_url, &[("photoId", key.photo_id.as_str())]),
        Err(e) => {
            warn!(
                photo_id = %photo_id,
                email = %redact_email(&email),
                error = %e,
                "Unsubscribe link failed"
            );
            unsubscribed_page(&ctx.config.site_base_url, &[("error", "true")])
        }
    };

    ApiResponse(Envelope::redirect(&location, Some(&ids)))
}

fn unsubscribed_page(site_base_url: &str, params: &[(&str, &str)]) -> String {
    let base = format!("{}/unsubscribed", site_base_url.trim_end_matches('/'));
    match url::Url::parse_with_params(&base, params) {
        Ok(url) => url.to_string(),
        Err(_) => base,
    }
}
