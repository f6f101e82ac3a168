/// Contact form endpoint
use axum::{body::Bytes, extract::State, http::HeaderMap};
use serde::Serialize;
use std::sync::Arc;
use vows_core::Envelope;
use vows_core::models::ContactRequest;

use crate::api::common::{parse_json, require_captcha};
use crate::context::ApiContext;
use crate::error::{ApiError, ApiResponse};
use crate::middleware::Correlation;

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub sent: bool,
}

/// `POST /contact`
pub async fn submit(
    State(ctx): State<Arc<ApiContext>>,
    Correlation(ids): Correlation,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ApiResponse, ApiError> {
    let request: ContactRequest = parse_json(&body)?;
    let message = request.validate()?;

    require_captcha(&ctx, request.recaptcha_token.as_deref(), &headers).await?;

    ctx.contact.send(&message).await?;

    Ok(ApiResponse(Envelope::success(
        200,
        &ContactResponse { sent: true },
        Some(&ids),
    )))
}
