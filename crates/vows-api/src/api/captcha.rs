/// Standalone CAPTCHA validation endpoint
use axum::{body::Bytes, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vows_core::services::captcha::REASON_MISSING_INPUT;
use vows_core::{Envelope, VowsError};

use crate::api::common::{client_ip, parse_json};
use crate::context::ApiContext;
use crate::error::{ApiError, ApiResponse};
use crate::middleware::Correlation;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCaptchaRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub remote_ip: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidateCaptchaResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// `POST /captcha/validate`
pub async fn validate(
    State(ctx): State<Arc<ApiContext>>,
    Correlation(ids): Correlation,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ApiResponse, ApiError> {
    let request: ValidateCaptchaRequest = parse_json(&body)?;

    let Some(token) = request
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    else {
        return Err(VowsError::CaptchaRejected {
            reason: REASON_MISSING_INPUT.to_string(),
        }
        .into());
    };

    let remote_ip = request.remote_ip.clone().or_else(|| client_ip(&headers));
    let score = ctx
        .captcha
        .verify(Some(token), remote_ip.as_deref())
        .await
        .into_result()?;

    Ok(ApiResponse(Envelope::success(
        200,
        &ValidateCaptchaResponse {
            success: true,
            score,
        },
        Some(&ids),
    )))
}
