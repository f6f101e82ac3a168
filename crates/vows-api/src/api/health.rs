/// Health check endpoint
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::context::ApiContext;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub captcha_enabled: bool,
}

/// Health check handler
///
/// Reports process liveness only; collaborators are not probed.
pub async fn handler(State(ctx): State<Arc<ApiContext>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: vows_core::VERSION.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        captcha_enabled: ctx.config.captcha.enabled,
    })
}
