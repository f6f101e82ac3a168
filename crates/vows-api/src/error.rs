/// API Error types and envelope conversion
use axum::{
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::warn;
use vows_core::{Envelope, ErrorCode, VowsError};

/// API Error
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body or query string could not be read
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Core(#[from] VowsError),
}

/// Internal detail of a failed request, kept out of the body and logged by
/// the logging middleware with the request's correlation ids
#[derive(Debug, Clone)]
pub struct FailureDetail(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                ApiResponse(Envelope::failure(400, ErrorCode::ValidationFailed, msg, None))
                    .into_response()
            }
            ApiError::Core(err) => {
                let mut response = ApiResponse(Envelope::from_error(&err, None)).into_response();
                if !err.is_client_error() {
                    response.extensions_mut().insert(FailureDetail(err.to_string()));
                }
                response
            }
        }
    }
}

/// Adapts a core [`Envelope`] into an axum response
#[derive(Debug)]
pub struct ApiResponse(pub Envelope);

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let Envelope {
            status_code,
            headers,
            body,
        } = self.0;

        let status = StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    header_map.insert(name, value);
                }
                _ => warn!(header = %name, "Dropping response header with invalid name or value"),
            }
        }

        (status, header_map, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_core_error_becomes_envelope() {
        let response = ApiError::from(VowsError::Validation("authorName is required".to_string()))
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["content-type"], "application/json");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["errorCode"], "validation_failed");
        assert_eq!(json["message"], "authorName is required");
    }

    #[test]
    fn test_infrastructure_detail_is_kept_for_logging() {
        let response = ApiError::from(VowsError::Store("table missing".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = response.extensions().get::<FailureDetail>().unwrap();
        assert_eq!(detail.0, "Store error: table missing");

        let response = ApiError::from(VowsError::Conflict("already subscribed".to_string()))
            .into_response();
        assert!(response.extensions().get::<FailureDetail>().is_none());
    }

    #[tokio::test]
    async fn test_captcha_outage_status_is_preserved() {
        let response = ApiError::from(VowsError::CaptchaUnavailable {
            reason: "bad-upstream-response".to_string(),
            status: 502,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_redirect_envelope() {
        let response = ApiResponse(Envelope::redirect("https://example.com/unsubscribed", None))
            .into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()["location"], "https://example.com/unsubscribed");
    }
}
