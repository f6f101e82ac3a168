/// Uniform response envelope and error-code taxonomy
///
/// Every HTTP-facing function answers with an [`Envelope`]; clients branch on
/// the stable `errorCode` string rather than the status alone.
use crate::constants::{HEADER_GATEWAY_REQUEST_ID, HEADER_REQUEST_ID};
use crate::error::VowsError;
use crate::services::captcha::REASON_MISSING_INPUT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ValidationFailed,
    MissingRecaptchaToken,
    CaptchaFailed,
    BadCaptcha,
    CaptchaUnavailable,
    AlreadySubscribed,
    NotFound,
    InternalServiceError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationFailed => "validation_failed",
            Self::MissingRecaptchaToken => "missing_recaptcha_token",
            Self::CaptchaFailed => "captcha_failed",
            Self::BadCaptcha => "bad_captcha",
            Self::CaptchaUnavailable => "captcha_unavailable",
            Self::AlreadySubscribed => "already_subscribed",
            Self::NotFound => "not_found",
            Self::InternalServiceError => "internal_service_error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request identifiers echoed back on every response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelationIds {
    /// Caller-supplied `x-request-id`
    pub request_id: Option<String>,
    /// Request id assigned by the API gateway
    pub gateway_request_id: Option<String>,
}

impl CorrelationIds {
    fn apply(&self, headers: &mut BTreeMap<String, String>) {
        if let Some(id) = &self.request_id {
            headers.insert(HEADER_REQUEST_ID.to_string(), id.clone());
        }
        if let Some(id) = &self.gateway_request_id {
            headers.insert(HEADER_GATEWAY_REQUEST_ID.to_string(), id.clone());
        }
    }
}

/// Body of every failure response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl Envelope {
    fn with_headers(status_code: u16, body: String, correlation: Option<&CorrelationIds>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        if let Some(ids) = correlation {
            ids.apply(&mut headers);
        }

        Self {
            status_code,
            headers,
            body,
        }
    }

    /// Body is exactly `payload`, JSON encoded
    pub fn success<T: Serialize>(
        status_code: u16,
        payload: &T,
        correlation: Option<&CorrelationIds>,
    ) -> Self {
        match serde_json::to_string(payload) {
            Ok(body) => Self::with_headers(status_code, body, correlation),
            Err(e) => {
                error!(error = %e, "Failed to serialize response payload");
                Self::failure(
                    500,
                    ErrorCode::InternalServiceError,
                    "Internal service error",
                    correlation,
                )
            }
        }
    }

    pub fn failure(
        status_code: u16,
        error_code: ErrorCode,
        message: impl Into<String>,
        correlation: Option<&CorrelationIds>,
    ) -> Self {
        let body = ErrorBody {
            error_code: error_code.as_str().to_string(),
            message: message.into(),
        };
        // ErrorBody has only string fields
        let body = serde_json::to_string(&body).unwrap_or_default();
        Self::with_headers(status_code, body, correlation)
    }

    /// `302` to `location`, for endpoints reached directly by a browser
    pub fn redirect(location: &str, correlation: Option<&CorrelationIds>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("location".to_string(), location.to_string());
        if let Some(ids) = correlation {
            ids.apply(&mut headers);
        }

        Self {
            status_code: 302,
            headers,
            body: String::new(),
        }
    }

    /// Maps an error to its status and code. Infrastructure details are
    /// replaced by a generic message; callers log them.
    pub fn from_error(err: &VowsError, correlation: Option<&CorrelationIds>) -> Self {
        let (status, code, message) = classify(err);
        Self::failure(status, code, message, correlation)
    }
}

fn classify(err: &VowsError) -> (u16, ErrorCode, String) {
    match err {
        VowsError::Validation(msg) => (400, ErrorCode::ValidationFailed, msg.clone()),
        VowsError::Conflict(msg) => (409, ErrorCode::AlreadySubscribed, msg.clone()),
        VowsError::NotFound(msg) => (404, ErrorCode::NotFound, msg.clone()),
        VowsError::CaptchaRejected { reason } if reason == REASON_MISSING_INPUT => (
            400,
            ErrorCode::MissingRecaptchaToken,
            "A reCAPTCHA token is required".to_string(),
        ),
        VowsError::CaptchaRejected { reason } => {
            let code = match reason.as_str() {
                "invalid-input-response" | "timeout-or-duplicate" | "bad-request" => {
                    ErrorCode::BadCaptcha
                }
                _ => ErrorCode::CaptchaFailed,
            };
            (
                403,
                code,
                format!("CAPTCHA verification failed ({}), please try again", reason),
            )
        }
        VowsError::CaptchaUnavailable { reason, status } => (
            *status,
            ErrorCode::CaptchaUnavailable,
            format!("CAPTCHA verification is temporarily unavailable ({})", reason),
        ),
        VowsError::Store(_)
        | VowsError::Messaging(_)
        | VowsError::Mail(_)
        | VowsError::Config(_)
        | VowsError::Serialization(_)
        | VowsError::Lambda(_) => (
            500,
            ErrorCode::InternalServiceError,
            "Internal service error".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> CorrelationIds {
        CorrelationIds {
            request_id: Some("req-123".to_string()),
            gateway_request_id: Some("gw-456".to_string()),
        }
    }

    fn body(envelope: &Envelope) -> ErrorBody {
        serde_json::from_str(&envelope.body).unwrap()
    }

    #[test]
    fn test_failure_body() {
        let envelope = Envelope::failure(400, ErrorCode::ValidationFailed, "x", None);
        assert_eq!(envelope.status_code, 400);
        assert_eq!(
            body(&envelope),
            ErrorBody {
                error_code: "validation_failed".to_string(),
                message: "x".to_string()
            }
        );
        assert_eq!(envelope.headers["content-type"], "application/json");
        assert!(!envelope.headers.contains_key("x-request-id"));
    }

    #[test]
    fn test_success_echoes_correlation_headers() {
        let payload = serde_json::json!({"sent": true});
        let envelope = Envelope::success(200, &payload, Some(&ids()));

        assert_eq!(envelope.body, r#"{"sent":true}"#);
        assert_eq!(envelope.headers["x-request-id"], "req-123");
        assert_eq!(envelope.headers["x-amzn-requestid"], "gw-456");
    }

    #[test]
    fn test_redirect() {
        let envelope = Envelope::redirect("https://wedding.example.com/unsubscribed", Some(&ids()));
        assert_eq!(envelope.status_code, 302);
        assert_eq!(envelope.headers["location"], "https://wedding.example.com/unsubscribed");
        assert_eq!(envelope.headers["x-request-id"], "req-123");
        assert!(envelope.body.is_empty());
    }

    #[test]
    fn test_error_mapping() {
        let cases = [
            (VowsError::Validation("bad".to_string()), 400, "validation_failed"),
            (VowsError::Conflict("dup".to_string()), 409, "already_subscribed"),
            (VowsError::NotFound("gone".to_string()), 404, "not_found"),
            (
                VowsError::CaptchaRejected {
                    reason: "missing-input-response".to_string(),
                },
                400,
                "missing_recaptcha_token",
            ),
            (
                VowsError::CaptchaRejected {
                    reason: "invalid-input-response".to_string(),
                },
                403,
                "bad_captcha",
            ),
            (
                VowsError::CaptchaRejected {
                    reason: "score-too-low".to_string(),
                },
                403,
                "captcha_failed",
            ),
            (
                VowsError::CaptchaUnavailable {
                    reason: "network-error".to_string(),
                    status: 503,
                },
                503,
                "captcha_unavailable",
            ),
            (
                VowsError::CaptchaUnavailable {
                    reason: "bad-upstream-response".to_string(),
                    status: 502,
                },
                502,
                "captcha_unavailable",
            ),
            (VowsError::Store("boom".to_string()), 500, "internal_service_error"),
        ];

        for (err, status, code) in cases {
            let envelope = Envelope::from_error(&err, None);
            assert_eq!(envelope.status_code, status, "{}", err);
            assert_eq!(body(&envelope).error_code, code);
        }
    }

    #[test]
    fn test_internal_details_are_not_leaked() {
        let envelope = Envelope::from_error(
            &VowsError::Store("table wedding-comments throttled".to_string()),
            None,
        );
        assert!(!envelope.body.contains("wedding-comments"));
    }

    #[test]
    fn test_error_code_serializes_as_stable_string() {
        assert_eq!(
            serde_json::to_value(ErrorCode::CaptchaUnavailable).unwrap(),
            "captcha_unavailable"
        );
        assert_eq!(ErrorCode::BadCaptcha.to_string(), "bad_captcha");
    }
}
