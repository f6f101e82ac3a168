/// Request correlation and logging middleware
use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderMap, HeaderValue, request::Parts},
    middleware::Next,
    response::Response,
};
use lambda_http::RequestExt;
use lambda_http::request::RequestContext;
use std::convert::Infallible;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;
use vows_core::CorrelationIds;
use vows_core::constants::{HEADER_GATEWAY_REQUEST_ID, HEADER_REQUEST_ID};

use crate::error::FailureDetail;

/// Correlation ids of the current request
///
/// Set by [`logging_middleware`]; requests that bypassed it are resolved
/// from their headers on demand.
#[derive(Debug, Clone, Default)]
pub struct Correlation(pub CorrelationIds);

impl<S> FromRequestParts<S> for Correlation
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Correlation>()
            .cloned()
            .unwrap_or_else(|| Correlation(correlation_ids(&parts.headers, None))))
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Caller-supplied request id (generated when absent) and the gateway's id
fn correlation_ids(headers: &HeaderMap, context: Option<&RequestContext>) -> CorrelationIds {
    let gateway_request_id = match context {
        Some(RequestContext::ApiGatewayV2(ctx)) => ctx.request_id.clone(),
        Some(RequestContext::ApiGatewayV1(ctx)) => ctx.request_id.clone(),
        _ => None,
    }
    .or_else(|| header(headers, HEADER_GATEWAY_REQUEST_ID));

    CorrelationIds {
        request_id: Some(header(headers, HEADER_REQUEST_ID).unwrap_or_else(|| Uuid::new_v4().to_string())),
        gateway_request_id,
    }
}

/// Request logging middleware
///
/// Resolves the correlation ids, makes them available to handlers, echoes
/// them on every response and logs method, path, status and duration.
pub async fn logging_middleware(mut request: Request, next: Next) -> Response {
    let start = Instant::now();

    let ids = correlation_ids(request.headers(), request.request_context_ref());
    request.extensions_mut().insert(Correlation(ids.clone()));

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = ids.request_id.clone().unwrap_or_default();

    info!(
        request_id = %request_id,
        gateway_request_id = ids.gateway_request_id.as_deref().unwrap_or("-"),
        method = %method,
        path = %path,
        "Incoming request"
    );

    let mut response = next.run(request).await;

    for (name, value) in [
        (HEADER_REQUEST_ID, ids.request_id.as_deref()),
        (HEADER_GATEWAY_REQUEST_ID, ids.gateway_request_id.as_deref()),
    ] {
        if let Some(value) = value.and_then(|v| HeaderValue::from_str(v).ok()) {
            response.headers_mut().insert(name, value);
        }
    }

    let duration = start.elapsed();
    let status = response.status();

    if let Some(FailureDetail(detail)) = response.extensions().get::<FailureDetail>() {
        error!(
            request_id = %request_id,
            gateway_request_id = ids.gateway_request_id.as_deref().unwrap_or("-"),
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            error = %detail,
            "Request failed"
        );
    } else if status.is_client_error() || status.is_server_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request failed"
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use axum::{Router, body::Body, routing::get};
    use tower::ServiceExt;
    use vows_core::VowsError;

    #[test]
    fn test_caller_request_id_is_kept() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_REQUEST_ID, HeaderValue::from_static("req-1"));
        headers.insert(HEADER_GATEWAY_REQUEST_ID, HeaderValue::from_static("gw-1"));

        let ids = correlation_ids(&headers, None);
        assert_eq!(ids.request_id.as_deref(), Some("req-1"));
        assert_eq!(ids.gateway_request_id.as_deref(), Some("gw-1"));
    }

    #[test]
    fn test_request_id_generated_when_absent() {
        let first = correlation_ids(&HeaderMap::new(), None);
        let second = correlation_ids(&HeaderMap::new(), None);
        assert!(first.request_id.is_some());
        assert_ne!(first.request_id, second.request_id);
        assert_eq!(first.gateway_request_id, None);
    }

    #[tokio::test]
    async fn test_failed_request_keeps_correlation() {
        async fn failing() -> Result<(), ApiError> {
            Err(VowsError::Store("table missing".to_string()).into())
        }

        let app = Router::new()
            .route("/fail", get(failing))
            .layer(axum::middleware::from_fn(logging_middleware));

        let request = axum::http::Request::builder()
            .uri("/fail")
            .header(HEADER_REQUEST_ID, "req-500")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[HEADER_REQUEST_ID], "req-500");
        assert!(response.extensions().get::<FailureDetail>().is_some());
    }
}
