/// Vows API - HTTP API Lambda for the wedding site
///
/// Contact form, photo comments, comment subscriptions and CAPTCHA
/// validation, served by one axum router behind API Gateway.
pub mod api;
pub mod context;
pub mod error;
pub mod middleware;

pub use context::ApiContext;
pub use error::{ApiError, ApiResponse};

use axum::{
    Router,
    body::Body as AxumBody,
    extract::DefaultBodyLimit,
    http::{HeaderName, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use lambda_http::{Body, Error as LambdaError, Request, Response};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;
use vows_core::{Envelope, ErrorCode};

/// Request bodies are small JSON documents
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Builds the API router
pub fn build_router(ctx: Arc<ApiContext>) -> Router {
    let photos = Router::new()
        .route(
            "/{photo_id}/comments",
            get(api::comments::list).post(api::comments::create),
        )
        .route("/{photo_id}/subscriptions", post(api::subscriptions::subscribe))
        .route(
            "/{photo_id}/subscriptions/{email}",
            get(api::subscriptions::unsubscribe_link).delete(api::subscriptions::unsubscribe),
        );

    Router::new()
        .route("/health", get(api::health::handler))
        .route("/contact", post(api::contact::submit))
        .route("/captcha/validate", post(api::captcha::validate))
        .nest("/photos", photos)
        // Correlation ids + request logging
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        // The site is served from another origin
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([
                    header::CONTENT_TYPE,
                    HeaderName::from_static(vows_core::constants::HEADER_REQUEST_ID),
                ])
                .expose_headers([
                    HeaderName::from_static(vows_core::constants::HEADER_REQUEST_ID),
                    HeaderName::from_static(vows_core::constants::HEADER_GATEWAY_REQUEST_ID),
                ]),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(ctx)
}

/// Main API handler - converts Lambda HTTP request to Axum router
pub async fn handler(ctx: Arc<ApiContext>, event: Request) -> Result<Response<Body>, LambdaError> {
    let app = build_router(ctx);

    // Convert Lambda HTTP request to Axum request
    let (parts, body) = event.into_parts();
    let axum_request = http::Request::from_parts(parts, AxumBody::from(body.to_vec()));

    // Process request with Axum
    match app.oneshot(axum_request).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();

            // Convert Axum response body to Lambda response body
            let body_bytes = axum::body::to_bytes(body, usize::MAX)
                .await
                .unwrap_or_default();

            Ok(Response::from_parts(parts, Body::from(body_bytes.to_vec())))
        }
        Err(err) => {
            error!(error = %err, "Axum router error");
            let envelope = Envelope::failure(
                500,
                ErrorCode::InternalServiceError,
                "Internal service error",
                None,
            );

            let mut response = Response::new(Body::from(envelope.body));
            *response.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
            for (name, value) in envelope.headers {
                if let (Ok(name), Ok(value)) = (
                    http::HeaderName::from_bytes(name.as_bytes()),
                    http::HeaderValue::from_str(&value),
                ) {
                    response.headers_mut().insert(name, value);
                }
            }
            Ok(response)
        }
    }
}
