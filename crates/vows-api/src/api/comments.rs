/// Photo comment endpoints
use axum::{
    body::Bytes,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::HeaderMap,
};
use std::sync::Arc;
use vows_core::Envelope;
use vows_core::models::{CreateCommentRequest, ListCommentsQuery};

use crate::api::common::{parse_json, require_captcha};
use crate::context::ApiContext;
use crate::error::{ApiError, ApiResponse};
use crate::middleware::Correlation;

/// `GET /photos/{photoId}/comments`
pub async fn list(
    State(ctx): State<Arc<ApiContext>>,
    Correlation(ids): Correlation,
    Path(photo_id): Path<String>,
    query: Result<Query<ListCommentsQuery>, QueryRejection>,
) -> Result<ApiResponse, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let request = query.into_page_request(&ctx.config.pagination)?;

    let page = ctx.comments.list(&photo_id, &request).await?;

    Ok(ApiResponse(Envelope::success(200, &page, Some(&ids))))
}

/// `POST /photos/{photoId}/comments`
pub async fn create(
    State(ctx): State<Arc<ApiContext>>,
    Correlation(ids): Correlation,
    Path(photo_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ApiResponse, ApiError> {
    let request: CreateCommentRequest = parse_json(&body)?;
    let new_comment = request.validate(&photo_id)?;

    require_captcha(&ctx, request.recaptcha_token.as_deref(), &headers).await?;

    let comment = ctx.comments.create(new_comment).await?;

    Ok(ApiResponse(Envelope::success(201, &comment, Some(&ids))))
}
