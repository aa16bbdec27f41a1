use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::ApiError;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Reject `/api` requests whose `X-API-Key` header does not match.
///
/// With no key configured every request passes.
pub async fn require_api_key(req: Request, next: Next, api_key: Option<Arc<str>>) -> Response {
    let Some(expected) = api_key else {
        return next.run(req).await;
    };
    if !req.uri().path().starts_with("/api") {
        return next.run(req).await;
    }

    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    if provided != Some(expected.as_ref()) {
        tracing::debug!(path = %req.uri().path(), "Rejected request with missing or wrong API key");
        return ApiError::unauthorized().into_response();
    }

    next.run(req).await
}
