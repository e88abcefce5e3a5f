//! HTTP handlers.

pub mod health;
pub mod search;
pub mod videos;

use axum::http::HeaderMap;

use crate::error::{ApiError, ApiResult};

/// Caller identity, injected by the gateway as a header.
pub(crate) fn author_id(headers: &HeaderMap) -> ApiResult<i64> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| ApiError::bad_request("missing or invalid X-User-Id header"))
}
