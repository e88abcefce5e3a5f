//! Search endpoints.

use axum::extract::{Query, State};
use axum::Json;
use serde_json::{json, Value};

use vshare_models::Page;
use vshare_search::{SearchRequest, SearchResultItem};

use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /api/v1/search`
pub async fn search_videos(
    State(state): State<AppState>,
    Query(request): Query<SearchRequest>,
) -> ApiResult<Json<Page<SearchResultItem>>> {
    Ok(Json(state.search.search(&request).await?))
}

/// `POST /api/v1/search/rebuild` — full index rebuild from the record
/// store; reports per-document counts.
pub async fn rebuild_index(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let outcome = state.index_sync.rebuild().await?;
    Ok(Json(json!({
        "succeeded": outcome.succeeded,
        "failed": outcome.failed,
    })))
}
