//! Health endpoints.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// Liveness.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness: checks the object store and the search index; DB
/// readiness is implied by the pool having connected at startup.
pub async fn ready(State(state): State<AppState>) -> Json<Value> {
    let storage_ok = state.storage.check_connectivity().await.is_ok();
    let search_ok = state.search.health_check().await.is_ok();
    Json(json!({
        "status": if storage_ok && search_ok { "ok" } else { "degraded" },
        "storage": storage_ok,
        "search": search_ok,
    }))
}
