//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use vshare_models::MAX_UPLOAD_BYTES;

use crate::handlers::health::{health, ready};
use crate::handlers::search::{rebuild_index, search_videos};
use crate::handlers::videos::{
    delete_video, favorite, feed, my_videos, unfavorite, update_video, upload_video, video_detail,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    // Multipart overhead on top of the raw file limit.
    let body_limit = MAX_UPLOAD_BYTES as usize + 1024 * 1024;

    let video_routes = Router::new()
        .route("/videos", post(upload_video))
        .route("/videos/feed", get(feed))
        .route("/videos/:video_id", get(video_detail))
        .route("/videos/:video_id", put(update_video))
        .route("/videos/:video_id", delete(delete_video))
        .route("/videos/:video_id/favorite", post(favorite))
        .route("/videos/:video_id/favorite", delete(unfavorite))
        .route("/user/videos", get(my_videos));

    let search_routes = Router::new()
        .route("/search", get(search_videos))
        .route("/search/rebuild", post(rebuild_index));

    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .nest("/api/v1", video_routes.merge(search_routes))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
