//! Video endpoints.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;

use vshare_models::{Page, Video, VideoId, VideoStatus};

use crate::error::{ApiError, ApiResult};
use crate::handlers::author_id;
use crate::services::{UploadInput, UploadSummary};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

/// `POST /api/v1/videos` — multipart upload: `title`, `description`,
/// `file` (filename extension gives the format).
pub async fn upload_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadSummary>)> {
    let author_id = author_id(&headers)?;

    let mut title = None;
    let mut description = String::new();
    let mut format = None;
    let mut data = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => {
                title = Some(field.text().await.map_err(bad_field)?);
            }
            Some("description") => {
                description = field.text().await.map_err(bad_field)?;
            }
            Some("file") => {
                format = field
                    .file_name()
                    .and_then(|name| name.rsplit('.').next())
                    .map(str::to_string);
                data = Some(field.bytes().await.map_err(bad_field)?.to_vec());
            }
            _ => {}
        }
    }

    let input = UploadInput {
        author_id,
        title: title.ok_or_else(|| ApiError::bad_request("missing title field"))?,
        description,
        format: format.ok_or_else(|| ApiError::bad_request("missing file field or extension"))?,
    };
    let data = data.ok_or_else(|| ApiError::bad_request("missing file field"))?;

    let summary = state.upload_service.upload(input, data).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

fn bad_field(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::bad_request(format!("malformed multipart field: {}", e))
}

/// `GET /api/v1/videos/feed`
pub async fn feed(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> ApiResult<Json<Page<Video>>> {
    Ok(Json(state.video_service.feed(p.page, p.page_size).await?))
}

/// `GET /api/v1/videos/:video_id`
pub async fn video_detail(
    State(state): State<AppState>,
    Path(video_id): Path<i64>,
) -> ApiResult<Json<Video>> {
    Ok(Json(state.video_service.detail(VideoId(video_id)).await?))
}

#[derive(Debug, Deserialize)]
pub struct MyVideosQuery {
    pub status: Option<VideoStatus>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

/// `GET /api/v1/user/videos`
pub async fn my_videos(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<MyVideosQuery>,
) -> ApiResult<Json<Page<Video>>> {
    let author_id = author_id(&headers)?;
    Ok(Json(
        state
            .video_service
            .my_videos(author_id, q.status, q.page, q.page_size)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateVideoBody {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// `PUT /api/v1/videos/:video_id`
pub async fn update_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(video_id): Path<i64>,
    Json(body): Json<UpdateVideoBody>,
) -> ApiResult<Json<Video>> {
    let author_id = author_id(&headers)?;
    let video = state
        .video_service
        .update(
            VideoId(video_id),
            author_id,
            body.title.as_deref(),
            body.description.as_deref(),
        )
        .await?;
    Ok(Json(video))
}

/// `DELETE /api/v1/videos/:video_id`
pub async fn delete_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(video_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let author_id = author_id(&headers)?;
    state
        .video_service
        .delete(VideoId(video_id), author_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/v1/videos/:video_id/favorite`
pub async fn favorite(
    State(state): State<AppState>,
    Path(video_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.video_service.favorite(VideoId(video_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/v1/videos/:video_id/favorite`
pub async fn unfavorite(
    State(state): State<AppState>,
    Path(video_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.video_service.unfavorite(VideoId(video_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
