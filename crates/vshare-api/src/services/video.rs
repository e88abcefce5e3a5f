//! Video read/update/delete operations.

use tracing::warn;

use vshare_db::{VideoFilter, VideoRepository};
use vshare_models::{Page, Video, VideoId, VideoStatus};
use vshare_search::IndexSync;

use crate::error::{ApiError, ApiResult};

/// Thin service over the repository, with index upkeep on writes.
#[derive(Clone)]
pub struct VideoService {
    repo: VideoRepository,
    index_sync: IndexSync,
}

impl VideoService {
    pub fn new(repo: VideoRepository, index_sync: IndexSync) -> Self {
        Self { repo, index_sync }
    }

    /// Published videos, newest first.
    pub async fn feed(&self, page: u32, page_size: u32) -> ApiResult<Page<Video>> {
        let filter = VideoFilter {
            only_published: true,
            ..Default::default()
        };
        Ok(self.repo.list_videos(&filter, page, page_size).await?)
    }

    /// One video; bumps the view counter for published videos.
    pub async fn detail(&self, id: VideoId) -> ApiResult<Video> {
        let video = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("video {}", id)))?;

        if video.status.is_published() {
            if let Err(e) = self.repo.increment_view_count(id).await {
                warn!("Failed to bump view count for video {}: {}", id, e);
            }
        }

        Ok(video)
    }

    /// The author's own videos, any non-deleted state unless filtered.
    pub async fn my_videos(
        &self,
        author_id: i64,
        status: Option<VideoStatus>,
        page: u32,
        page_size: u32,
    ) -> ApiResult<Page<Video>> {
        let filter = VideoFilter {
            author_id: Some(author_id),
            status: status.filter(|s| *s != VideoStatus::Deleted),
            ..Default::default()
        };
        Ok(self.repo.list_videos(&filter, page, page_size).await?)
    }

    /// Update title/description; author-only.
    pub async fn update(
        &self,
        id: VideoId,
        author_id: i64,
        title: Option<&str>,
        description: Option<&str>,
    ) -> ApiResult<Video> {
        let video = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("video {}", id)))?;
        if video.author_id != author_id {
            return Err(ApiError::forbidden("not the author of this video"));
        }

        self.repo.update_metadata(id, title, description).await?;

        // Keep the indexed copy in step; never fail the request over it.
        if video.status.is_published() {
            if let Err(e) = self.index_sync.sync_video(id).await {
                warn!("Index sync after update of video {} failed: {}", id, e);
            }
        }

        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("video {}", id)))
    }

    /// Soft-delete; author-only. Index removal is best-effort.
    pub async fn delete(&self, id: VideoId, author_id: i64) -> ApiResult<()> {
        let video = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("video {}", id)))?;
        if video.author_id != author_id {
            return Err(ApiError::forbidden("not the author of this video"));
        }

        self.repo.soft_delete(id, author_id).await?;

        if let Err(e) = self.index_sync.remove_video(id).await {
            warn!("Index removal of deleted video {} failed: {}", id, e);
        }
        Ok(())
    }

    pub async fn favorite(&self, id: VideoId) -> ApiResult<()> {
        Ok(self.repo.increment_favorite_count(id).await?)
    }

    pub async fn unfavorite(&self, id: VideoId) -> ApiResult<()> {
        Ok(self.repo.decrement_favorite_count(id).await?)
    }

    /// Entry point for the comment collaborator; no route of our own
    /// mutates comment counts.
    pub async fn add_comment_count(&self, id: VideoId) -> ApiResult<()> {
        Ok(self.repo.increment_comment_count(id).await?)
    }

    /// See [`Self::add_comment_count`].
    pub async fn remove_comment_count(&self, id: VideoId) -> ApiResult<()> {
        Ok(self.repo.decrement_comment_count(id).await?)
    }
}
