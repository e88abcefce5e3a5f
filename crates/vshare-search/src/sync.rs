//! Keeping the index in step with the record store.

use tracing::{info, warn};

use vshare_db::VideoRepository;
use vshare_models::{VideoId, VideoStatus};

use crate::document::VideoDocument;
use crate::error::SearchResult;
use crate::index::{BulkOutcome, SearchIndex};

const REBUILD_BATCH_SIZE: usize = 500;

/// Pushes record-store state into the search index.
#[derive(Clone)]
pub struct IndexSync {
    index: SearchIndex,
    repo: VideoRepository,
}

impl IndexSync {
    pub fn new(index: SearchIndex, repo: VideoRepository) -> Self {
        Self { index, repo }
    }

    /// Sync one video. Published records are upserted; anything else
    /// (including missing records) is removed from the index.
    pub async fn sync_video(&self, id: VideoId) -> SearchResult<()> {
        match self.repo.get_by_id(id).await? {
            Some(video) if video.status == VideoStatus::Published => {
                self.index.index_video(&VideoDocument::from(&video)).await
            }
            _ => self.index.delete_video(id).await,
        }
    }

    /// Remove one video from the index.
    pub async fn remove_video(&self, id: VideoId) -> SearchResult<()> {
        self.index.delete_video(id).await
    }

    /// Rebuild the whole index from published records, in batches.
    /// Partial failures are counted, never fatal.
    pub async fn rebuild(&self) -> SearchResult<BulkOutcome> {
        self.index.ensure_index().await?;

        let ids = self.repo.all_published_ids().await?;
        info!("Rebuilding search index from {} published videos", ids.len());

        let mut outcome = BulkOutcome::default();
        for chunk in ids.chunks(REBUILD_BATCH_SIZE) {
            let videos = self.repo.get_by_ids(chunk).await?;
            let docs: Vec<VideoDocument> = videos.iter().map(VideoDocument::from).collect();

            match self.index.bulk_index(&docs).await {
                Ok(batch) => {
                    outcome.succeeded += batch.succeeded;
                    outcome.failed += batch.failed;
                }
                Err(e) => {
                    warn!("Bulk index batch of {} failed: {}", docs.len(), e);
                    outcome.failed += docs.len();
                }
            }
        }

        info!(
            "Index rebuild finished: {} succeeded, {} failed",
            outcome.succeeded, outcome.failed
        );
        Ok(outcome)
    }
}
