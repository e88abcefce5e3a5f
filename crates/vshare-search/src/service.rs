//! Search entry point with relational fallback.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use vshare_db::{VideoFilter, VideoRepository};
use vshare_models::{clamp_pagination, Page, Video};

use crate::error::SearchResult;
use crate::index::{IndexSearchOutcome, SearchIndex};
use crate::query::SearchRequest;

/// One search result: the live record plus optional highlights.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResultItem {
    #[serde(flatten)]
    pub video: Video,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_highlight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_highlight: Option<String>,
}

/// Compiles requests against the index and hydrates hits from the
/// record store. Falls back to the record store entirely when the
/// index is unreachable.
#[derive(Clone)]
pub struct SearchService {
    index: SearchIndex,
    repo: VideoRepository,
}

impl SearchService {
    pub fn new(index: SearchIndex, repo: VideoRepository) -> Self {
        Self { index, repo }
    }

    /// Ping the index cluster. The service stays usable without it
    /// (the fallback path takes over), so callers report rather than fail.
    pub async fn health_check(&self) -> SearchResult<()> {
        self.index.health_check().await
    }

    pub async fn search(&self, request: &SearchRequest) -> SearchResult<Page<SearchResultItem>> {
        let (page, page_size) = clamp_pagination(request.page, request.page_size);

        match self.index.search(request, page, page_size).await {
            Ok(outcome) => self.hydrate(outcome, page, page_size).await,
            Err(e) => {
                warn!("Search index unavailable, falling back to record store: {}", e);
                self.fallback(request, page, page_size).await
            }
        }
    }

    /// Attach live records to index hits, preserving index order.
    /// Hits whose record has vanished (deleted since last sync) drop out.
    async fn hydrate(
        &self,
        outcome: IndexSearchOutcome,
        page: u32,
        page_size: u32,
    ) -> SearchResult<Page<SearchResultItem>> {
        let ids: Vec<_> = outcome.hits.iter().map(|h| h.id).collect();
        let videos = self.repo.get_by_ids(&ids).await?;

        let mut highlights: HashMap<_, _> = outcome
            .hits
            .into_iter()
            .map(|h| (h.id, (h.title_highlight, h.description_highlight)))
            .collect();

        let items = videos
            .into_iter()
            .map(|video| {
                let (title_highlight, description_highlight) =
                    highlights.remove(&video.id).unwrap_or_default();
                SearchResultItem {
                    video,
                    title_highlight,
                    description_highlight,
                }
            })
            .collect();

        Ok(Page::new(items, outcome.total, page, page_size))
    }

    /// Equivalent filtered query against the record store. Highlighting
    /// and the hot sort are unavailable here.
    async fn fallback(
        &self,
        request: &SearchRequest,
        page: u32,
        page_size: u32,
    ) -> SearchResult<Page<SearchResultItem>> {
        let filter = VideoFilter {
            author_id: request.author_id,
            video_id: request.video_id,
            query: request.trimmed_query().map(str::to_string),
            published_after: request.published_after,
            published_before: request.published_before,
            only_published: true,
            ..Default::default()
        };

        let result = self.repo.list_videos(&filter, page, page_size).await?;
        let items = result
            .items
            .into_iter()
            .map(|video| SearchResultItem {
                video,
                title_highlight: None,
                description_highlight: None,
            })
            .collect();

        Ok(Page::new(items, result.total, result.page, result.page_size))
    }
}
