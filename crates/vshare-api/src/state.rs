//! Application state.

use std::sync::Arc;

use vshare_db::{connect, DbConfig, VideoRepository};
use vshare_queue::{QueueConfig, QueueProducer};
use vshare_search::{IndexConfig, IndexSync, SearchIndex, SearchService};
use vshare_storage::ObjectStore;

use crate::config::ApiConfig;
use crate::services::upload::UploadService;
use crate::services::video::VideoService;

/// Shared application state. One handle per external system,
/// constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub repo: VideoRepository,
    pub storage: Arc<ObjectStore>,
    pub search: SearchService,
    pub index_sync: IndexSync,
    pub upload_service: UploadService,
    pub video_service: VideoService,
}

impl AppState {
    /// Create new application state from the environment.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let pool = connect(&DbConfig::from_env()?).await?;
        let repo = VideoRepository::new(pool);

        let storage = Arc::new(ObjectStore::from_env()?);
        let producer = QueueProducer::new(&QueueConfig::from_env()?)?;

        let index = SearchIndex::new(&IndexConfig::from_env()?)?;
        index.ensure_index().await?;

        let search = SearchService::new(index.clone(), repo.clone());
        let index_sync = IndexSync::new(index, repo.clone());

        let upload_service = UploadService::new(
            repo.clone(),
            Arc::clone(&storage),
            producer,
            config.upload_timeout,
        );
        let video_service = VideoService::new(repo.clone(), index_sync.clone());

        Ok(Self {
            repo,
            storage,
            search,
            index_sync,
            upload_service,
            video_service,
        })
    }
}
