//! Background consumer applying transcode results.
//!
//! Apply errors never stop the loop and the message is always
//! committed by the interval auto-commit; at-least-once, but never an
//! infinite retry storm on a poison message.

use tokio::sync::watch;
use tracing::{error, info, warn};

use vshare_db::VideoRepository;
use vshare_queue::{create_consumer, decode_payload, QueueConfig, QueueResult, TranscodeResult};
use vshare_search::IndexSync;

/// Consumes `transcode.results` and applies each to the record store.
pub struct ResultApplier {
    repo: VideoRepository,
    index_sync: IndexSync,
    queue_config: QueueConfig,
    group_id: String,
}

impl ResultApplier {
    pub fn new(
        repo: VideoRepository,
        index_sync: IndexSync,
        queue_config: QueueConfig,
        group_id: String,
    ) -> Self {
        Self {
            repo,
            index_sync,
            queue_config,
            group_id,
        }
    }

    /// Run until the shutdown signal flips.
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> QueueResult<()> {
        let consumer = create_consumer(
            &self.queue_config,
            &self.group_id,
            &self.queue_config.result_topic,
        )?;

        info!("Result applier started");

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Shutdown signal received, stopping result applier");
                        break;
                    }
                }
                message = consumer.recv() => {
                    match message {
                        Ok(message) => {
                            match decode_payload::<TranscodeResult>(&message) {
                                Ok(result) => self.apply(&result).await,
                                Err(e) => warn!("Skipping undecodable result message: {}", e),
                            }
                        }
                        Err(e) => {
                            error!("Result consumer error: {}", e);
                            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn apply(&self, result: &TranscodeResult) {
        match self.repo.apply_transcode_result(result).await {
            Ok(true) => {
                if result.is_success() {
                    if let Err(e) = self.index_sync.sync_video(result.video_id).await {
                        warn!(
                            "Index sync for published video {} failed: {}",
                            result.video_id, e
                        );
                    }
                }
            }
            Ok(false) => {
                // Deleted or missing record; nothing to index.
                warn!(
                    "Transcode result for video {} matched no live record",
                    result.video_id
                );
            }
            Err(e) => {
                error!(
                    "Failed to apply transcode result for video {}: {}",
                    result.video_id, e
                );
            }
        }
    }
}
