//! The consume loop: tasks in, results out.

use std::sync::Arc;

use rdkafka::consumer::StreamConsumer;
use tokio::sync::watch;
use tracing::{error, info, warn};

use vshare_media::MediaProcessor;
use vshare_queue::{create_consumer, decode_payload, QueueConfig, QueueProducer, TranscodeTask};

use crate::config::WorkerConfig;
use crate::error::WorkerResult;
use crate::pipeline::{process_task, BlobStore};

/// Consumes transcode tasks and emits results.
pub struct TaskExecutor {
    consumer: StreamConsumer,
    producer: QueueProducer,
    media: Arc<dyn MediaProcessor>,
    store: Arc<dyn BlobStore>,
}

impl TaskExecutor {
    pub fn new(
        worker_config: &WorkerConfig,
        queue_config: &QueueConfig,
        media: Arc<dyn MediaProcessor>,
        store: Arc<dyn BlobStore>,
    ) -> WorkerResult<Self> {
        let consumer = create_consumer(
            queue_config,
            &worker_config.group_id,
            &queue_config.task_topic,
        )?;
        let producer = QueueProducer::new(queue_config)?;

        Ok(Self {
            consumer,
            producer,
            media,
            store,
        })
    }

    /// Run until the shutdown signal flips. A task already accepted
    /// runs to completion before the loop exits; a single task's
    /// failure never terminates the loop.
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> WorkerResult<()> {
        info!("Task executor started");

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Shutdown signal received, stopping task executor");
                        break;
                    }
                }
                message = self.consumer.recv() => {
                    match message {
                        Ok(message) => self.handle_message(&message).await,
                        Err(e) => {
                            error!("Consumer error: {}", e);
                            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn handle_message(&self, message: &rdkafka::message::BorrowedMessage<'_>) {
        let task: TranscodeTask = match decode_payload(message) {
            Ok(task) => task,
            Err(e) => {
                // Undecodable payloads are dropped, not retried.
                warn!("Skipping undecodable task message: {}", e);
                return;
            }
        };

        let result = process_task(self.media.as_ref(), self.store.as_ref(), &task).await;

        if let Err(e) = self.producer.send_result(&result).await {
            error!(
                "Failed to publish result for video {}: {}",
                task.video_id, e
            );
        }
    }
}
