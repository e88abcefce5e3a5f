//! Kafka producer for tasks and results.

use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::QueueConfig;
use crate::error::{QueueError, QueueResult};
use crate::message::{TranscodeResult, TranscodeTask};

/// Producer handle for both pipeline topics. Clone freely.
#[derive(Clone)]
pub struct QueueProducer {
    producer: FutureProducer,
    task_topic: String,
    result_topic: String,
    send_timeout: Duration,
}

impl QueueProducer {
    pub fn new(config: &QueueConfig) -> QueueResult<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("message.timeout.ms", "10000")
            .set("acks", "all")
            .create()?;

        info!("Kafka producer connected to {}", config.brokers);

        Ok(Self {
            producer,
            task_topic: config.task_topic.clone(),
            result_topic: config.result_topic.clone(),
            send_timeout: Duration::from_secs(10),
        })
    }

    /// Publish a transcode task, keyed by video id.
    pub async fn send_task(&self, task: &TranscodeTask) -> QueueResult<()> {
        self.send(&self.task_topic, &task.partition_key(), task).await
    }

    /// Publish a transcode result, keyed by video id.
    pub async fn send_result(&self, result: &TranscodeResult) -> QueueResult<()> {
        self.send(&self.result_topic, &result.partition_key(), result)
            .await
    }

    async fn send<T: Serialize>(&self, topic: &str, key: &str, message: &T) -> QueueResult<()> {
        let payload = serde_json::to_vec(message)?;

        let record = FutureRecord::to(topic).key(key).payload(&payload);

        self.producer
            .send(record, self.send_timeout)
            .await
            .map_err(|(e, _)| QueueError::publish_failed(topic, e.to_string()))?;

        debug!("Published message to {} (key={})", topic, key);
        Ok(())
    }
}
