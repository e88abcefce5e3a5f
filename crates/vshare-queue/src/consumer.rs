//! Kafka consumer factory and payload decoding.

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Message};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::config::QueueConfig;
use crate::error::{QueueError, QueueResult};

/// Create a stream consumer subscribed to a single topic.
///
/// Offsets are auto-committed on an interval, giving at-least-once
/// delivery; handlers must be idempotent.
pub fn create_consumer(
    config: &QueueConfig,
    group_id: &str,
    topic: &str,
) -> QueueResult<StreamConsumer> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", &config.brokers)
        .set("group.id", group_id)
        .set("enable.auto.commit", "true")
        .set("auto.commit.interval.ms", "5000")
        .set("auto.offset.reset", "earliest")
        .set("session.timeout.ms", "30000")
        .create()?;

    consumer.subscribe(&[topic])?;
    info!("Kafka consumer group {} subscribed to {}", group_id, topic);

    Ok(consumer)
}

/// Decode a JSON message payload.
pub fn decode_payload<T: DeserializeOwned>(message: &BorrowedMessage<'_>) -> QueueResult<T> {
    let payload = message.payload().ok_or(QueueError::EmptyPayload)?;
    Ok(serde_json::from_slice(payload)?)
}
