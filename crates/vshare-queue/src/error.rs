//! Queue error types.

use thiserror::Error;

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Errors that can occur during queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Failed to configure Kafka client: {0}")]
    ConfigError(String),

    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("Failed to publish message to {topic}: {reason}")]
    PublishFailed { topic: String, reason: String },

    #[error("Failed to decode message payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Message had no payload")]
    EmptyPayload,
}

impl QueueError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn publish_failed(topic: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PublishFailed {
            topic: topic.into(),
            reason: reason.into(),
        }
    }
}
