//! Kafka connection configuration.

use crate::error::{QueueError, QueueResult};

/// Topic carrying transcode tasks from the API to workers.
pub const TASK_TOPIC: &str = "transcode.tasks";

/// Topic carrying transcode results from workers back to the API.
pub const RESULT_TOPIC: &str = "transcode.results";

/// Configuration shared by producers and consumers.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Comma-separated broker list
    pub brokers: String,
    /// Topic for transcode tasks
    pub task_topic: String,
    /// Topic for transcode results
    pub result_topic: String,
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> QueueResult<Self> {
        Ok(Self {
            brokers: std::env::var("KAFKA_BROKERS")
                .map_err(|_| QueueError::config_error("KAFKA_BROKERS not set"))?,
            task_topic: std::env::var("KAFKA_TASK_TOPIC")
                .unwrap_or_else(|_| TASK_TOPIC.to_string()),
            result_topic: std::env::var("KAFKA_RESULT_TOPIC")
                .unwrap_or_else(|_| RESULT_TOPIC.to_string()),
        })
    }
}
