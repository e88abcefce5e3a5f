//! Worker configuration.

use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Kafka consumer group for the task topic
    pub group_id: String,
    /// Timeout for downloading one raw upload
    pub download_timeout: Duration,
    /// Timeout for uploading one transcoded artifact
    pub upload_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            group_id: "transcode-workers".to_string(),
            download_timeout: Duration::from_secs(10 * 60),
            upload_timeout: Duration::from_secs(10 * 60),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            group_id: std::env::var("WORKER_GROUP_ID").unwrap_or(defaults.group_id),
            download_timeout: std::env::var("WORKER_DOWNLOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.download_timeout),
            upload_timeout: std::env::var("WORKER_UPLOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.upload_timeout),
        }
    }
}
