//! Worker error types.

use thiserror::Error;

/// Result type for worker operations.
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors that can occur while processing a transcode task.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("storage error: {0}")]
    Storage(#[from] vshare_storage::StorageError),

    #[error("media error: {0}")]
    Media(#[from] vshare_media::MediaError),

    #[error("queue error: {0}")]
    Queue(#[from] vshare_queue::QueueError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
