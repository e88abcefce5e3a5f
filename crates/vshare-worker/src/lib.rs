//! Transcode worker: consumes tasks, runs ffmpeg, emits results.

pub mod config;
pub mod error;
pub mod executor;
pub mod pipeline;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::TaskExecutor;
pub use pipeline::{process_task, BlobStore, S3BlobStore};
