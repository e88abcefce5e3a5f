//! Kafka plumbing for the publication pipeline.
//!
//! Two topics connect the API and the workers:
//! - `transcode.tasks`: accepted uploads waiting for a worker
//! - `transcode.results`: finished attempts waiting to be applied
//!
//! Every record is keyed by `video-{id}` so per-video ordering holds
//! within a partition.

pub mod config;
pub mod consumer;
pub mod error;
pub mod message;
pub mod producer;

pub use config::{QueueConfig, RESULT_TOPIC, TASK_TOPIC};
pub use consumer::{create_consumer, decode_payload};
pub use error::{QueueError, QueueResult};
pub use message::{TranscodeResult, TranscodeTask};
pub use producer::QueueProducer;
