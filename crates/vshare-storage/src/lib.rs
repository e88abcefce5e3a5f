//! S3-compatible object store client (MinIO in deployment).
//!
//! This crate provides:
//! - Upload/download against the private raw bucket and public asset bucket
//! - Object key derivation for raw uploads and transcoded artifacts
//! - Public URL construction for published assets

pub mod client;
pub mod error;
pub mod keys;

pub use client::{ObjectStore, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use keys::{cover_key, play_key, raw_video_key};
