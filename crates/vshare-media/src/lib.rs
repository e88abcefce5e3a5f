//! FFmpeg-based media processing.
//!
//! This crate provides:
//! - An FFmpeg command builder and runner with timeout enforcement
//! - FFprobe metadata extraction
//! - The [`MediaProcessor`] trait used by the transcode worker

pub mod command;
pub mod error;
pub mod probe;
pub mod processor;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use probe::{probe_video, VideoInfo};
pub use processor::{FfmpegProcessor, MediaProcessor};
