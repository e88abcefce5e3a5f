//! Media processing operations used by the transcode pipeline.
//!
//! The trait exists so the worker pipeline can run against a stub in
//! tests without spawning ffmpeg.

use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::probe::{probe_video, VideoInfo};

/// Default wall-clock limit for a single transcode.
pub const TRANSCODE_TIMEOUT_SECS: u64 = 30 * 60;

/// Wall-clock limit for cover extraction.
pub const COVER_TIMEOUT_SECS: u64 = 60;

/// Media operations needed to publish a video.
#[async_trait]
pub trait MediaProcessor: Send + Sync {
    /// Transcode the input into a web-playable MP4.
    async fn transcode(&self, input: &Path, output: &Path) -> MediaResult<()>;

    /// Extract a cover frame as JPEG.
    async fn extract_cover(&self, input: &Path, output: &Path) -> MediaResult<()>;

    /// Probe the transcoded output for metadata.
    async fn probe(&self, input: &Path) -> MediaResult<VideoInfo>;
}

/// Production implementation backed by ffmpeg/ffprobe.
#[derive(Debug, Clone, Default)]
pub struct FfmpegProcessor;

impl FfmpegProcessor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaProcessor for FfmpegProcessor {
    async fn transcode(&self, input: &Path, output: &Path) -> MediaResult<()> {
        let cmd = FfmpegCommand::new(input, output)
            .video_codec("libx264")
            .preset("medium")
            .crf(23)
            .audio_codec("aac")
            .output_args(["-movflags", "+faststart"]);

        FfmpegRunner::new()
            .with_timeout(TRANSCODE_TIMEOUT_SECS)
            .run(&cmd)
            .await?;

        info!("Transcoded {} -> {}", input.display(), output.display());
        Ok(())
    }

    async fn extract_cover(&self, input: &Path, output: &Path) -> MediaResult<()> {
        let cmd = FfmpegCommand::new(input, output)
            .seek(1.0)
            .single_frame()
            .output_args(["-q:v", "2"]);

        FfmpegRunner::new()
            .with_timeout(COVER_TIMEOUT_SECS)
            .run(&cmd)
            .await
    }

    async fn probe(&self, input: &Path) -> MediaResult<VideoInfo> {
        probe_video(input).await
    }
}
