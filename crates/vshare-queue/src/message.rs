//! Messages exchanged over the task and result topics.
//!
//! Both message types key their Kafka record by `video-{id}` so that all
//! messages for one video land on the same partition and stay ordered.

use serde::{Deserialize, Serialize};

use vshare_models::{VideoId, VideoStatus};

/// A transcode task, produced by the API when an upload is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscodeTask {
    pub video_id: VideoId,
    /// Bucket holding the raw upload
    pub bucket: String,
    /// Object key of the raw upload
    pub object_key: String,
    /// Container format of the raw upload (e.g. "mp4")
    pub file_format: String,
    /// Size of the raw upload in bytes
    pub file_size: u64,
}

impl TranscodeTask {
    pub fn partition_key(&self) -> String {
        self.video_id.partition_key()
    }
}

/// A transcode result, produced by a worker when a task finishes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscodeResult {
    pub video_id: VideoId,
    /// Terminal status for this attempt: `published` or `transcode_failed`
    pub status: VideoStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    /// Duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    /// Failure description when status is `transcode_failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranscodeResult {
    /// Successful result carrying the published asset URLs and metadata.
    pub fn published(
        video_id: VideoId,
        play_url: String,
        cover_url: Option<String>,
        duration: Option<f64>,
        width: Option<i32>,
        height: Option<i32>,
    ) -> Self {
        Self {
            video_id,
            status: VideoStatus::Published,
            play_url: Some(play_url),
            cover_url,
            duration,
            width,
            height,
            error: None,
        }
    }

    /// Failed result carrying the failure reason.
    pub fn failed(video_id: VideoId, error: impl Into<String>) -> Self {
        Self {
            video_id,
            status: VideoStatus::TranscodeFailed,
            play_url: None,
            cover_url: None,
            duration: None,
            width: None,
            height: None,
            error: Some(error.into()),
        }
    }

    pub fn partition_key(&self) -> String {
        self.video_id.partition_key()
    }

    pub fn is_success(&self) -> bool {
        self.status == VideoStatus::Published
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_partition_key() {
        let task = TranscodeTask {
            video_id: VideoId(42),
            bucket: "raw-videos".to_string(),
            object_key: "1/42.mp4".to_string(),
            file_format: "mp4".to_string(),
            file_size: 1024,
        };
        assert_eq!(task.partition_key(), "video-42");
    }

    #[test]
    fn test_result_constructors() {
        let ok = TranscodeResult::published(
            VideoId(7),
            "http://cdn/videos/7/video.mp4".to_string(),
            Some("http://cdn/videos/7/cover.jpg".to_string()),
            Some(12.5),
            Some(1920),
            Some(1080),
        );
        assert!(ok.is_success());
        assert_eq!(ok.partition_key(), "video-7");

        let failed = TranscodeResult::failed(VideoId(7), "ffmpeg exited with code 1");
        assert!(!failed.is_success());
        assert_eq!(failed.status, VideoStatus::TranscodeFailed);
        assert_eq!(failed.play_url, None);
    }

    #[test]
    fn test_result_roundtrip_omits_empty_fields() {
        let failed = TranscodeResult::failed(VideoId(9), "boom");
        let json = serde_json::to_string(&failed).unwrap();
        assert!(!json.contains("play_url"));
        assert!(json.contains("\"status\":\"transcode_failed\""));

        let back: TranscodeResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, failed);
    }
}
