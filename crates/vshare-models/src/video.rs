//! Video record and publication state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a video record, assigned by the record store at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub i64);

impl VideoId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// Partition key used for queue messages about this video.
    ///
    /// Tasks and results for one video share this key, so the broker
    /// delivers them in order and never to two consumers at once.
    pub fn partition_key(&self) -> String {
        format!("video-{}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for VideoId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Lifecycle state of a video record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    /// Record created, raw object not yet durable
    #[default]
    Pending,
    /// Raw object stored and transcode task enqueued
    Transcoding,
    /// Transcode succeeded, artifacts publicly playable
    Published,
    /// Transcode failed; recovery is a fresh upload
    TranscodeFailed,
    /// Object stored but the task could not be enqueued
    UploadFailed,
    /// Soft-deleted (terminal)
    Deleted,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Pending => "pending",
            VideoStatus::Transcoding => "transcoding",
            VideoStatus::Published => "published",
            VideoStatus::TranscodeFailed => "transcode_failed",
            VideoStatus::UploadFailed => "upload_failed",
            VideoStatus::Deleted => "deleted",
        }
    }

    /// Whether `self -> next` is a legal transition.
    ///
    /// Per-video ordering comes from the queue partition key, so these
    /// checks only guard against logic errors, not races.
    pub fn can_transition_to(&self, next: VideoStatus) -> bool {
        use VideoStatus::*;
        match (self, next) {
            // Explicit delete is allowed from any non-deleted state.
            (Deleted, _) => false,
            (_, Deleted) => true,
            (Pending, Transcoding) | (Pending, UploadFailed) => true,
            (Transcoding, Published) | (Transcoding, TranscodeFailed) => true,
            _ => false,
        }
    }

    /// States that carry playable artifacts.
    pub fn is_published(&self) -> bool {
        matches!(self, VideoStatus::Published)
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VideoStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VideoStatus::Pending),
            "transcoding" => Ok(VideoStatus::Transcoding),
            "published" => Ok(VideoStatus::Published),
            "transcode_failed" => Ok(VideoStatus::TranscodeFailed),
            "upload_failed" => Ok(VideoStatus::UploadFailed),
            "deleted" => Ok(VideoStatus::Deleted),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Error for an unrecognized status string from the record store.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown video status: {0}")]
pub struct UnknownStatus(pub String);

/// Brief author info embedded in listings and search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorBrief {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// The durable row representing one uploaded video and its lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: VideoId,
    pub author_id: i64,
    pub title: String,
    pub description: String,

    /// Public playback URL; empty until the video is published
    #[serde(default)]
    pub play_url: String,
    /// Public cover image URL; empty until published (and possibly after,
    /// if cover extraction failed)
    #[serde(default)]
    pub cover_url: String,

    /// Duration in seconds, populated by the transcode probe
    #[serde(default)]
    pub duration: i32,
    pub file_size: i64,
    pub file_format: String,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,

    pub status: VideoStatus,

    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub favorite_count: i64,
    #[serde(default)]
    pub comment_count: i64,

    /// Epoch seconds of the transcoding -> published transition; set once
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Author info, present when hydrated with a join
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorBrief>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for s in [
            VideoStatus::Pending,
            VideoStatus::Transcoding,
            VideoStatus::Published,
            VideoStatus::TranscodeFailed,
            VideoStatus::UploadFailed,
            VideoStatus::Deleted,
        ] {
            assert_eq!(s.as_str().parse::<VideoStatus>().unwrap(), s);
        }
        assert!("bogus".parse::<VideoStatus>().is_err());
    }

    #[test]
    fn test_transition_table() {
        use VideoStatus::*;

        assert!(Pending.can_transition_to(Transcoding));
        assert!(Pending.can_transition_to(UploadFailed));
        assert!(Pending.can_transition_to(Deleted));
        assert!(Transcoding.can_transition_to(Published));
        assert!(Transcoding.can_transition_to(TranscodeFailed));
        assert!(Published.can_transition_to(Deleted));
        assert!(TranscodeFailed.can_transition_to(Deleted));

        // No skipping or reversing.
        assert!(!Pending.can_transition_to(Published));
        assert!(!Transcoding.can_transition_to(Pending));
        assert!(!Published.can_transition_to(Transcoding));
        assert!(!TranscodeFailed.can_transition_to(Published));

        // Deleted is terminal.
        assert!(!Deleted.can_transition_to(Pending));
        assert!(!Deleted.can_transition_to(Published));
        assert!(!Deleted.can_transition_to(Deleted));
    }

    #[test]
    fn test_partition_key() {
        assert_eq!(VideoId(42).partition_key(), "video-42");
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&VideoStatus::TranscodeFailed).unwrap();
        assert_eq!(json, "\"transcode_failed\"");
    }
}
