//! The indexed video document and its derived ranking score.

use serde::{Deserialize, Serialize};

use vshare_models::{Video, VideoId, VideoStatus};

/// Engagement-weighted popularity score.
///
/// Favorites weigh the most, comments next, raw views least. Scaled
/// down so typical scores stay in a small range. Recomputed from the
/// live counters on every sync, never stored incrementally.
pub fn hot_score(view_count: i64, favorite_count: i64, comment_count: i64) -> f64 {
    (0.5 * view_count as f64 + 2.0 * favorite_count as f64 + 1.5 * comment_count as f64) / 1000.0
}

/// Denormalized copy of a published video, stored in the search index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoDocument {
    pub id: VideoId,
    pub author_id: i64,
    pub author_name: String,
    pub title: String,
    pub description: String,
    pub status: VideoStatus,
    /// Epoch seconds
    pub publish_time: i64,
    pub view_count: i64,
    pub favorite_count: i64,
    pub comment_count: i64,
    pub hot_score: f64,
    pub duration: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&Video> for VideoDocument {
    fn from(video: &Video) -> Self {
        Self {
            id: video.id,
            author_id: video.author_id,
            author_name: video
                .author
                .as_ref()
                .map(|a| a.username.clone())
                .unwrap_or_default(),
            title: video.title.clone(),
            description: video.description.clone(),
            status: video.status,
            publish_time: video.publish_time.unwrap_or(0),
            view_count: video.view_count,
            favorite_count: video.favorite_count,
            comment_count: video.comment_count,
            hot_score: hot_score(video.view_count, video.favorite_count, video.comment_count),
            duration: video.duration,
            created_at: video.created_at.timestamp(),
            updated_at: video.updated_at.timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hot_score_weights() {
        assert!((hot_score(100, 10, 5) - 0.0775).abs() < 1e-9);
        assert_eq!(hot_score(0, 0, 0), 0.0);
        // Favorites dominate views per unit.
        assert!(hot_score(0, 10, 0) > hot_score(10, 0, 0));
    }
}
