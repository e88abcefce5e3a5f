//! Object key derivation.
//!
//! Raw uploads live in the private bucket under `{author_id}/{video_id}.{ext}`;
//! transcoded artifacts live in the public bucket under `videos/{video_id}/`.

use vshare_models::VideoId;

/// Key for a raw upload in the private bucket.
pub fn raw_video_key(author_id: i64, video_id: VideoId, format: &str) -> String {
    format!("{}/{}.{}", author_id, video_id, format)
}

/// Key for the transcoded video in the public bucket.
pub fn play_key(video_id: VideoId) -> String {
    format!("videos/{}/video.mp4", video_id)
}

/// Key for the cover image in the public bucket.
pub fn cover_key(video_id: VideoId) -> String {
    format!("videos/{}/cover.jpg", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_shapes() {
        let id = VideoId(7);
        assert_eq!(raw_video_key(42, id, "mp4"), "42/7.mp4");
        assert_eq!(play_key(id), "videos/7/video.mp4");
        assert_eq!(cover_key(id), "videos/7/cover.jpg");
    }
}
