//! Integration tests for the video repository.
//!
//! These tests require a real PostgreSQL database and use the SQLx
//! test macro for per-test database isolation.
//!
//! Run with: `cargo test --test repository`

use sqlx::{PgPool, Row};

use vshare_db::VideoRepository;
use vshare_models::{VideoId, VideoStatus};
use vshare_queue::TranscodeResult;

async fn seed_author(pool: &PgPool) -> i64 {
    sqlx::query("INSERT INTO users (username) VALUES ('alice') RETURNING id")
        .fetch_one(pool)
        .await
        .unwrap()
        .get("id")
}

async fn seed_transcoding_video(repo: &VideoRepository, author_id: i64) -> VideoId {
    let id = repo
        .create_pending(author_id, "clip", "a clip", "mp4", 1024)
        .await
        .unwrap();
    repo.mark_transcoding(id).await.unwrap();
    id
}

fn published_result(id: VideoId) -> TranscodeResult {
    TranscodeResult::published(
        id,
        "http://cdn/public-videos/videos/video.mp4".to_string(),
        Some("http://cdn/public-videos/videos/cover.jpg".to_string()),
        Some(12.5),
        Some(1920),
        Some(1080),
    )
}

async fn raw_status(pool: &PgPool, id: VideoId) -> String {
    sqlx::query("SELECT status FROM videos WHERE id = $1")
        .bind(id.0)
        .fetch_one(pool)
        .await
        .unwrap()
        .get("status")
}

#[sqlx::test(migrations = "./migrations")]
async fn test_apply_published_result(pool: PgPool) {
    let repo = VideoRepository::new(pool.clone());
    let author_id = seed_author(&pool).await;
    let id = seed_transcoding_video(&repo, author_id).await;

    assert!(repo.apply_transcode_result(&published_result(id)).await.unwrap());

    let video = repo.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(video.status, VideoStatus::Published);
    assert_eq!(video.play_url, "http://cdn/public-videos/videos/video.mp4");
    assert_eq!(video.cover_url, "http://cdn/public-videos/videos/cover.jpg");
    assert_eq!(video.duration, 13);
    assert_eq!(video.width, 1920);
    assert_eq!(video.height, 1080);
    assert!(video.publish_time.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_replaying_published_result_keeps_publish_time(pool: PgPool) {
    let repo = VideoRepository::new(pool.clone());
    let author_id = seed_author(&pool).await;
    let id = seed_transcoding_video(&repo, author_id).await;
    let result = published_result(id);

    assert!(repo.apply_transcode_result(&result).await.unwrap());
    let first = repo.get_by_id(id).await.unwrap().unwrap().publish_time;
    assert!(first.is_some());

    assert!(repo.apply_transcode_result(&result).await.unwrap());
    let second = repo.get_by_id(id).await.unwrap().unwrap().publish_time;
    assert_eq!(second, first);

    // Rewind the stored publish time; a late replay must not move it.
    sqlx::query("UPDATE videos SET publish_time = 1000 WHERE id = $1")
        .bind(id.0)
        .execute(&pool)
        .await
        .unwrap();
    assert!(repo.apply_transcode_result(&result).await.unwrap());
    let video = repo.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(video.publish_time, Some(1000));
    assert_eq!(video.status, VideoStatus::Published);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_result_for_deleted_video_is_dropped(pool: PgPool) {
    let repo = VideoRepository::new(pool.clone());
    let author_id = seed_author(&pool).await;
    let id = seed_transcoding_video(&repo, author_id).await;

    assert!(repo.soft_delete(id, author_id).await.unwrap());
    assert!(!repo.apply_transcode_result(&published_result(id)).await.unwrap());
    assert_eq!(raw_status(&pool, id).await, "deleted");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_failed_result_marks_transcode_failed(pool: PgPool) {
    let repo = VideoRepository::new(pool.clone());
    let author_id = seed_author(&pool).await;
    let id = seed_transcoding_video(&repo, author_id).await;

    let result = TranscodeResult::failed(id, "ffmpeg exited with code 1");
    assert!(repo.apply_transcode_result(&result).await.unwrap());

    let video = repo.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(video.status, VideoStatus::TranscodeFailed);
    assert_eq!(video.play_url, "");
    assert_eq!(video.publish_time, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_counter_decrement_saturates_at_zero(pool: PgPool) {
    let repo = VideoRepository::new(pool.clone());
    let author_id = seed_author(&pool).await;
    let id = seed_transcoding_video(&repo, author_id).await;

    // Fresh record: decrementing an already-zero counter is a no-op.
    repo.decrement_favorite_count(id).await.unwrap();
    let video = repo.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(video.favorite_count, 0);

    repo.increment_favorite_count(id).await.unwrap();
    repo.decrement_favorite_count(id).await.unwrap();
    repo.decrement_favorite_count(id).await.unwrap();
    let video = repo.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(video.favorite_count, 0);

    repo.increment_comment_count(id).await.unwrap();
    repo.decrement_comment_count(id).await.unwrap();
    repo.decrement_comment_count(id).await.unwrap();
    let video = repo.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(video.comment_count, 0);
}
