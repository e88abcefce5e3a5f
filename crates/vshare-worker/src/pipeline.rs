//! The transcode pipeline for one task.
//!
//! Every task runs inside its own temporary directory, removed on all
//! exit paths when the `TempDir` drops. Any fatal step resolves into a
//! failure result rather than an error escaping to the consume loop.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tracing::{error, info, warn};

use vshare_media::MediaProcessor;
use vshare_queue::{TranscodeResult, TranscodeTask};
use vshare_storage::{cover_key, play_key, ObjectStore, StorageResult};

use crate::error::WorkerResult;

/// Blob operations the pipeline needs; narrow so tests can fake it.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Download a raw upload to a local path.
    async fn download_to(&self, key: &str, dest: &Path) -> StorageResult<()>;

    /// Upload a local file to the public bucket.
    async fn upload_public(&self, key: &str, src: &Path, content_type: &str) -> StorageResult<()>;

    /// Public URL for a key in the public bucket.
    fn public_url(&self, key: &str) -> String;
}

/// Production blob store backed by the S3 client.
pub struct S3BlobStore {
    store: ObjectStore,
    download_timeout: Duration,
    upload_timeout: Duration,
}

impl S3BlobStore {
    pub fn new(store: ObjectStore, download_timeout: Duration, upload_timeout: Duration) -> Self {
        Self {
            store,
            download_timeout,
            upload_timeout,
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn download_to(&self, key: &str, dest: &Path) -> StorageResult<()> {
        self.store
            .download_raw_to_file(key, dest, self.download_timeout)
            .await
    }

    async fn upload_public(&self, key: &str, src: &Path, content_type: &str) -> StorageResult<()> {
        self.store
            .put_public_file(key, src, content_type, self.upload_timeout)
            .await
    }

    fn public_url(&self, key: &str) -> String {
        self.store.public_url(key)
    }
}

/// Process one task to a terminal result. Never errors; any fatal step
/// becomes a `transcode_failed` result carrying the cause.
pub async fn process_task(
    media: &dyn MediaProcessor,
    store: &dyn BlobStore,
    task: &TranscodeTask,
) -> TranscodeResult {
    info!(
        "Processing transcode task for video {} ({}, {} bytes)",
        task.video_id, task.file_format, task.file_size
    );

    match run_pipeline(media, store, task).await {
        Ok(result) => {
            info!("Video {} transcoded successfully", task.video_id);
            result
        }
        Err(e) => {
            error!("Transcode failed for video {}: {}", task.video_id, e);
            TranscodeResult::failed(task.video_id, e.to_string())
        }
    }
}

async fn run_pipeline(
    media: &dyn MediaProcessor,
    store: &dyn BlobStore,
    task: &TranscodeTask,
) -> WorkerResult<TranscodeResult> {
    let workdir = TempDir::new()?;

    let source = workdir.path().join(format!("source.{}", task.file_format));
    store.download_to(&task.object_key, &source).await?;

    let output = workdir.path().join("video.mp4");
    media.transcode(&source, &output).await?;

    // Non-fatal: publish without a cover if extraction fails.
    let cover_path = workdir.path().join("cover.jpg");
    let cover_extracted = match media.extract_cover(&output, &cover_path).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Cover extraction failed for video {}: {}", task.video_id, e);
            false
        }
    };

    // Non-fatal: missing metadata defaults to zero.
    let info = match media.probe(&output).await {
        Ok(info) => Some(info),
        Err(e) => {
            warn!("Probe failed for video {}: {}", task.video_id, e);
            None
        }
    };

    let video_key = play_key(task.video_id);
    store.upload_public(&video_key, &output, "video/mp4").await?;

    let cover_url = if cover_extracted {
        let key = cover_key(task.video_id);
        match store.upload_public(&key, &cover_path, "image/jpeg").await {
            Ok(()) => Some(store.public_url(&key)),
            Err(e) => {
                warn!("Cover upload failed for video {}: {}", task.video_id, e);
                None
            }
        }
    } else {
        None
    };

    Ok(TranscodeResult::published(
        task.video_id,
        store.public_url(&video_key),
        cover_url,
        info.as_ref().map(|i| i.duration),
        info.as_ref().map(|i| i.width),
        info.as_ref().map(|i| i.height),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;

    use vshare_media::{MediaError, MediaResult, VideoInfo};
    use vshare_models::{VideoId, VideoStatus};
    use vshare_storage::StorageError;

    #[derive(Default)]
    struct StubMedia {
        fail_transcode: bool,
        fail_cover: bool,
        fail_probe: bool,
    }

    #[async_trait]
    impl MediaProcessor for StubMedia {
        async fn transcode(&self, input: &Path, output: &Path) -> MediaResult<()> {
            if self.fail_transcode {
                return Err(MediaError::ffmpeg_failed("stub transcode failure", None, Some(1)));
            }
            assert!(input.exists());
            tokio::fs::write(output, b"transcoded").await?;
            Ok(())
        }

        async fn extract_cover(&self, _input: &Path, output: &Path) -> MediaResult<()> {
            if self.fail_cover {
                return Err(MediaError::ffmpeg_failed("stub cover failure", None, Some(1)));
            }
            tokio::fs::write(output, b"jpeg").await?;
            Ok(())
        }

        async fn probe(&self, _input: &Path) -> MediaResult<VideoInfo> {
            if self.fail_probe {
                return Err(MediaError::InvalidVideo("stub probe failure".to_string()));
            }
            Ok(VideoInfo {
                duration: 24.0,
                width: 1280,
                height: 720,
            })
        }
    }

    #[derive(Default)]
    struct MemoryBlobStore {
        raw: Mutex<HashMap<String, Vec<u8>>>,
        public: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl MemoryBlobStore {
        fn with_raw(key: &str, bytes: &[u8]) -> Self {
            let store = Self::default();
            store.raw.lock().unwrap().insert(key.to_string(), bytes.to_vec());
            store
        }

        fn public_keys(&self) -> Vec<String> {
            let mut keys: Vec<_> = self.public.lock().unwrap().keys().cloned().collect();
            keys.sort();
            keys
        }
    }

    #[async_trait]
    impl BlobStore for MemoryBlobStore {
        async fn download_to(&self, key: &str, dest: &Path) -> StorageResult<()> {
            let bytes = self
                .raw
                .lock()
                .unwrap()
                .get(key)
                .cloned()
                .ok_or_else(|| StorageError::not_found(key))?;
            tokio::fs::write(dest, bytes).await?;
            Ok(())
        }

        async fn upload_public(&self, key: &str, src: &Path, _content_type: &str) -> StorageResult<()> {
            let bytes = tokio::fs::read(src).await?;
            self.public.lock().unwrap().insert(key.to_string(), bytes);
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("http://cdn.test/public-videos/{}", key)
        }
    }

    fn task() -> TranscodeTask {
        TranscodeTask {
            video_id: VideoId(7),
            bucket: "raw-videos".to_string(),
            object_key: "42/7.mp4".to_string(),
            file_format: "mp4".to_string(),
            file_size: 8,
        }
    }

    #[tokio::test]
    async fn test_success_path() {
        let store = MemoryBlobStore::with_raw("42/7.mp4", b"raw bits");
        let media = StubMedia::default();

        let result = process_task(&media, &store, &task()).await;

        assert_eq!(result.status, VideoStatus::Published);
        assert_eq!(
            result.play_url.as_deref(),
            Some("http://cdn.test/public-videos/videos/7/video.mp4")
        );
        assert_eq!(
            result.cover_url.as_deref(),
            Some("http://cdn.test/public-videos/videos/7/cover.jpg")
        );
        assert_eq!(result.duration, Some(24.0));
        assert_eq!(result.width, Some(1280));
        assert_eq!(result.height, Some(720));
        assert_eq!(
            store.public_keys(),
            vec!["videos/7/cover.jpg".to_string(), "videos/7/video.mp4".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_source_fails() {
        let store = MemoryBlobStore::default();
        let media = StubMedia::default();

        let result = process_task(&media, &store, &task()).await;

        assert_eq!(result.status, VideoStatus::TranscodeFailed);
        assert!(result.error.as_deref().unwrap().contains("42/7.mp4"));
        assert!(store.public_keys().is_empty());
    }

    #[tokio::test]
    async fn test_transcode_failure_fails() {
        let store = MemoryBlobStore::with_raw("42/7.mp4", b"raw bits");
        let media = StubMedia {
            fail_transcode: true,
            ..Default::default()
        };

        let result = process_task(&media, &store, &task()).await;

        assert_eq!(result.status, VideoStatus::TranscodeFailed);
        assert!(result.error.is_some());
        assert!(store.public_keys().is_empty());
    }

    #[tokio::test]
    async fn test_cover_failure_is_non_fatal() {
        let store = MemoryBlobStore::with_raw("42/7.mp4", b"raw bits");
        let media = StubMedia {
            fail_cover: true,
            ..Default::default()
        };

        let result = process_task(&media, &store, &task()).await;

        assert_eq!(result.status, VideoStatus::Published);
        assert!(result.play_url.is_some());
        assert_eq!(result.cover_url, None);
        assert_eq!(store.public_keys(), vec!["videos/7/video.mp4".to_string()]);
    }

    #[tokio::test]
    async fn test_probe_failure_is_non_fatal() {
        let store = MemoryBlobStore::with_raw("42/7.mp4", b"raw bits");
        let media = StubMedia {
            fail_probe: true,
            ..Default::default()
        };

        let result = process_task(&media, &store, &task()).await;

        assert_eq!(result.status, VideoStatus::Published);
        assert_eq!(result.duration, None);
        assert_eq!(result.width, None);
        assert_eq!(result.height, None);
    }
}
