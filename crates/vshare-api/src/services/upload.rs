//! Upload orchestration.
//!
//! The three external writes (record, object, task) are not
//! transactional; the ordering keeps the only reachable inconsistency
//! at "object exists, no task, status=upload_failed", which is
//! observable and recoverable. A failed object write compensates by
//! soft-deleting the just-created record.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info};

use vshare_db::VideoRepository;
use vshare_models::{validate_format, validate_size, VideoId, VideoStatus};
use vshare_queue::{QueueProducer, TranscodeTask};
use vshare_storage::{raw_video_key, ObjectStore};

use crate::error::{ApiError, ApiResult};

const MAX_TITLE_CHARS: usize = 200;

/// Validated upload input.
#[derive(Debug, Clone)]
pub struct UploadInput {
    pub author_id: i64,
    pub title: String,
    pub description: String,
    /// Lowercased extension, already allow-listed
    pub format: String,
}

/// Response body for an accepted upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadSummary {
    pub video_id: VideoId,
    pub status: VideoStatus,
}

/// Record-store writes the saga needs.
#[async_trait]
pub trait UploadRecords: Send + Sync {
    async fn create_pending(&self, input: &UploadInput, size: i64) -> ApiResult<VideoId>;
    /// Compensation for a failed object write.
    async fn rollback_pending(&self, id: VideoId, author_id: i64) -> ApiResult<()>;
    async fn mark_upload_failed(&self, id: VideoId) -> ApiResult<()>;
    async fn mark_transcoding(&self, id: VideoId) -> ApiResult<()>;
}

/// Object-store write the saga needs.
#[async_trait]
pub trait RawObjectSink: Send + Sync {
    async fn put_raw(&self, key: &str, data: Vec<u8>, content_type: &str) -> ApiResult<()>;
    fn raw_bucket(&self) -> String;
}

/// Queue write the saga needs.
#[async_trait]
pub trait TaskSink: Send + Sync {
    async fn send_task(&self, task: &TranscodeTask) -> ApiResult<()>;
}

/// Validate and return the normalized format tag.
fn validate(input: &UploadInput, size: usize) -> ApiResult<String> {
    let title_chars = input.title.trim().chars().count();
    if title_chars == 0 || title_chars > MAX_TITLE_CHARS {
        return Err(ApiError::Validation(format!(
            "title must be 1..={} characters",
            MAX_TITLE_CHARS
        )));
    }
    let format = validate_format(&input.format)?;
    validate_size(size as i64)?;
    Ok(format)
}

/// Run the upload saga. On success the record is in `transcoding`
/// with exactly one task enqueued for it.
pub async fn run_upload_saga(
    records: &dyn UploadRecords,
    objects: &dyn RawObjectSink,
    tasks: &dyn TaskSink,
    input: &UploadInput,
    data: Vec<u8>,
) -> ApiResult<UploadSummary> {
    let format = validate(input, data.len())?;
    let size = data.len() as i64;

    let video_id = records.create_pending(input, size).await?;
    let key = raw_video_key(input.author_id, video_id, &format);

    if let Err(e) = objects
        .put_raw(&key, data, &format!("video/{}", format))
        .await
    {
        error!("Object write failed for video {}, rolling back: {}", video_id, e);
        records.rollback_pending(video_id, input.author_id).await?;
        return Err(e);
    }

    let task = TranscodeTask {
        video_id,
        bucket: objects.raw_bucket(),
        object_key: key,
        file_format: format,
        file_size: size as u64,
    };

    if let Err(e) = tasks.send_task(&task).await {
        // Object already persisted, so keep the record for later repair.
        error!("Enqueue failed for video {}: {}", video_id, e);
        records.mark_upload_failed(video_id).await?;
        return Err(e);
    }

    records.mark_transcoding(video_id).await?;
    info!("Accepted upload for video {} by author {}", video_id, input.author_id);

    Ok(UploadSummary {
        video_id,
        status: VideoStatus::Transcoding,
    })
}

/// Production upload service wired to real clients.
#[derive(Clone)]
pub struct UploadService {
    repo: VideoRepository,
    storage: Arc<ObjectStore>,
    producer: QueueProducer,
    upload_timeout: Duration,
}

impl UploadService {
    pub fn new(
        repo: VideoRepository,
        storage: Arc<ObjectStore>,
        producer: QueueProducer,
        upload_timeout: Duration,
    ) -> Self {
        Self {
            repo,
            storage,
            producer,
            upload_timeout,
        }
    }

    pub async fn upload(&self, input: UploadInput, data: Vec<u8>) -> ApiResult<UploadSummary> {
        let objects = StorageSink {
            storage: Arc::clone(&self.storage),
            timeout: self.upload_timeout,
        };
        run_upload_saga(&self.repo_sink(), &objects, &self.producer_sink(), &input, data).await
    }

    fn repo_sink(&self) -> RepoRecords {
        RepoRecords {
            repo: self.repo.clone(),
        }
    }

    fn producer_sink(&self) -> ProducerSink {
        ProducerSink {
            producer: self.producer.clone(),
        }
    }
}

struct RepoRecords {
    repo: VideoRepository,
}

#[async_trait]
impl UploadRecords for RepoRecords {
    async fn create_pending(&self, input: &UploadInput, size: i64) -> ApiResult<VideoId> {
        Ok(self
            .repo
            .create_pending(
                input.author_id,
                input.title.trim(),
                &input.description,
                &input.format,
                size,
            )
            .await?)
    }

    async fn rollback_pending(&self, id: VideoId, author_id: i64) -> ApiResult<()> {
        self.repo.soft_delete(id, author_id).await?;
        Ok(())
    }

    async fn mark_upload_failed(&self, id: VideoId) -> ApiResult<()> {
        Ok(self.repo.mark_upload_failed(id).await?)
    }

    async fn mark_transcoding(&self, id: VideoId) -> ApiResult<()> {
        Ok(self.repo.mark_transcoding(id).await?)
    }
}

struct StorageSink {
    storage: Arc<ObjectStore>,
    timeout: Duration,
}

#[async_trait]
impl RawObjectSink for StorageSink {
    async fn put_raw(&self, key: &str, data: Vec<u8>, content_type: &str) -> ApiResult<()> {
        Ok(self
            .storage
            .put_raw(key, data, content_type, self.timeout)
            .await?)
    }

    fn raw_bucket(&self) -> String {
        self.storage.raw_bucket().to_string()
    }
}

struct ProducerSink {
    producer: QueueProducer,
}

#[async_trait]
impl TaskSink for ProducerSink {
    async fn send_task(&self, task: &TranscodeTask) -> ApiResult<()> {
        Ok(self.producer.send_task(task).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeRecords {
        statuses: Mutex<Vec<VideoStatus>>,
    }

    impl FakeRecords {
        fn status_of(&self, id: VideoId) -> VideoStatus {
            self.statuses.lock().unwrap()[id.0 as usize]
        }

        fn record_count(&self) -> usize {
            self.statuses.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl UploadRecords for FakeRecords {
        async fn create_pending(&self, _input: &UploadInput, _size: i64) -> ApiResult<VideoId> {
            let mut statuses = self.statuses.lock().unwrap();
            statuses.push(VideoStatus::Pending);
            Ok(VideoId(statuses.len() as i64 - 1))
        }

        async fn rollback_pending(&self, id: VideoId, _author_id: i64) -> ApiResult<()> {
            self.statuses.lock().unwrap()[id.0 as usize] = VideoStatus::Deleted;
            Ok(())
        }

        async fn mark_upload_failed(&self, id: VideoId) -> ApiResult<()> {
            self.statuses.lock().unwrap()[id.0 as usize] = VideoStatus::UploadFailed;
            Ok(())
        }

        async fn mark_transcoding(&self, id: VideoId) -> ApiResult<()> {
            self.statuses.lock().unwrap()[id.0 as usize] = VideoStatus::Transcoding;
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeObjects {
        fail: bool,
        keys: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RawObjectSink for FakeObjects {
        async fn put_raw(&self, key: &str, _data: Vec<u8>, _content_type: &str) -> ApiResult<()> {
            if self.fail {
                return Err(ApiError::internal("object store down"));
            }
            self.keys.lock().unwrap().push(key.to_string());
            Ok(())
        }

        fn raw_bucket(&self) -> String {
            "raw-videos".to_string()
        }
    }

    #[derive(Default)]
    struct FakeTasks {
        fail: bool,
        tasks: Mutex<Vec<TranscodeTask>>,
    }

    #[async_trait]
    impl TaskSink for FakeTasks {
        async fn send_task(&self, task: &TranscodeTask) -> ApiResult<()> {
            if self.fail {
                return Err(ApiError::internal("broker unreachable"));
            }
            self.tasks.lock().unwrap().push(task.clone());
            Ok(())
        }
    }

    fn input() -> UploadInput {
        UploadInput {
            author_id: 42,
            title: "clip".to_string(),
            description: "a clip".to_string(),
            format: "mp4".to_string(),
        }
    }

    #[tokio::test]
    async fn test_happy_path_creates_one_record_and_one_task() {
        let records = FakeRecords::default();
        let objects = FakeObjects::default();
        let tasks = FakeTasks::default();

        let summary = run_upload_saga(&records, &objects, &tasks, &input(), vec![0u8; 1024])
            .await
            .unwrap();

        assert_eq!(summary.status, VideoStatus::Transcoding);
        assert_eq!(records.record_count(), 1);
        assert_eq!(records.status_of(summary.video_id), VideoStatus::Transcoding);

        let sent = tasks.tasks.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].video_id, summary.video_id);
        // The record's object key and the task's source key agree.
        assert_eq!(objects.keys.lock().unwrap()[0], sent[0].object_key);
        assert_eq!(sent[0].object_key, "42/0.mp4");
        assert_eq!(sent[0].file_size, 1024);
    }

    #[tokio::test]
    async fn test_object_write_failure_rolls_back_and_enqueues_nothing() {
        let records = FakeRecords::default();
        let objects = FakeObjects {
            fail: true,
            ..Default::default()
        };
        let tasks = FakeTasks::default();

        let err = run_upload_saga(&records, &objects, &tasks, &input(), vec![0u8; 16])
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Internal(_)));
        assert_eq!(records.status_of(VideoId(0)), VideoStatus::Deleted);
        assert!(tasks.tasks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_enqueue_failure_marks_upload_failed_and_keeps_object() {
        let records = FakeRecords::default();
        let objects = FakeObjects::default();
        let tasks = FakeTasks {
            fail: true,
            ..Default::default()
        };

        let err = run_upload_saga(&records, &objects, &tasks, &input(), vec![0u8; 16])
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Internal(_)));
        assert_eq!(records.status_of(VideoId(0)), VideoStatus::UploadFailed);
        // The object write already happened and is kept.
        assert_eq!(objects.keys.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_rejects_before_any_side_effect() {
        let records = FakeRecords::default();
        let objects = FakeObjects::default();
        let tasks = FakeTasks::default();

        // Empty file
        let err = run_upload_saga(&records, &objects, &tasks, &input(), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        // Disallowed format
        let mut bad = input();
        bad.format = "exe".to_string();
        let err = run_upload_saga(&records, &objects, &tasks, &bad, vec![0u8; 16])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        // Blank title
        let mut bad = input();
        bad.title = "   ".to_string();
        let err = run_upload_saga(&records, &objects, &tasks, &bad, vec![0u8; 16])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        assert_eq!(records.record_count(), 0);
        assert!(objects.keys.lock().unwrap().is_empty());
        assert!(tasks.tasks.lock().unwrap().is_empty());
    }
}
