//! Video repository over Postgres.
//!
//! Soft deletion is modelled as `status = 'deleted'`; every read and
//! mutation here filters deleted rows out, and `apply_transcode_result`
//! refuses to resurrect them.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use tracing::{debug, info};

use vshare_models::{clamp_pagination, AuthorBrief, Page, Video, VideoId, VideoStatus};
use vshare_queue::TranscodeResult;

use crate::error::{DbError, DbResult};

const VIDEO_COLUMNS: &str = "v.id, v.author_id, v.title, v.description, v.play_url, v.cover_url, \
     v.duration, v.file_size, v.file_format, v.width, v.height, v.status, \
     v.view_count, v.favorite_count, v.comment_count, v.publish_time, \
     v.created_at, v.updated_at, u.username AS author_username, u.avatar AS author_avatar";

#[derive(Debug, FromRow)]
struct VideoRow {
    id: i64,
    author_id: i64,
    title: String,
    description: String,
    play_url: String,
    cover_url: String,
    duration: i32,
    file_size: i64,
    file_format: String,
    width: i32,
    height: i32,
    status: String,
    view_count: i64,
    favorite_count: i64,
    comment_count: i64,
    publish_time: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_username: Option<String>,
    author_avatar: Option<String>,
}

impl TryFrom<VideoRow> for Video {
    type Error = DbError;

    fn try_from(row: VideoRow) -> Result<Self, Self::Error> {
        let status: VideoStatus = row
            .status
            .parse()
            .map_err(|e: vshare_models::video::UnknownStatus| DbError::invalid_row(e.to_string()))?;

        let author = row.author_username.map(|username| AuthorBrief {
            id: row.author_id,
            username,
            avatar: row.author_avatar,
        });

        Ok(Video {
            id: VideoId(row.id),
            author_id: row.author_id,
            title: row.title,
            description: row.description,
            play_url: row.play_url,
            cover_url: row.cover_url,
            duration: row.duration,
            file_size: row.file_size,
            file_format: row.file_format,
            width: row.width,
            height: row.height,
            status,
            view_count: row.view_count,
            favorite_count: row.favorite_count,
            comment_count: row.comment_count,
            publish_time: row.publish_time,
            created_at: row.created_at,
            updated_at: row.updated_at,
            author,
        })
    }
}

/// Filters for video listings and the relational search fallback.
#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    pub author_id: Option<i64>,
    pub video_id: Option<VideoId>,
    /// Restrict to one lifecycle state; ignored when `only_published` is set
    pub status: Option<VideoStatus>,
    /// Case-insensitive substring match against title and description
    pub query: Option<String>,
    /// Inclusive lower bound on publish_time (epoch seconds)
    pub published_after: Option<i64>,
    /// Inclusive upper bound on publish_time (epoch seconds)
    pub published_before: Option<i64>,
    /// Restrict to published videos only
    pub only_published: bool,
}

/// Repository for video records. Clone freely.
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new record in `pending` state and return its id.
    pub async fn create_pending(
        &self,
        author_id: i64,
        title: &str,
        description: &str,
        file_format: &str,
        file_size: i64,
    ) -> DbResult<VideoId> {
        let row = sqlx::query(
            "INSERT INTO videos (author_id, title, description, file_format, file_size, status) \
             VALUES ($1, $2, $3, $4, $5, 'pending') RETURNING id",
        )
        .bind(author_id)
        .bind(title)
        .bind(description)
        .bind(file_format)
        .bind(file_size)
        .fetch_one(&self.pool)
        .await?;

        let id = VideoId(row.get::<i64, _>("id"));
        debug!("Created pending video {}", id);
        Ok(id)
    }

    /// Fetch a single non-deleted video with author info.
    pub async fn get_by_id(&self, id: VideoId) -> DbResult<Option<Video>> {
        let sql = format!(
            "SELECT {VIDEO_COLUMNS} FROM videos v \
             LEFT JOIN users u ON u.id = v.author_id \
             WHERE v.id = $1 AND v.status != 'deleted'"
        );

        let row: Option<VideoRow> = sqlx::query_as(&sql).bind(id.0).fetch_optional(&self.pool).await?;
        row.map(Video::try_from).transpose()
    }

    /// Fetch many videos by id, preserving the order of `ids`.
    ///
    /// Missing or deleted ids are silently dropped; search hydration
    /// relies on this to tolerate a stale index.
    pub async fn get_by_ids(&self, ids: &[VideoId]) -> DbResult<Vec<Video>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<i64> = ids.iter().map(|id| id.0).collect();
        let sql = format!(
            "SELECT {VIDEO_COLUMNS} FROM videos v \
             LEFT JOIN users u ON u.id = v.author_id \
             WHERE v.id = ANY($1) AND v.status != 'deleted'"
        );

        let rows: Vec<VideoRow> = sqlx::query_as(&sql).bind(&raw).fetch_all(&self.pool).await?;

        let mut by_id = std::collections::HashMap::with_capacity(rows.len());
        for row in rows {
            let video = Video::try_from(row)?;
            by_id.insert(video.id, video);
        }

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// Move a pending record to `transcoding` once its task is enqueued.
    pub async fn mark_transcoding(&self, id: VideoId) -> DbResult<()> {
        sqlx::query(
            "UPDATE videos SET status = 'transcoding', updated_at = now() \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id.0)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Move a pending record to `upload_failed` when enqueue fails.
    pub async fn mark_upload_failed(&self, id: VideoId) -> DbResult<()> {
        sqlx::query(
            "UPDATE videos SET status = 'upload_failed', updated_at = now() \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id.0)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Apply a transcode result. Returns false when the row was deleted
    /// (or never existed), in which case the caller skips index sync.
    ///
    /// Idempotent: re-applying the same result rewrites the same values,
    /// and `publish_time` keeps its first value via COALESCE.
    pub async fn apply_transcode_result(&self, result: &TranscodeResult) -> DbResult<bool> {
        let affected = if result.is_success() {
            sqlx::query(
                "UPDATE videos SET \
                    status = 'published', \
                    play_url = $2, \
                    cover_url = COALESCE($3, cover_url), \
                    duration = COALESCE($4, duration), \
                    width = COALESCE($5, width), \
                    height = COALESCE($6, height), \
                    publish_time = COALESCE(publish_time, $7), \
                    updated_at = now() \
                 WHERE id = $1 AND status != 'deleted'",
            )
            .bind(result.video_id.0)
            .bind(result.play_url.as_deref().unwrap_or_default())
            .bind(result.cover_url.as_deref())
            .bind(result.duration.map(|d| d.round() as i32))
            .bind(result.width)
            .bind(result.height)
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await?
            .rows_affected()
        } else {
            sqlx::query(
                "UPDATE videos SET status = 'transcode_failed', updated_at = now() \
                 WHERE id = $1 AND status != 'deleted'",
            )
            .bind(result.video_id.0)
            .execute(&self.pool)
            .await?
            .rows_affected()
        };

        if affected > 0 {
            info!(
                "Applied transcode result for video {} ({})",
                result.video_id, result.status
            );
        }
        Ok(affected > 0)
    }

    /// Update user-editable metadata.
    pub async fn update_metadata(
        &self,
        id: VideoId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> DbResult<bool> {
        let affected = sqlx::query(
            "UPDATE videos SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                updated_at = now() \
             WHERE id = $1 AND status != 'deleted'",
        )
        .bind(id.0)
        .bind(title)
        .bind(description)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(affected > 0)
    }

    /// Soft-delete a video owned by `author_id`. Returns false when the
    /// video does not exist, belongs to someone else, or is already gone.
    pub async fn soft_delete(&self, id: VideoId, author_id: i64) -> DbResult<bool> {
        let affected = sqlx::query(
            "UPDATE videos SET status = 'deleted', updated_at = now() \
             WHERE id = $1 AND author_id = $2 AND status != 'deleted'",
        )
        .bind(id.0)
        .bind(author_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected > 0 {
            info!("Soft-deleted video {}", id);
        }
        Ok(affected > 0)
    }

    /// List non-deleted videos matching the filter, newest first.
    ///
    /// Published videos order by publish_time, others by created_at.
    pub async fn list_videos(
        &self,
        filter: &VideoFilter,
        page: u32,
        page_size: u32,
    ) -> DbResult<Page<Video>> {
        let (page, page_size) = clamp_pagination(page, page_size);

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM videos v WHERE ");
        push_filter(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {VIDEO_COLUMNS} FROM videos v \
             LEFT JOIN users u ON u.id = v.author_id WHERE "
        ));
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY COALESCE(v.publish_time, 0) DESC, v.created_at DESC");
        qb.push(" LIMIT ").push_bind(page_size as i64);
        qb.push(" OFFSET ").push_bind(((page - 1) * page_size) as i64);

        let rows: Vec<VideoRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        let items = rows
            .into_iter()
            .map(Video::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, total, page, page_size))
    }

    /// Bump the view counter.
    pub async fn increment_view_count(&self, id: VideoId) -> DbResult<()> {
        sqlx::query(
            "UPDATE videos SET view_count = view_count + 1 \
             WHERE id = $1 AND status != 'deleted'",
        )
        .bind(id.0)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn increment_favorite_count(&self, id: VideoId) -> DbResult<()> {
        self.adjust_counter(id, "favorite_count", true).await
    }

    pub async fn decrement_favorite_count(&self, id: VideoId) -> DbResult<()> {
        self.adjust_counter(id, "favorite_count", false).await
    }

    pub async fn increment_comment_count(&self, id: VideoId) -> DbResult<()> {
        self.adjust_counter(id, "comment_count", true).await
    }

    pub async fn decrement_comment_count(&self, id: VideoId) -> DbResult<()> {
        self.adjust_counter(id, "comment_count", false).await
    }

    /// Counter updates saturate at zero; a decrement of an already-zero
    /// counter is a no-op rather than an error.
    async fn adjust_counter(&self, id: VideoId, column: &str, up: bool) -> DbResult<()> {
        // column comes from a fixed set above, never from input
        let sql = if up {
            format!(
                "UPDATE videos SET {column} = {column} + 1 \
                 WHERE id = $1 AND status != 'deleted'"
            )
        } else {
            format!(
                "UPDATE videos SET {column} = {column} - 1 \
                 WHERE id = $1 AND {column} > 0 AND status != 'deleted'"
            )
        };

        sqlx::query(&sql).bind(id.0).execute(&self.pool).await?;
        Ok(())
    }

    /// Stream ids of all published videos, for index rebuilds.
    pub async fn all_published_ids(&self) -> DbResult<Vec<VideoId>> {
        let rows = sqlx::query("SELECT id FROM videos WHERE status = 'published' ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| VideoId(r.get("id"))).collect())
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &VideoFilter) {
    if filter.only_published {
        qb.push("v.status = 'published'");
    } else if let Some(status) = filter.status {
        qb.push("v.status = ").push_bind(status.as_str());
    } else {
        qb.push("v.status != 'deleted'");
    }

    if let Some(author_id) = filter.author_id {
        qb.push(" AND v.author_id = ").push_bind(author_id);
    }
    if let Some(video_id) = filter.video_id {
        qb.push(" AND v.id = ").push_bind(video_id.0);
    }
    if let Some(query) = filter.query.as_deref().filter(|q| !q.trim().is_empty()) {
        let pattern = format!("%{}%", query.trim());
        qb.push(" AND (v.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR v.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(after) = filter.published_after {
        qb.push(" AND v.publish_time >= ").push_bind(after);
    }
    if let Some(before) = filter.published_before {
        qb.push(" AND v.publish_time <= ").push_bind(before);
    }
}
