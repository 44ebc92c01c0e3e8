//! Metadata store trait and implementations.

use crate::error::{MetadataError, MetadataResult};
use crate::repos::{
    CommentRepo, DashboardRepo, LikeRepo, SubscriptionRepo, TweetRepo, UserRepo, VideoRepo,
};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore:
    UserRepo
    + VideoRepo
    + CommentRepo
    + LikeRepo
    + SubscriptionRepo
    + TweetRepo
    + DashboardRepo
    + Send
    + Sync
{
    /// Run database migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;

    /// Backend name for logs and the health endpoint.
    fn backend_name(&self) -> &'static str;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Create a new SQLite store.
    ///
    /// `query_timeout_secs` is advisory: SQLite cannot cancel a running
    /// statement, so the value is only reported at startup.
    pub async fn new(
        path: impl AsRef<Path>,
        query_timeout_secs: Option<u64>,
    ) -> MetadataResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // A single connection serializes writers; toggles rely on this.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        if let Some(secs) = query_timeout_secs {
            tracing::debug!(
                query_timeout_secs = secs,
                "SQLite query timeout is advisory only; use PostgreSQL for enforced timeouts"
            );
        }

        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

// Implement all the repository traits for SqliteStore
mod sqlite_impl {
    use super::*;
    use crate::models::*;
    use crate::sql::*;
    use sqlx::QueryBuilder;
    use time::OffsetDateTime;
    use uuid::Uuid;
    use vidhub_core::{LikeTarget, PageRequest, ToggleOutcome, VideoSort};

    fn push_video_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &VideoFilter) {
        let mut joiner = " WHERE ";
        if let Some(owner_id) = filter.owner_id {
            qb.push(joiner).push("owner_id = ").push_bind(owner_id);
            joiner = " AND ";
        }
        let terms = filter.terms();
        if !terms.is_empty() {
            qb.push(joiner).push("(");
            for (i, term) in terms.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push("search_text LIKE ")
                    .push_bind(contains_pattern(term))
                    .push(" ESCAPE '\\'");
            }
            qb.push(")");
        }
    }

    #[async_trait]
    impl UserRepo for SqliteStore {
        async fn create_user(&self, user: &UserRow) -> MetadataResult<UserRow> {
            let sql = format!(
                "INSERT INTO users (user_id, username, email, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
            );
            sqlx::query_as::<_, UserRow>(&sql)
                .bind(user.user_id)
                .bind(&user.username)
                .bind(&user.email)
                .bind(user.created_at)
                .bind(user.updated_at)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    MetadataError::from_write(e, || format!("username '{}'", user.username))
                })
        }

        async fn get_user(&self, user_id: Uuid) -> MetadataResult<Option<UserRow>> {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?");
            let row = sqlx::query_as::<_, UserRow>(&sql)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn get_user_by_username(&self, username: &str) -> MetadataResult<Option<UserRow>> {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?");
            let row = sqlx::query_as::<_, UserRow>(&sql)
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }
    }

    #[async_trait]
    impl VideoRepo for SqliteStore {
        async fn create_video(&self, video: &VideoRow) -> MetadataResult<VideoRow> {
            let sql = format!(
                "INSERT INTO videos (video_id, owner_id, title, description, title_key, search_text, \
                 video_file, video_key, thumbnail, thumbnail_key, duration, views, is_published, \
                 created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {VIDEO_COLUMNS}"
            );
            sqlx::query_as::<_, VideoRow>(&sql)
                .bind(video.video_id)
                .bind(video.owner_id)
                .bind(&video.title)
                .bind(&video.description)
                .bind(title_key(&video.title))
                .bind(search_text(&video.title, &video.description))
                .bind(&video.video_file)
                .bind(&video.video_key)
                .bind(&video.thumbnail)
                .bind(&video.thumbnail_key)
                .bind(video.duration)
                .bind(video.views)
                .bind(video.is_published)
                .bind(video.created_at)
                .bind(video.updated_at)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| MetadataError::from_write(e, || format!("video {}", video.video_id)))
        }

        async fn get_video(&self, video_id: Uuid) -> MetadataResult<Option<VideoRow>> {
            let sql = format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE video_id = ?");
            let row = sqlx::query_as::<_, VideoRow>(&sql)
                .bind(video_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn get_video_with_owner(
            &self,
            video_id: Uuid,
        ) -> MetadataResult<Option<VideoWithOwnerRow>> {
            let sql = format!(
                "SELECT {VIDEO_COLUMNS_V}, u.username AS owner_username \
                 FROM videos v JOIN users u ON u.user_id = v.owner_id \
                 WHERE v.video_id = ?"
            );
            let row = sqlx::query_as::<_, VideoWithOwnerRow>(&sql)
                .bind(video_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn list_videos(
            &self,
            filter: &VideoFilter,
            sort: VideoSort,
            page: PageRequest,
        ) -> MetadataResult<Vec<VideoRow>> {
            let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {VIDEO_COLUMNS} FROM videos"));
            push_video_filter(&mut qb, filter);
            qb.push(" ORDER BY ")
                .push(sort.order_by())
                .push(" LIMIT ")
                .push_bind(to_i64(page.limit()))
                .push(" OFFSET ")
                .push_bind(to_i64(page.offset()));
            let rows = qb
                .build_query_as::<VideoRow>()
                .fetch_all(&self.pool)
                .await?;
            Ok(rows)
        }

        async fn count_videos(&self, filter: &VideoFilter) -> MetadataResult<u64> {
            let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM videos");
            push_video_filter(&mut qb, filter);
            let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
            Ok(to_u64(count))
        }

        async fn list_videos_by_owner(&self, owner_id: Uuid) -> MetadataResult<Vec<VideoRow>> {
            let sql = format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE owner_id = ? ORDER BY seq");
            let rows = sqlx::query_as::<_, VideoRow>(&sql)
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?;
            Ok(rows)
        }

        async fn update_video(
            &self,
            video_id: Uuid,
            patch: &VideoPatch,
            updated_at: OffsetDateTime,
        ) -> MetadataResult<Option<VideoRow>> {
            let mut tx = self.pool.begin().await?;

            // The derived text columns need the merged title and description.
            let current: Option<(String, String)> =
                sqlx::query_as("SELECT title, description FROM videos WHERE video_id = ?")
                    .bind(video_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let Some((title, description)) = current else {
                return Ok(None);
            };
            let title = patch.title.clone().unwrap_or(title);
            let description = patch.description.clone().unwrap_or(description);

            let sql = format!(
                "UPDATE videos SET title = ?, description = ?, title_key = ?, search_text = ?, \
                 thumbnail = COALESCE(?, thumbnail), \
                 thumbnail_key = COALESCE(?, thumbnail_key), \
                 updated_at = ? \
                 WHERE video_id = ? RETURNING {VIDEO_COLUMNS}"
            );
            let row = sqlx::query_as::<_, VideoRow>(&sql)
                .bind(&title)
                .bind(&description)
                .bind(title_key(&title))
                .bind(search_text(&title, &description))
                .bind(patch.thumbnail.as_ref().map(|t| t.url.as_str()))
                .bind(patch.thumbnail.as_ref().map(|t| t.key.as_str()))
                .bind(updated_at)
                .bind(video_id)
                .fetch_optional(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok(row)
        }

        async fn toggle_publish(
            &self,
            video_id: Uuid,
            updated_at: OffsetDateTime,
        ) -> MetadataResult<Option<VideoRow>> {
            let sql = format!(
                "UPDATE videos SET is_published = NOT is_published, updated_at = ? \
                 WHERE video_id = ? RETURNING {VIDEO_COLUMNS}"
            );
            let row = sqlx::query_as::<_, VideoRow>(&sql)
                .bind(updated_at)
                .bind(video_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn delete_video(&self, video_id: Uuid) -> MetadataResult<Option<DeletedVideo>> {
            let mut tx = self.pool.begin().await?;

            let sql = format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE video_id = ?");
            let Some(video) = sqlx::query_as::<_, VideoRow>(&sql)
                .bind(video_id)
                .fetch_optional(&mut *tx)
                .await?
            else {
                return Ok(None);
            };

            let comment_likes = sqlx::query(
                "DELETE FROM likes WHERE target_kind = 'comment' \
                 AND target_id IN (SELECT comment_id FROM comments WHERE video_id = ?)",
            )
            .bind(video_id)
            .execute(&mut *tx)
            .await?;
            let video_likes =
                sqlx::query("DELETE FROM likes WHERE target_kind = 'video' AND target_id = ?")
                    .bind(video_id)
                    .execute(&mut *tx)
                    .await?;
            let comments = sqlx::query("DELETE FROM comments WHERE video_id = ?")
                .bind(video_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM videos WHERE video_id = ?")
                .bind(video_id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;

            Ok(Some(DeletedVideo {
                video,
                comments_deleted: comments.rows_affected(),
                likes_deleted: comment_likes.rows_affected() + video_likes.rows_affected(),
            }))
        }
    }

    #[async_trait]
    impl CommentRepo for SqliteStore {
        async fn create_comment(&self, comment: &CommentRow) -> MetadataResult<CommentRow> {
            let sql = format!(
                "INSERT INTO comments (comment_id, video_id, owner_id, content, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?) RETURNING {COMMENT_COLUMNS}"
            );
            sqlx::query_as::<_, CommentRow>(&sql)
                .bind(comment.comment_id)
                .bind(comment.video_id)
                .bind(comment.owner_id)
                .bind(&comment.content)
                .bind(comment.created_at)
                .bind(comment.updated_at)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    MetadataError::from_write(e, || format!("comment {}", comment.comment_id))
                })
        }

        async fn get_comment(&self, comment_id: Uuid) -> MetadataResult<Option<CommentRow>> {
            let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE comment_id = ?");
            let row = sqlx::query_as::<_, CommentRow>(&sql)
                .bind(comment_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn list_comments_for_video(
            &self,
            video_id: Uuid,
            page: PageRequest,
        ) -> MetadataResult<Vec<CommentWithOwnerRow>> {
            let sql = format!(
                "SELECT {COMMENT_COLUMNS_C}, u.username AS owner_username \
                 FROM comments c JOIN users u ON u.user_id = c.owner_id \
                 WHERE c.video_id = ? ORDER BY c.seq DESC LIMIT ? OFFSET ?"
            );
            let rows = sqlx::query_as::<_, CommentWithOwnerRow>(&sql)
                .bind(video_id)
                .bind(to_i64(page.limit()))
                .bind(to_i64(page.offset()))
                .fetch_all(&self.pool)
                .await?;
            Ok(rows)
        }

        async fn count_comments_for_video(&self, video_id: Uuid) -> MetadataResult<u64> {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE video_id = ?")
                .bind(video_id)
                .fetch_one(&self.pool)
                .await?;
            Ok(to_u64(count))
        }

        async fn update_comment_content(
            &self,
            comment_id: Uuid,
            content: &str,
            updated_at: OffsetDateTime,
        ) -> MetadataResult<Option<CommentRow>> {
            let sql = format!(
                "UPDATE comments SET content = ?, updated_at = ? WHERE comment_id = ? \
                 RETURNING {COMMENT_COLUMNS}"
            );
            let row = sqlx::query_as::<_, CommentRow>(&sql)
                .bind(content)
                .bind(updated_at)
                .bind(comment_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn delete_comment(&self, comment_id: Uuid) -> MetadataResult<bool> {
            let mut tx = self.pool.begin().await?;
            sqlx::query("DELETE FROM likes WHERE target_kind = 'comment' AND target_id = ?")
                .bind(comment_id)
                .execute(&mut *tx)
                .await?;
            let result = sqlx::query("DELETE FROM comments WHERE comment_id = ?")
                .bind(comment_id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok(result.rows_affected() > 0)
        }
    }

    #[async_trait]
    impl LikeRepo for SqliteStore {
        async fn toggle_like(&self, like: &LikeRow) -> MetadataResult<ToggleOutcome<LikeRow>> {
            let mut tx = self.pool.begin().await?;

            let removed = sqlx::query(
                "DELETE FROM likes WHERE user_id = ? AND target_kind = ? AND target_id = ?",
            )
            .bind(like.user_id)
            .bind(&like.target_kind)
            .bind(like.target_id)
            .execute(&mut *tx)
            .await?;

            if removed.rows_affected() > 0 {
                tx.commit().await?;
                return Ok(ToggleOutcome::Removed);
            }

            let sql = format!(
                "INSERT INTO likes (like_id, user_id, target_kind, target_id, video_owner_id, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?) \
                 ON CONFLICT (user_id, target_kind, target_id) DO NOTHING \
                 RETURNING {LIKE_COLUMNS}"
            );
            let inserted = sqlx::query_as::<_, LikeRow>(&sql)
                .bind(like.like_id)
                .bind(like.user_id)
                .bind(&like.target_kind)
                .bind(like.target_id)
                .bind(like.video_owner_id)
                .bind(like.created_at)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    MetadataError::from_write(e, || {
                        format!("like on {} {}", like.target_kind, like.target_id)
                    })
                })?;

            let Some(row) = inserted else {
                // A concurrent toggle inserted the same like first; this one undoes it.
                sqlx::query(
                    "DELETE FROM likes WHERE user_id = ? AND target_kind = ? AND target_id = ?",
                )
                .bind(like.user_id)
                .bind(&like.target_kind)
                .bind(like.target_id)
                .execute(&mut *tx)
                .await?;
                tx.commit().await?;
                return Ok(ToggleOutcome::Removed);
            };

            tx.commit().await?;
            Ok(ToggleOutcome::Added(row))
        }

        async fn get_like(
            &self,
            user_id: Uuid,
            target: LikeTarget,
            target_id: Uuid,
        ) -> MetadataResult<Option<LikeRow>> {
            let sql = format!(
                "SELECT {LIKE_COLUMNS} FROM likes \
                 WHERE user_id = ? AND target_kind = ? AND target_id = ?"
            );
            let row = sqlx::query_as::<_, LikeRow>(&sql)
                .bind(user_id)
                .bind(target.as_str())
                .bind(target_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn count_likes(&self, target: LikeTarget, target_id: Uuid) -> MetadataResult<u64> {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM likes WHERE target_kind = ? AND target_id = ?",
            )
            .bind(target.as_str())
            .bind(target_id)
            .fetch_one(&self.pool)
            .await?;
            Ok(to_u64(count))
        }

        async fn list_liked_videos(&self, user_id: Uuid) -> MetadataResult<Vec<LikedVideoRow>> {
            let sql = format!(
                "SELECT l.like_id, l.created_at AS liked_at, {VIDEO_COLUMNS_V} \
                 FROM likes l JOIN videos v ON v.video_id = l.target_id \
                 WHERE l.user_id = ? AND l.target_kind = 'video' ORDER BY l.seq"
            );
            let rows = sqlx::query_as::<_, LikedVideoRow>(&sql)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
            Ok(rows)
        }
    }

    #[async_trait]
    impl SubscriptionRepo for SqliteStore {
        async fn toggle_subscription(
            &self,
            subscription: &SubscriptionRow,
        ) -> MetadataResult<ToggleOutcome<SubscriptionRow>> {
            let mut tx = self.pool.begin().await?;

            let removed =
                sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = ? AND channel_id = ?")
                    .bind(subscription.subscriber_id)
                    .bind(subscription.channel_id)
                    .execute(&mut *tx)
                    .await?;

            if removed.rows_affected() > 0 {
                tx.commit().await?;
                return Ok(ToggleOutcome::Removed);
            }

            let sql = format!(
                "INSERT INTO subscriptions (subscription_id, subscriber_id, channel_id, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?) \
                 ON CONFLICT (subscriber_id, channel_id) DO NOTHING \
                 RETURNING {SUBSCRIPTION_COLUMNS}"
            );
            let inserted = sqlx::query_as::<_, SubscriptionRow>(&sql)
                .bind(subscription.subscription_id)
                .bind(subscription.subscriber_id)
                .bind(subscription.channel_id)
                .bind(subscription.created_at)
                .bind(subscription.updated_at)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    MetadataError::from_write(e, || {
                        format!("subscription to channel {}", subscription.channel_id)
                    })
                })?;

            let Some(row) = inserted else {
                // A concurrent toggle inserted the same pair first; this one undoes it.
                sqlx::query(
                    "DELETE FROM subscriptions WHERE subscriber_id = ? AND channel_id = ?",
                )
                .bind(subscription.subscriber_id)
                .bind(subscription.channel_id)
                .execute(&mut *tx)
                .await?;
                tx.commit().await?;
                return Ok(ToggleOutcome::Removed);
            };

            tx.commit().await?;
            Ok(ToggleOutcome::Added(row))
        }

        async fn list_subscribers(
            &self,
            channel_id: Uuid,
        ) -> MetadataResult<Vec<SubscriptionUserRow>> {
            let rows = sqlx::query_as::<_, SubscriptionUserRow>(
                "SELECT s.subscription_id, s.created_at AS subscribed_at, \
                 u.user_id, u.username, u.email \
                 FROM subscriptions s JOIN users u ON u.user_id = s.subscriber_id \
                 WHERE s.channel_id = ? ORDER BY s.seq",
            )
            .bind(channel_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn list_subscribed_channels(
            &self,
            subscriber_id: Uuid,
        ) -> MetadataResult<Vec<SubscriptionUserRow>> {
            let rows = sqlx::query_as::<_, SubscriptionUserRow>(
                "SELECT s.subscription_id, s.created_at AS subscribed_at, \
                 u.user_id, u.username, u.email \
                 FROM subscriptions s JOIN users u ON u.user_id = s.channel_id \
                 WHERE s.subscriber_id = ? ORDER BY s.seq",
            )
            .bind(subscriber_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }
    }

    #[async_trait]
    impl TweetRepo for SqliteStore {
        async fn create_tweet(&self, tweet: &TweetRow) -> MetadataResult<TweetRow> {
            let sql = format!(
                "INSERT INTO tweets (tweet_id, owner_id, content, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?) RETURNING {TWEET_COLUMNS}"
            );
            sqlx::query_as::<_, TweetRow>(&sql)
                .bind(tweet.tweet_id)
                .bind(tweet.owner_id)
                .bind(&tweet.content)
                .bind(tweet.created_at)
                .bind(tweet.updated_at)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| MetadataError::from_write(e, || format!("tweet {}", tweet.tweet_id)))
        }

        async fn get_tweet(&self, tweet_id: Uuid) -> MetadataResult<Option<TweetRow>> {
            let sql = format!("SELECT {TWEET_COLUMNS} FROM tweets WHERE tweet_id = ?");
            let row = sqlx::query_as::<_, TweetRow>(&sql)
                .bind(tweet_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn list_tweets_by_owner(&self, owner_id: Uuid) -> MetadataResult<Vec<TweetRow>> {
            let sql = format!("SELECT {TWEET_COLUMNS} FROM tweets WHERE owner_id = ? ORDER BY seq");
            let rows = sqlx::query_as::<_, TweetRow>(&sql)
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?;
            Ok(rows)
        }

        async fn update_tweet_content(
            &self,
            tweet_id: Uuid,
            content: &str,
            updated_at: OffsetDateTime,
        ) -> MetadataResult<Option<TweetRow>> {
            let sql = format!(
                "UPDATE tweets SET content = ?, updated_at = ? WHERE tweet_id = ? \
                 RETURNING {TWEET_COLUMNS}"
            );
            let row = sqlx::query_as::<_, TweetRow>(&sql)
                .bind(content)
                .bind(updated_at)
                .bind(tweet_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn delete_tweet(&self, tweet_id: Uuid) -> MetadataResult<bool> {
            let mut tx = self.pool.begin().await?;
            sqlx::query("DELETE FROM likes WHERE target_kind = 'tweet' AND target_id = ?")
                .bind(tweet_id)
                .execute(&mut *tx)
                .await?;
            let result = sqlx::query("DELETE FROM tweets WHERE tweet_id = ?")
                .bind(tweet_id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok(result.rows_affected() > 0)
        }
    }

    #[async_trait]
    impl DashboardRepo for SqliteStore {
        async fn channel_stats(&self, channel_id: Uuid) -> MetadataResult<ChannelStats> {
            let stats = sqlx::query_as::<_, ChannelStats>(
                "SELECT \
                 (SELECT COUNT(*) FROM videos WHERE owner_id = ?1) AS total_videos, \
                 (SELECT COALESCE(SUM(views), 0) FROM videos WHERE owner_id = ?1) AS total_views, \
                 (SELECT COUNT(*) FROM likes WHERE video_owner_id = ?1) AS total_likes, \
                 (SELECT COUNT(*) FROM subscriptions WHERE channel_id = ?1) AS total_subscribers",
            )
            .bind(channel_id)
            .fetch_one(&self.pool)
            .await?;
            Ok(stats)
        }
    }
}

/// SQL schema for SQLite.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id BLOB NOT NULL UNIQUE,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS videos (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    video_id BLOB NOT NULL UNIQUE,
    owner_id BLOB NOT NULL REFERENCES users(user_id),
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    title_key TEXT NOT NULL DEFAULT '',
    search_text TEXT NOT NULL DEFAULT '',
    video_file TEXT NOT NULL,
    video_key TEXT NOT NULL,
    thumbnail TEXT NOT NULL,
    thumbnail_key TEXT NOT NULL,
    duration REAL NOT NULL DEFAULT 0,
    views INTEGER NOT NULL DEFAULT 0,
    is_published INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_videos_owner ON videos(owner_id, seq);

CREATE TABLE IF NOT EXISTS comments (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    comment_id BLOB NOT NULL UNIQUE,
    video_id BLOB NOT NULL REFERENCES videos(video_id),
    owner_id BLOB NOT NULL REFERENCES users(user_id),
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_comments_video ON comments(video_id, seq);

-- One like per (user, target). The target is polymorphic so it carries no foreign key
CREATE TABLE IF NOT EXISTS likes (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    like_id BLOB NOT NULL UNIQUE,
    user_id BLOB NOT NULL REFERENCES users(user_id),
    target_kind TEXT NOT NULL CHECK (target_kind IN ('video', 'comment', 'tweet')),
    target_id BLOB NOT NULL,
    video_owner_id BLOB,
    created_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_likes_user_target ON likes(user_id, target_kind, target_id);
CREATE INDEX IF NOT EXISTS idx_likes_target ON likes(target_kind, target_id);
CREATE INDEX IF NOT EXISTS idx_likes_video_owner ON likes(video_owner_id);

CREATE TABLE IF NOT EXISTS subscriptions (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    subscription_id BLOB NOT NULL UNIQUE,
    subscriber_id BLOB NOT NULL REFERENCES users(user_id),
    channel_id BLOB NOT NULL REFERENCES users(user_id),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_subscriptions_pair ON subscriptions(subscriber_id, channel_id);
CREATE INDEX IF NOT EXISTS idx_subscriptions_channel ON subscriptions(channel_id);

CREATE TABLE IF NOT EXISTS tweets (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    tweet_id BLOB NOT NULL UNIQUE,
    owner_id BLOB NOT NULL REFERENCES users(user_id),
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tweets_owner ON tweets(owner_id, seq);
"#;
