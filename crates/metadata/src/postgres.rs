//! PostgreSQL-based metadata store implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::models::*;
use crate::repos::{
    CommentRepo, DashboardRepo, LikeRepo, SubscriptionRepo, TweetRepo, UserRepo, VideoRepo,
};
use crate::sql::*;
use crate::store::MetadataStore;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode as SqlxPgSslMode};
use sqlx::{Pool, Postgres, QueryBuilder};
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;
use vidhub_core::config::{PgSslMode, PostgresConfig};
use vidhub_core::{LikeTarget, PageRequest, ToggleOutcome, VideoSort};

/// PostgreSQL schema (embedded).
const POSTGRES_SCHEMA: &str = include_str!("postgres_schema.sql");

fn postgres_schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .filter_map(|statement| {
            let trimmed = statement.trim();
            if trimmed.is_empty() {
                return None;
            }
            let has_sql = trimmed.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            });
            has_sql.then_some(trimmed)
        })
        .collect()
}

/// PostgreSQL-based metadata store.
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    /// Connect, apply the schema and return the store.
    pub async fn connect(config: &PostgresConfig) -> MetadataResult<Self> {
        let mut opts = connect_options(config)?;
        if let Some(timeout_ms) = config.statement_timeout_ms {
            opts = opts.options([("statement_timeout", format!("{timeout_ms}ms"))]);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

fn connect_options(config: &PostgresConfig) -> MetadataResult<PgConnectOptions> {
    if let Some(url) = &config.url {
        tracing::info!("Connecting to PostgreSQL by URL");
        return Ok(PgConnectOptions::from_str(url)?);
    }

    let (Some(host), Some(database)) = (&config.host, &config.database) else {
        return Err(MetadataError::Config(
            "postgres metadata needs either url or host and database".to_string(),
        ));
    };
    let mut opts = PgConnectOptions::new()
        .host(host)
        .port(config.port)
        .database(database);
    if let Some(user) = &config.username {
        opts = opts.username(user);
    }
    if let Some(password) = &config.password {
        opts = opts.password(password);
    }
    if let Some(mode) = config.ssl_mode {
        opts = opts.ssl_mode(match mode {
            PgSslMode::Disable => SqlxPgSslMode::Disable,
            PgSslMode::Prefer => SqlxPgSslMode::Prefer,
            PgSslMode::Require => SqlxPgSslMode::Require,
        });
    }

    tracing::info!(
        host = %host,
        port = config.port,
        database = %database,
        username = config.username.as_deref().unwrap_or("<none>"),
        ssl_mode = ?config.ssl_mode,
        "Connecting to PostgreSQL"
    );
    Ok(opts)
}

#[async_trait]
impl MetadataStore for PostgresStore {
    async fn migrate(&self) -> MetadataResult<()> {
        // PostgreSQL doesn't allow multiple statements in a single prepared statement,
        // so we split the schema and execute each statement separately.
        for statement in postgres_schema_statements(POSTGRES_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

fn push_video_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &VideoFilter) {
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
impl UserRepo for PostgresStore {
    async fn create_user(&self, user: &UserRow) -> MetadataResult<UserRow> {
        let sql = format!(
            "INSERT INTO users (user_id, username, email, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
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
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_user_by_username(&self, username: &str) -> MetadataResult<Option<UserRow>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl VideoRepo for PostgresStore {
    async fn create_video(&self, video: &VideoRow) -> MetadataResult<VideoRow> {
        let sql = format!(
            "INSERT INTO videos (video_id, owner_id, title, description, title_key, search_text, \
             video_file, video_key, thumbnail, thumbnail_key, duration, views, is_published, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {VIDEO_COLUMNS}"
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
        let sql = format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE video_id = $1");
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
             WHERE v.video_id = $1"
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
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {VIDEO_COLUMNS} FROM videos"));
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
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM videos");
        push_video_filter(&mut qb, filter);
        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(to_u64(count))
    }

    async fn list_videos_by_owner(&self, owner_id: Uuid) -> MetadataResult<Vec<VideoRow>> {
        let sql = format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE owner_id = $1 ORDER BY seq");
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

        let current: Option<(String, String)> =
            sqlx::query_as("SELECT title, description FROM videos WHERE video_id = $1 FOR UPDATE")
                .bind(video_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((title, description)) = current else {
            return Ok(None);
        };
        let title = patch.title.clone().unwrap_or(title);
        let description = patch.description.clone().unwrap_or(description);

        let sql = format!(
            "UPDATE videos SET title = $1, description = $2, title_key = $3, search_text = $4, \
             thumbnail = COALESCE($5, thumbnail), \
             thumbnail_key = COALESCE($6, thumbnail_key), \
             updated_at = $7 \
             WHERE video_id = $8 RETURNING {VIDEO_COLUMNS}"
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
            "UPDATE videos SET is_published = NOT is_published, updated_at = $1 \
             WHERE video_id = $2 RETURNING {VIDEO_COLUMNS}"
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

        let sql = format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE video_id = $1");
        let Some(video) = sqlx::query_as::<_, VideoRow>(&sql)
            .bind(video_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let comment_likes = sqlx::query(
            "DELETE FROM likes WHERE target_kind = 'comment' \
             AND target_id IN (SELECT comment_id FROM comments WHERE video_id = $1)",
        )
        .bind(video_id)
        .execute(&mut *tx)
        .await?;
        let video_likes =
            sqlx::query("DELETE FROM likes WHERE target_kind = 'video' AND target_id = $1")
                .bind(video_id)
                .execute(&mut *tx)
                .await?;
        let comments = sqlx::query("DELETE FROM comments WHERE video_id = $1")
            .bind(video_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM videos WHERE video_id = $1")
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
impl CommentRepo for PostgresStore {
    async fn create_comment(&self, comment: &CommentRow) -> MetadataResult<CommentRow> {
        let sql = format!(
            "INSERT INTO comments (comment_id, video_id, owner_id, content, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COMMENT_COLUMNS}"
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
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE comment_id = $1");
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
             WHERE c.video_id = $1 ORDER BY c.seq DESC LIMIT $2 OFFSET $3"
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
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE video_id = $1")
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
            "UPDATE comments SET content = $1, updated_at = $2 WHERE comment_id = $3 \
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
        sqlx::query("DELETE FROM likes WHERE target_kind = 'comment' AND target_id = $1")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM comments WHERE comment_id = $1")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LikeRepo for PostgresStore {
    async fn toggle_like(&self, like: &LikeRow) -> MetadataResult<ToggleOutcome<LikeRow>> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            "DELETE FROM likes WHERE user_id = $1 AND target_kind = $2 AND target_id = $3",
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
             VALUES ($1, $2, $3, $4, $5, $6) \
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
                "DELETE FROM likes WHERE user_id = $1 AND target_kind = $2 AND target_id = $3",
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
             WHERE user_id = $1 AND target_kind = $2 AND target_id = $3"
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
            "SELECT COUNT(*) FROM likes WHERE target_kind = $1 AND target_id = $2",
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
             WHERE l.user_id = $1 AND l.target_kind = 'video' ORDER BY l.seq"
        );
        let rows = sqlx::query_as::<_, LikedVideoRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl SubscriptionRepo for PostgresStore {
    async fn toggle_subscription(
        &self,
        subscription: &SubscriptionRow,
    ) -> MetadataResult<ToggleOutcome<SubscriptionRow>> {
        let mut tx = self.pool.begin().await?;

        let removed =
            sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = $1 AND channel_id = $2")
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
             VALUES ($1, $2, $3, $4, $5) \
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
                "DELETE FROM subscriptions WHERE subscriber_id = $1 AND channel_id = $2",
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
             WHERE s.channel_id = $1 ORDER BY s.seq",
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
             WHERE s.subscriber_id = $1 ORDER BY s.seq",
        )
        .bind(subscriber_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl TweetRepo for PostgresStore {
    async fn create_tweet(&self, tweet: &TweetRow) -> MetadataResult<TweetRow> {
        let sql = format!(
            "INSERT INTO tweets (tweet_id, owner_id, content, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {TWEET_COLUMNS}"
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
        let sql = format!("SELECT {TWEET_COLUMNS} FROM tweets WHERE tweet_id = $1");
        let row = sqlx::query_as::<_, TweetRow>(&sql)
            .bind(tweet_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_tweets_by_owner(&self, owner_id: Uuid) -> MetadataResult<Vec<TweetRow>> {
        let sql = format!("SELECT {TWEET_COLUMNS} FROM tweets WHERE owner_id = $1 ORDER BY seq");
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
            "UPDATE tweets SET content = $1, updated_at = $2 WHERE tweet_id = $3 \
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
        sqlx::query("DELETE FROM likes WHERE target_kind = 'tweet' AND target_id = $1")
            .bind(tweet_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM tweets WHERE tweet_id = $1")
            .bind(tweet_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl DashboardRepo for PostgresStore {
    async fn channel_stats(&self, channel_id: Uuid) -> MetadataResult<ChannelStats> {
        let stats = sqlx::query_as::<_, ChannelStats>(
            "SELECT \
             (SELECT COUNT(*) FROM videos WHERE owner_id = $1) AS total_videos, \
             (SELECT COALESCE(SUM(views), 0)::BIGINT FROM videos WHERE owner_id = $1) AS total_views, \
             (SELECT COUNT(*) FROM likes WHERE video_owner_id = $1) AS total_likes, \
             (SELECT COUNT(*) FROM subscriptions WHERE channel_id = $1) AS total_subscribers",
        )
        .bind(channel_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}
