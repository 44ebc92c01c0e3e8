//! Database models mapping to the metadata schema.
//!
//! Every table carries an insertion sequence (`seq`) next to its UUID key.
//! Listings order by `seq` so records created in the same instant keep their
//! insertion order.

use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;
use vidhub_core::LikeTarget;

// =============================================================================
// Users
// =============================================================================

/// User account record.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub seq: i64,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl UserRow {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            seq: 0,
            user_id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Videos
// =============================================================================

/// Video record. `video_key`/`thumbnail_key` are the storage keys behind the
/// public `video_file`/`thumbnail` locations.
#[derive(Debug, Clone, FromRow)]
pub struct VideoRow {
    pub seq: i64,
    pub video_id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub video_key: String,
    pub thumbnail: String,
    pub thumbnail_key: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Video joined with its owner's username.
#[derive(Debug, Clone, FromRow)]
pub struct VideoWithOwnerRow {
    #[sqlx(flatten)]
    pub video: VideoRow,
    pub owner_username: String,
}

/// A replacement media asset: public location plus storage key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub url: String,
    pub key: String,
}

/// Partial update of a video's details. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct VideoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<MediaRef>,
}

/// Filter for the paginated video listing.
#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    /// Restrict to one owner.
    pub owner_id: Option<Uuid>,
    /// Free text; a video matches when any whitespace-separated term occurs
    /// in its title or description (case-insensitive).
    pub search: Option<String>,
}

impl VideoFilter {
    /// Search terms, lowercased. Empty when there is no search.
    pub fn terms(&self) -> Vec<String> {
        self.search
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_lowercase).collect())
            .unwrap_or_default()
    }
}

// =============================================================================
// Comments
// =============================================================================

/// Comment record.
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub seq: i64,
    pub comment_id: Uuid,
    pub video_id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Comment joined with its author's username.
#[derive(Debug, Clone, FromRow)]
pub struct CommentWithOwnerRow {
    #[sqlx(flatten)]
    pub comment: CommentRow,
    pub owner_username: String,
}

// =============================================================================
// Likes
// =============================================================================

/// Like record. Exactly one target, identified by `(target_kind, target_id)`.
/// `video_owner_id` is denormalized from the liked video for dashboard counts
/// and is `None` for comment and tweet likes.
#[derive(Debug, Clone, FromRow)]
pub struct LikeRow {
    pub seq: i64,
    pub like_id: Uuid,
    pub user_id: Uuid,
    pub target_kind: String,
    pub target_id: Uuid,
    pub video_owner_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

impl LikeRow {
    pub fn new(user_id: Uuid, target: LikeTarget, target_id: Uuid) -> Self {
        Self {
            seq: 0,
            like_id: Uuid::new_v4(),
            user_id,
            target_kind: target.as_str().to_string(),
            target_id,
            video_owner_id: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn with_video_owner(mut self, owner_id: Uuid) -> Self {
        self.video_owner_id = Some(owner_id);
        self
    }
}

/// A like on a video, joined with the video.
#[derive(Debug, Clone, FromRow)]
pub struct LikedVideoRow {
    pub like_id: Uuid,
    pub liked_at: OffsetDateTime,
    #[sqlx(flatten)]
    pub video: VideoRow,
}

// =============================================================================
// Subscriptions
// =============================================================================

/// Subscription of `subscriber_id` to the channel `channel_id`.
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub seq: i64,
    pub subscription_id: Uuid,
    pub subscriber_id: Uuid,
    pub channel_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl SubscriptionRow {
    pub fn new(subscriber_id: Uuid, channel_id: Uuid) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            seq: 0,
            subscription_id: Uuid::new_v4(),
            subscriber_id,
            channel_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One side of a subscription joined with that user's profile. For subscriber
/// listings the user is the subscriber; for channel listings it is the channel.
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionUserRow {
    pub subscription_id: Uuid,
    pub subscribed_at: OffsetDateTime,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

// =============================================================================
// Tweets
// =============================================================================

/// Tweet record.
#[derive(Debug, Clone, FromRow)]
pub struct TweetRow {
    pub seq: i64,
    pub tweet_id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Aggregate counters for one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct ChannelStats {
    pub total_videos: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_subscribers: i64,
}

/// What a cascading video delete removed.
#[derive(Debug, Clone)]
pub struct DeletedVideo {
    pub video: VideoRow,
    pub comments_deleted: u64,
    pub likes_deleted: u64,
}
