//! Video repository trait.

use crate::error::MetadataResult;
use crate::models::{DeletedVideo, VideoFilter, VideoPatch, VideoRow, VideoWithOwnerRow};
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;
use vidhub_core::{PageRequest, VideoSort};

/// Repository for videos.
#[async_trait]
pub trait VideoRepo: Send + Sync {
    /// Create a video.
    async fn create_video(&self, video: &VideoRow) -> MetadataResult<VideoRow>;

    /// Get a video by ID.
    async fn get_video(&self, video_id: Uuid) -> MetadataResult<Option<VideoRow>>;

    /// Get a video with its owner's username populated.
    async fn get_video_with_owner(
        &self,
        video_id: Uuid,
    ) -> MetadataResult<Option<VideoWithOwnerRow>>;

    /// One page of videos matching `filter`, in `sort` order.
    async fn list_videos(
        &self,
        filter: &VideoFilter,
        sort: VideoSort,
        page: PageRequest,
    ) -> MetadataResult<Vec<VideoRow>>;

    /// Total number of videos matching `filter`.
    async fn count_videos(&self, filter: &VideoFilter) -> MetadataResult<u64>;

    /// All videos of one owner in insertion order.
    async fn list_videos_by_owner(&self, owner_id: Uuid) -> MetadataResult<Vec<VideoRow>>;

    /// Apply a partial update. Returns the updated row, or `None` if the video
    /// does not exist.
    async fn update_video(
        &self,
        video_id: Uuid,
        patch: &VideoPatch,
        updated_at: OffsetDateTime,
    ) -> MetadataResult<Option<VideoRow>>;

    /// Flip `is_published` in a single statement.
    async fn toggle_publish(
        &self,
        video_id: Uuid,
        updated_at: OffsetDateTime,
    ) -> MetadataResult<Option<VideoRow>>;

    /// Delete a video together with its comments, the likes on the video and
    /// the likes on its comments, atomically.
    async fn delete_video(&self, video_id: Uuid) -> MetadataResult<Option<DeletedVideo>>;
}
