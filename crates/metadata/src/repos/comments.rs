//! Comment repository trait.

use crate::error::MetadataResult;
use crate::models::{CommentRow, CommentWithOwnerRow};
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;
use vidhub_core::PageRequest;

/// Repository for comments.
#[async_trait]
pub trait CommentRepo: Send + Sync {
    /// Create a comment.
    async fn create_comment(&self, comment: &CommentRow) -> MetadataResult<CommentRow>;

    /// Get a comment by ID.
    async fn get_comment(&self, comment_id: Uuid) -> MetadataResult<Option<CommentRow>>;

    /// One page of a video's comments, newest first, with author usernames.
    async fn list_comments_for_video(
        &self,
        video_id: Uuid,
        page: PageRequest,
    ) -> MetadataResult<Vec<CommentWithOwnerRow>>;

    /// Number of comments on a video.
    async fn count_comments_for_video(&self, video_id: Uuid) -> MetadataResult<u64>;

    /// Replace a comment's content.
    async fn update_comment_content(
        &self,
        comment_id: Uuid,
        content: &str,
        updated_at: OffsetDateTime,
    ) -> MetadataResult<Option<CommentRow>>;

    /// Delete a comment and the likes on it. Returns `false` if it did not exist.
    async fn delete_comment(&self, comment_id: Uuid) -> MetadataResult<bool>;
}
