//! Like repository trait.

use crate::error::MetadataResult;
use crate::models::{LikeRow, LikedVideoRow};
use async_trait::async_trait;
use uuid::Uuid;
use vidhub_core::{LikeTarget, ToggleOutcome};

/// Repository for likes.
#[async_trait]
pub trait LikeRepo: Send + Sync {
    /// Remove the like matching `like`'s user and target if present,
    /// otherwise insert `like`. Runs as one transaction against the unique
    /// `(user_id, target_kind, target_id)` index.
    async fn toggle_like(&self, like: &LikeRow) -> MetadataResult<ToggleOutcome<LikeRow>>;

    /// Get the like a user placed on a target.
    async fn get_like(
        &self,
        user_id: Uuid,
        target: LikeTarget,
        target_id: Uuid,
    ) -> MetadataResult<Option<LikeRow>>;

    /// Number of likes on a target.
    async fn count_likes(&self, target: LikeTarget, target_id: Uuid) -> MetadataResult<u64>;

    /// Videos liked by a user, in like order.
    async fn list_liked_videos(&self, user_id: Uuid) -> MetadataResult<Vec<LikedVideoRow>>;
}
