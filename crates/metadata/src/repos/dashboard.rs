//! Channel dashboard aggregates.

use crate::error::MetadataResult;
use crate::models::ChannelStats;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for channel statistics.
#[async_trait]
pub trait DashboardRepo: Send + Sync {
    /// Video count, total views, likes on the channel's videos and subscriber
    /// count, read in a single statement.
    async fn channel_stats(&self, channel_id: Uuid) -> MetadataResult<ChannelStats>;
}
