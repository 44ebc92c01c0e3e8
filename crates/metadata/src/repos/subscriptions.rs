//! Subscription repository trait.

use crate::error::MetadataResult;
use crate::models::{SubscriptionRow, SubscriptionUserRow};
use async_trait::async_trait;
use uuid::Uuid;
use vidhub_core::ToggleOutcome;

/// Repository for channel subscriptions.
#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    /// Remove the `(subscriber, channel)` pair if present, otherwise insert
    /// `subscription`. Runs as one transaction against the unique index.
    async fn toggle_subscription(
        &self,
        subscription: &SubscriptionRow,
    ) -> MetadataResult<ToggleOutcome<SubscriptionRow>>;

    /// Subscribers of a channel, with subscriber profiles.
    async fn list_subscribers(&self, channel_id: Uuid)
    -> MetadataResult<Vec<SubscriptionUserRow>>;

    /// Channels a user subscribes to, with channel profiles.
    async fn list_subscribed_channels(
        &self,
        subscriber_id: Uuid,
    ) -> MetadataResult<Vec<SubscriptionUserRow>>;
}
