//! Tweet repository trait.

use crate::error::MetadataResult;
use crate::models::TweetRow;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Repository for tweets.
#[async_trait]
pub trait TweetRepo: Send + Sync {
    /// Create a tweet.
    async fn create_tweet(&self, tweet: &TweetRow) -> MetadataResult<TweetRow>;

    /// Get a tweet by ID.
    async fn get_tweet(&self, tweet_id: Uuid) -> MetadataResult<Option<TweetRow>>;

    /// All tweets of one owner in insertion order.
    async fn list_tweets_by_owner(&self, owner_id: Uuid) -> MetadataResult<Vec<TweetRow>>;

    /// Replace a tweet's content.
    async fn update_tweet_content(
        &self,
        tweet_id: Uuid,
        content: &str,
        updated_at: OffsetDateTime,
    ) -> MetadataResult<Option<TweetRow>>;

    /// Delete a tweet and the likes on it. Returns `false` if it did not exist.
    async fn delete_tweet(&self, tweet_id: Uuid) -> MetadataResult<bool>;
}
