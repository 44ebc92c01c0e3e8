//! Tweet endpoints.
//!
//! Tweets are always owner-checked: mutations must name an acting user and
//! that user must own the tweet.

use crate::envelope::ApiResponse;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiPath;
use crate::handlers::common::{OwnerPolicy, authorize_owner, non_blank, read_json_body, require_user};
use crate::identity::{ActingUser, acting_user};
use crate::state::AppState;
use axum::extract::{Request, State};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use vidhub_core::{EntityKind, parse_id};
use vidhub_metadata::models::TweetRow;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetResponse {
    pub id: Uuid,
    pub owner: Uuid,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<TweetRow> for TweetResponse {
    fn from(row: TweetRow) -> Self {
        Self {
            id: row.tweet_id,
            owner: row.owner_id,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetBody {
    pub user_id: Option<String>,
    pub content: Option<String>,
}

/// Load a tweet and check that `actor` owns it.
async fn owned_tweet(
    state: &AppState,
    tweet_id: Uuid,
    actor: ActingUser,
    body_user_id: Option<&str>,
    action: &str,
) -> ApiResult<TweetRow> {
    let actor = actor.resolve(body_user_id)?;
    let tweet = state
        .metadata
        .get_tweet(tweet_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tweet not found".to_string()))?;
    authorize_owner(
        OwnerPolicy::Required,
        actor,
        tweet.owner_id,
        action,
        EntityKind::Tweet,
    )?;
    Ok(tweet)
}

/// POST /tweets
pub async fn create_tweet(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<ApiResponse<TweetResponse>> {
    let actor = acting_user(&req);
    let body: TweetBody = read_json_body(req).await?;

    let content = non_blank(body.content.as_deref()).ok_or_else(|| {
        ApiError::BadRequest("Content is required to create a tweet".to_string())
    })?;
    let owner_id = actor
        .resolve(body.user_id.as_deref())?
        .ok_or_else(ApiError::unauthenticated)?;
    require_user(&state, owner_id, "User").await?;

    let now = OffsetDateTime::now_utc();
    let tweet = state
        .metadata
        .create_tweet(&TweetRow {
            seq: 0,
            tweet_id: Uuid::new_v4(),
            owner_id,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        })
        .await?;

    crate::metrics::TWEETS_CREATED.inc();
    tracing::debug!(tweet_id = %tweet.tweet_id, owner_id = %owner_id, "Tweet created");

    Ok(ApiResponse::created(TweetResponse::from(tweet)).with_message("Tweet created successfully"))
}

/// GET /tweets/{user_id} - A user's tweets in insertion order.
pub async fn list_user_tweets(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<String>,
) -> ApiResult<ApiResponse<Vec<TweetResponse>>> {
    let user_id = parse_id(EntityKind::User, &user_id)?;
    require_user(&state, user_id, "User").await?;

    let tweets = state.metadata.list_tweets_by_owner(user_id).await?;

    Ok(
        ApiResponse::new(tweets.into_iter().map(TweetResponse::from).collect())
            .with_message("Tweets retrieved successfully"),
    )
}

/// PATCH /tweets/{tweet_id} - Replace a tweet's content. Blank content keeps
/// the stored text.
pub async fn update_tweet(
    State(state): State<AppState>,
    ApiPath(tweet_id): ApiPath<String>,
    req: Request,
) -> ApiResult<ApiResponse<TweetResponse>> {
    let tweet_id = parse_id(EntityKind::Tweet, &tweet_id)?;
    let actor = acting_user(&req);
    let body: TweetBody = read_json_body(req).await?;

    let tweet = owned_tweet(&state, tweet_id, actor, body.user_id.as_deref(), "update").await?;
    let content = non_blank(body.content.as_deref()).unwrap_or(&tweet.content);

    let updated = state
        .metadata
        .update_tweet_content(tweet_id, content, OffsetDateTime::now_utc())
        .await?
        .ok_or_else(|| ApiError::NotFound("Tweet not found".to_string()))?;

    Ok(ApiResponse::new(TweetResponse::from(updated)).with_message("Tweet updated successfully"))
}

/// DELETE /tweets/{tweet_id} - Delete a tweet and the likes on it.
pub async fn delete_tweet(
    State(state): State<AppState>,
    ApiPath(tweet_id): ApiPath<String>,
    req: Request,
) -> ApiResult<ApiResponse<Option<()>>> {
    let tweet_id = parse_id(EntityKind::Tweet, &tweet_id)?;
    let actor = acting_user(&req);
    let body: TweetBody = read_json_body(req).await?;

    owned_tweet(&state, tweet_id, actor, body.user_id.as_deref(), "delete").await?;

    if !state.metadata.delete_tweet(tweet_id).await? {
        return Err(ApiError::NotFound("Tweet not found".to_string()));
    }
    tracing::debug!(tweet_id = %tweet_id, "Tweet deleted");

    Ok(ApiResponse::empty("Tweet deleted successfully"))
}
