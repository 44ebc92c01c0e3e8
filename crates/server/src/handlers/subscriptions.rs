//! Channel subscription endpoints.

use crate::envelope::ApiResponse;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiPath;
use crate::handlers::common::{UserSummary, read_json_body, require_user};
use crate::identity::acting_user;
use crate::state::AppState;
use axum::extract::{Request, State};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use vidhub_core::{EntityKind, ToggleOutcome, parse_id};
use vidhub_metadata::models::{SubscriptionRow, SubscriptionUserRow};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub subscriber: Uuid,
    pub channel: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<SubscriptionRow> for SubscriptionResponse {
    fn from(row: SubscriptionRow) -> Self {
        Self {
            id: row.subscription_id,
            subscriber: row.subscriber_id,
            channel: row.channel_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A subscriber of a channel, with the subscriber's profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberEntry {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub subscribed_at: OffsetDateTime,
    pub subscriber: UserSummary,
}

/// A channel a user subscribes to, with the channel's profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelEntry {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub subscribed_at: OffsetDateTime,
    pub channel: UserSummary,
}

fn summary(row: &SubscriptionUserRow) -> UserSummary {
    UserSummary {
        id: row.user_id,
        username: row.username.clone(),
        email: row.email.clone(),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionBody {
    pub user_id: Option<String>,
}

/// POST /subscriptions/{channel_id} - Subscribe or unsubscribe.
pub async fn toggle_subscription(
    State(state): State<AppState>,
    ApiPath(channel_id): ApiPath<String>,
    req: Request,
) -> ApiResult<ApiResponse<Option<SubscriptionResponse>>> {
    let channel_id = parse_id(EntityKind::Channel, &channel_id)?;
    let actor = acting_user(&req);
    let body: SubscriptionBody = read_json_body(req).await?;
    let subscriber_id = actor
        .resolve(body.user_id.as_deref())?
        .ok_or_else(ApiError::unauthenticated)?;

    require_user(&state, subscriber_id, "User").await?;
    require_user(&state, channel_id, "Channel").await?;

    let outcome = state
        .metadata
        .toggle_subscription(&SubscriptionRow::new(subscriber_id, channel_id))
        .await?;
    crate::metrics::record_toggle("subscription", outcome.label());
    tracing::info!(
        subscriber_id = %subscriber_id,
        channel_id = %channel_id,
        outcome = outcome.label(),
        "Subscription toggled"
    );

    Ok(match outcome {
        ToggleOutcome::Added(row) => ApiResponse::new(Some(SubscriptionResponse::from(row)))
            .with_message("Subscribed successfully"),
        ToggleOutcome::Removed => ApiResponse::new(None).with_message("Unsubscribed successfully"),
    })
}

/// GET /subscriptions/{channel_id}/subscribers
pub async fn list_subscribers(
    State(state): State<AppState>,
    ApiPath(channel_id): ApiPath<String>,
) -> ApiResult<ApiResponse<Vec<SubscriberEntry>>> {
    let channel_id = parse_id(EntityKind::Channel, &channel_id)?;
    require_user(&state, channel_id, "Channel").await?;

    let subscribers = state
        .metadata
        .list_subscribers(channel_id)
        .await?
        .iter()
        .map(|row| SubscriberEntry {
            id: row.subscription_id,
            subscribed_at: row.subscribed_at,
            subscriber: summary(row),
        })
        .collect();

    Ok(ApiResponse::new(subscribers).with_message("Subscribers retrieved successfully"))
}

/// GET /subscriptions/{subscriber_id}/channels
pub async fn list_subscribed_channels(
    State(state): State<AppState>,
    ApiPath(subscriber_id): ApiPath<String>,
) -> ApiResult<ApiResponse<Vec<ChannelEntry>>> {
    let subscriber_id = parse_id(EntityKind::User, &subscriber_id)?;
    require_user(&state, subscriber_id, "User").await?;

    let channels = state
        .metadata
        .list_subscribed_channels(subscriber_id)
        .await?
        .iter()
        .map(|row| ChannelEntry {
            id: row.subscription_id,
            subscribed_at: row.subscribed_at,
            channel: summary(row),
        })
        .collect();

    Ok(ApiResponse::new(channels).with_message("Subscribed channels retrieved successfully"))
}
