//! Like endpoints.

use crate::envelope::ApiResponse;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiPath, ApiQuery};
use crate::handlers::common::{non_blank, read_json_body, require_user};
use crate::handlers::videos::VideoResponse;
use crate::identity::acting_user;
use crate::state::AppState;
use axum::extract::{Request, State};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use vidhub_core::{LikeTarget, ToggleOutcome, parse_id};
use vidhub_metadata::models::{LikeRow, LikedVideoRow};

/// Like as returned by the API. Exactly one of `video`, `comment`, `tweet`
/// is present.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub id: Uuid,
    pub user: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweet: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_owner: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl LikeResponse {
    fn new(row: LikeRow, target: LikeTarget) -> Self {
        let target_of = |kind: LikeTarget| (kind == target).then_some(row.target_id);
        Self {
            id: row.like_id,
            user: row.user_id,
            video: target_of(LikeTarget::Video),
            comment: target_of(LikeTarget::Comment),
            tweet: target_of(LikeTarget::Tweet),
            video_owner: row.video_owner_id,
            created_at: row.created_at,
        }
    }
}

/// A liked video with the video populated.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideoResponse {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub liked_at: OffsetDateTime,
    pub video: VideoResponse,
}

impl From<LikedVideoRow> for LikedVideoResponse {
    fn from(row: LikedVideoRow) -> Self {
        Self {
            id: row.like_id,
            liked_at: row.liked_at,
            video: row.video.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeBody {
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideosQuery {
    pub user_id: Option<String>,
}

/// POST /likes/video/{video_id}
pub async fn toggle_video_like(
    State(state): State<AppState>,
    ApiPath(video_id): ApiPath<String>,
    req: Request,
) -> ApiResult<ApiResponse<Option<LikeResponse>>> {
    toggle_like(&state, LikeTarget::Video, &video_id, req).await
}

/// POST /likes/comment/{comment_id}
pub async fn toggle_comment_like(
    State(state): State<AppState>,
    ApiPath(comment_id): ApiPath<String>,
    req: Request,
) -> ApiResult<ApiResponse<Option<LikeResponse>>> {
    toggle_like(&state, LikeTarget::Comment, &comment_id, req).await
}

/// POST /likes/tweet/{tweet_id}
pub async fn toggle_tweet_like(
    State(state): State<AppState>,
    ApiPath(tweet_id): ApiPath<String>,
    req: Request,
) -> ApiResult<ApiResponse<Option<LikeResponse>>> {
    toggle_like(&state, LikeTarget::Tweet, &tweet_id, req).await
}

async fn toggle_like(
    state: &AppState,
    target: LikeTarget,
    raw_target_id: &str,
    req: Request,
) -> ApiResult<ApiResponse<Option<LikeResponse>>> {
    let target_id = parse_id(target.entity(), raw_target_id)?;
    let actor = acting_user(&req);
    let body: LikeBody = read_json_body(req).await?;
    let user_id = actor
        .resolve(body.user_id.as_deref())?
        .ok_or_else(ApiError::unauthenticated)?;

    // Video likes carry the video's owner for dashboard counts.
    let video_owner = match target {
        LikeTarget::Video => Some(
            state
                .metadata
                .get_video(target_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?
                .owner_id,
        ),
        LikeTarget::Comment => {
            state
                .metadata
                .get_comment(target_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
            None
        }
        LikeTarget::Tweet => {
            state
                .metadata
                .get_tweet(target_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Tweet not found".to_string()))?;
            None
        }
    };
    require_user(state, user_id, "User").await?;

    let mut like = LikeRow::new(user_id, target, target_id);
    if let Some(owner) = video_owner {
        like = like.with_video_owner(owner);
    }

    let outcome = state.metadata.toggle_like(&like).await?;
    crate::metrics::record_toggle("like", outcome.label());
    tracing::info!(
        user_id = %user_id,
        target = %target,
        target_id = %target_id,
        outcome = outcome.label(),
        "Like toggled"
    );

    Ok(match outcome {
        ToggleOutcome::Added(row) => {
            ApiResponse::new(Some(LikeResponse::new(row, target))).with_message("Like added")
        }
        ToggleOutcome::Removed => ApiResponse::new(None).with_message("Like removed"),
    })
}

/// GET /likes/videos - Videos liked by a user.
///
/// The user comes from the body, then the `userId` query parameter, then the
/// gateway header.
pub async fn get_liked_videos(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LikedVideosQuery>,
    req: Request,
) -> ApiResult<ApiResponse<Vec<LikedVideoResponse>>> {
    let actor = acting_user(&req);
    let body: LikeBody = read_json_body(req).await?;
    let user_id = actor
        .resolve(non_blank(body.user_id.as_deref()).or(non_blank(query.user_id.as_deref())))?
        .ok_or_else(ApiError::unauthenticated)?;

    let liked = state.metadata.list_liked_videos(user_id).await?;

    Ok(ApiResponse::new(
        liked.into_iter().map(LikedVideoResponse::from).collect(),
    ))
}
