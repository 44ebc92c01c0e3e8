//! Comment endpoints.

use crate::envelope::ApiResponse;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiPath, ApiQuery};
use crate::handlers::common::{authorize_owner, non_blank, read_json_body, require_user};
use crate::identity::acting_user;
use crate::state::AppState;
use axum::extract::{Request, State};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use vidhub_core::{EntityKind, PageInfo, PageRequest, parse_id};
use vidhub_metadata::models::{CommentRow, CommentWithOwnerRow};

/// Comment as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub video: Uuid,
    pub owner: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_username: Option<String>,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<CommentRow> for CommentResponse {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.comment_id,
            video: row.video_id,
            owner: row.owner_id,
            owner_username: None,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<CommentWithOwnerRow> for CommentResponse {
    fn from(row: CommentWithOwnerRow) -> Self {
        Self {
            owner_username: Some(row.owner_username),
            ..row.comment.into()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListCommentsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentBody {
    pub user_id: Option<String>,
    pub content: Option<String>,
}

/// GET /videos/{video_id}/comments - One page of a video's comments, newest first.
pub async fn list_video_comments(
    State(state): State<AppState>,
    ApiPath(video_id): ApiPath<String>,
    ApiQuery(query): ApiQuery<ListCommentsQuery>,
) -> ApiResult<ApiResponse<Vec<CommentResponse>>> {
    let video_id = parse_id(EntityKind::Video, &video_id)?;
    let page = PageRequest::parse(
        query.page.as_deref(),
        query.limit.as_deref(),
        state.max_page_limit(),
    )?;

    let total = state.metadata.count_comments_for_video(video_id).await?;
    let comments = state
        .metadata
        .list_comments_for_video(video_id, page)
        .await?;

    Ok(
        ApiResponse::new(comments.into_iter().map(CommentResponse::from).collect())
            .with_pagination(PageInfo::new(page, total)),
    )
}

/// POST /videos/{video_id}/comments - Add a comment.
pub async fn add_comment(
    State(state): State<AppState>,
    ApiPath(video_id): ApiPath<String>,
    req: Request,
) -> ApiResult<ApiResponse<CommentResponse>> {
    let video_id = parse_id(EntityKind::Video, &video_id)?;
    let actor = acting_user(&req);
    let body: CommentBody = read_json_body(req).await?;

    let content = non_blank(body.content.as_deref())
        .ok_or_else(|| ApiError::BadRequest("Comment content is required".to_string()))?;
    let owner_id = actor
        .resolve(body.user_id.as_deref())?
        .ok_or_else(ApiError::unauthenticated)?;

    if state.metadata.get_video(video_id).await?.is_none() {
        return Err(ApiError::NotFound("Video not found".to_string()));
    }
    require_user(&state, owner_id, "User").await?;

    let now = OffsetDateTime::now_utc();
    let comment = state
        .metadata
        .create_comment(&CommentRow {
            seq: 0,
            comment_id: Uuid::new_v4(),
            video_id,
            owner_id,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        })
        .await?;

    crate::metrics::COMMENTS_CREATED.inc();
    tracing::debug!(comment_id = %comment.comment_id, video_id = %video_id, "Comment added");

    Ok(ApiResponse::created(CommentResponse::from(comment))
        .with_message("Comment added successfully"))
}

/// PATCH /comments/{comment_id} - Replace a comment's content.
pub async fn update_comment(
    State(state): State<AppState>,
    ApiPath(comment_id): ApiPath<String>,
    req: Request,
) -> ApiResult<ApiResponse<CommentResponse>> {
    let comment_id = parse_id(EntityKind::Comment, &comment_id)?;
    let actor = acting_user(&req);
    let body: CommentBody = read_json_body(req).await?;
    let actor = actor.resolve(body.user_id.as_deref())?;

    let comment = state
        .metadata
        .get_comment(comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
    authorize_owner(
        state.owner_policy(),
        actor,
        comment.owner_id,
        "update",
        EntityKind::Comment,
    )?;

    let content = non_blank(body.content.as_deref())
        .ok_or_else(|| ApiError::BadRequest("Comment content is required".to_string()))?;

    let updated = state
        .metadata
        .update_comment_content(comment_id, content, OffsetDateTime::now_utc())
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    Ok(ApiResponse::new(CommentResponse::from(updated))
        .with_message("Comment updated successfully"))
}

/// DELETE /comments/{comment_id} - Delete a comment and the likes on it.
pub async fn delete_comment(
    State(state): State<AppState>,
    ApiPath(comment_id): ApiPath<String>,
    req: Request,
) -> ApiResult<ApiResponse<Option<()>>> {
    let comment_id = parse_id(EntityKind::Comment, &comment_id)?;
    let actor = acting_user(&req);
    let body: CommentBody = read_json_body(req).await?;
    let actor = actor.resolve(body.user_id.as_deref())?;

    let comment = state
        .metadata
        .get_comment(comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
    authorize_owner(
        state.owner_policy(),
        actor,
        comment.owner_id,
        "delete",
        EntityKind::Comment,
    )?;

    if !state.metadata.delete_comment(comment_id).await? {
        return Err(ApiError::NotFound("Comment not found".to_string()));
    }
    tracing::debug!(comment_id = %comment_id, "Comment deleted");

    Ok(ApiResponse::empty("Comment deleted successfully"))
}
