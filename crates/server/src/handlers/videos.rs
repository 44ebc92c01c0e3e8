//! Video endpoints: listing, publishing with media uploads, editing and
//! deletion.
//!
//! Publishing and thumbnail replacement go through a [`MediaStage`], so media
//! stored for a request that fails is released again.

use crate::envelope::ApiResponse;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiPath, ApiQuery};
use crate::handlers::common::{authorize_owner, non_blank, read_json_body, require_user};
use crate::identity::acting_user;
use crate::metrics;
use crate::state::AppState;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{StatusCode, header};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use time::OffsetDateTime;
use tracing::{error, info, warn};
use uuid::Uuid;
use vidhub_core::{EntityKind, PageInfo, PageRequest, VideoSort, parse_id};
use vidhub_metadata::models::{MediaRef, VideoFilter, VideoPatch, VideoRow, VideoWithOwnerRow};
use vidhub_storage::{MediaKind, MediaStage, MediaUpload, StorageError};

/// Video as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: Uuid,
    pub owner: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_username: Option<String>,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<VideoRow> for VideoResponse {
    fn from(row: VideoRow) -> Self {
        Self {
            id: row.video_id,
            owner: row.owner_id,
            owner_username: None,
            title: row.title,
            description: row.description,
            video_file: row.video_file,
            thumbnail: row.thumbnail,
            duration: row.duration,
            views: row.views,
            is_published: row.is_published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<VideoWithOwnerRow> for VideoResponse {
    fn from(row: VideoWithOwnerRow) -> Self {
        Self {
            owner_username: Some(row.owner_username),
            ..row.video.into()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVideosQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub user_id: Option<String>,
}

/// JSON body of a details-only update.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoUpdateBody {
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoOwnerBody {
    pub user_id: Option<String>,
}

/// Fields of a multipart video form. Unknown parts are ignored and empty file
/// parts count as missing.
#[derive(Debug, Default)]
struct VideoForm {
    title: Option<String>,
    description: Option<String>,
    duration: Option<String>,
    user_id: Option<String>,
    video_file: Option<MediaUpload>,
    thumbnail: Option<MediaUpload>,
}

impl VideoForm {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = Self::default();
        // Multipart errors keep their status, so a field over the body limit is a 413.
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match name.as_str() {
                "videoFile" | "thumbnail" => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await?;
                    if data.is_empty() {
                        continue;
                    }
                    let mut upload = MediaUpload::new(data);
                    if let Some(file_name) = file_name {
                        upload = upload.with_file_name(file_name);
                    }
                    if let Some(content_type) = content_type {
                        upload = upload.with_content_type(content_type);
                    }
                    if name == "videoFile" {
                        form.video_file = Some(upload);
                    } else {
                        form.thumbnail = Some(upload);
                    }
                }
                "title" | "description" | "duration" | "userId" => {
                    let text = field.text().await?;
                    let slot = match name.as_str() {
                        "title" => &mut form.title,
                        "description" => &mut form.description,
                        "duration" => &mut form.duration,
                        _ => &mut form.user_id,
                    };
                    *slot = Some(text);
                }
                _ => {}
            }
        }
        Ok(form)
    }
}

async fn read_multipart(req: Request, state: &AppState) -> ApiResult<VideoForm> {
    let multipart = Multipart::from_request(req, state).await?;
    VideoForm::read(multipart).await
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

/// Client-declared duration in seconds.
fn parse_duration(raw: Option<&str>) -> ApiResult<Option<f64>> {
    let Some(raw) = non_blank(raw) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Ok(Some(secs)),
        _ => Err(ApiError::BadRequest(format!("Invalid duration: {raw}"))),
    }
}

/// Map a failed upload to the response error. Client mistakes keep their
/// status; backend failures become a generic 500.
fn upload_failed(kind: MediaKind, err: StorageError) -> ApiError {
    metrics::record_upload_failure(kind.as_str());
    match err {
        StorageError::EmptyUpload(_) | StorageError::TooLarge { .. } | StorageError::InvalidKey(_) => {
            err.into()
        }
        other => {
            error!(kind = kind.as_str(), error = %other, "Media upload failed");
            ApiError::Internal("Error uploading files".to_string())
        }
    }
}

async fn rollback(stage: MediaStage, reason: &str) {
    let staged = stage.keys().len();
    let released = stage.rollback().await;
    metrics::MEDIA_ROLLBACKS.inc_by(released as u64);
    warn!(staged, released, reason, "Rolled back staged media");
}

/// Delete a media asset that no video references anymore. Failures leave an
/// orphan behind and are only counted.
async fn release_unreferenced(state: &AppState, key: &str) {
    if key.is_empty() {
        return;
    }
    if let Err(e) = state.media.release(key).await {
        metrics::MEDIA_RELEASE_FAILURES.inc();
        warn!(key = %key, error = %e, "Failed to release media asset");
    }
}

async fn find_video(state: &AppState, video_id: Uuid) -> ApiResult<VideoRow> {
    state
        .metadata
        .get_video(video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))
}

/// GET /videos - One page of videos, optionally filtered by owner and text.
pub async fn list_videos(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListVideosQuery>,
) -> ApiResult<ApiResponse<Vec<VideoResponse>>> {
    let page = PageRequest::parse(
        query.page.as_deref(),
        query.limit.as_deref(),
        state.max_page_limit(),
    )?;
    let sort = VideoSort::parse(query.sort_by.as_deref(), query.sort_type.as_deref())?;
    let owner_id = non_blank(query.user_id.as_deref())
        .map(|raw| parse_id(EntityKind::User, raw))
        .transpose()?;
    let filter = VideoFilter {
        owner_id,
        search: non_blank(query.query.as_deref()).map(str::to_string),
    };

    let total = state.metadata.count_videos(&filter).await?;
    let videos = state.metadata.list_videos(&filter, sort, page).await?;

    Ok(
        ApiResponse::new(videos.into_iter().map(VideoResponse::from).collect())
            .with_pagination(PageInfo::new(page, total)),
    )
}

/// POST /videos - Upload a video and its thumbnail and publish it.
pub async fn publish_video(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<ApiResponse<VideoResponse>> {
    let started = Instant::now();
    let actor = acting_user(&req);
    let form = read_multipart(req, &state).await?;

    let (Some(title), Some(description), Some(video_file), Some(thumbnail)) = (
        non_blank(form.title.as_deref()).map(str::to_string),
        non_blank(form.description.as_deref()).map(str::to_string),
        form.video_file,
        form.thumbnail,
    ) else {
        return Err(ApiError::BadRequest("All fields are required".to_string()));
    };
    let declared_duration = parse_duration(form.duration.as_deref())?;
    let owner_id = actor
        .resolve(form.user_id.as_deref())?
        .ok_or_else(ApiError::unauthenticated)?;
    require_user(&state, owner_id, "User").await?;

    let mut stage = state.media.stage();
    let video = stage
        .upload(MediaKind::Video, video_file)
        .await
        .map_err(|e| upload_failed(MediaKind::Video, e))?;
    let thumb = match stage.upload(MediaKind::Thumbnail, thumbnail).await {
        Ok(thumb) => thumb,
        Err(e) => {
            let err = upload_failed(MediaKind::Thumbnail, e);
            rollback(stage, "thumbnail upload failed").await;
            return Err(err);
        }
    };
    let uploaded_bytes = video.size + thumb.size;

    let now = OffsetDateTime::now_utc();
    let row = VideoRow {
        seq: 0,
        video_id: Uuid::new_v4(),
        owner_id,
        title,
        description,
        video_file: video.secure_url,
        video_key: video.key,
        thumbnail: thumb.secure_url,
        thumbnail_key: thumb.key,
        duration: video.duration.or(declared_duration).unwrap_or(0.0),
        views: 0,
        is_published: true,
        created_at: now,
        updated_at: now,
    };
    let created = match state.metadata.create_video(&row).await {
        Ok(created) => created,
        Err(e) => {
            rollback(stage, "video record not persisted").await;
            return Err(e.into());
        }
    };
    stage.commit();

    metrics::MEDIA_BYTES_UPLOADED.inc_by(uploaded_bytes);
    metrics::VIDEOS_PUBLISHED.inc();
    metrics::VIDEO_PUBLISH_DURATION.observe(started.elapsed().as_secs_f64());
    info!(
        video_id = %created.video_id,
        owner_id = %owner_id,
        bytes = uploaded_bytes,
        duration = created.duration,
        "Video published"
    );

    Ok(ApiResponse::created(VideoResponse::from(created))
        .with_message("Video published successfully"))
}

/// GET /videos/{video_id}
pub async fn get_video(
    State(state): State<AppState>,
    ApiPath(video_id): ApiPath<String>,
) -> ApiResult<ApiResponse<VideoResponse>> {
    let video_id = parse_id(EntityKind::Video, &video_id)?;
    let video = state
        .metadata
        .get_video_with_owner(video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;

    Ok(ApiResponse::new(VideoResponse::from(video)))
}

/// PATCH /videos/{video_id} - Edit title, description and thumbnail.
///
/// Accepts a JSON body or a multipart form carrying a replacement thumbnail.
/// The previous thumbnail is released once the record points at the new one.
pub async fn update_video(
    State(state): State<AppState>,
    ApiPath(video_id): ApiPath<String>,
    req: Request,
) -> ApiResult<ApiResponse<VideoResponse>> {
    let video_id = parse_id(EntityKind::Video, &video_id)?;
    let actor = acting_user(&req);
    let (body, thumbnail) = if is_multipart(&req) {
        let form = read_multipart(req, &state).await?;
        let body = VideoUpdateBody {
            user_id: form.user_id,
            title: form.title,
            description: form.description,
        };
        (body, form.thumbnail)
    } else {
        (read_json_body::<VideoUpdateBody>(req).await?, None)
    };
    let actor = actor.resolve(body.user_id.as_deref())?;

    let existing = find_video(&state, video_id).await?;
    authorize_owner(
        state.owner_policy(),
        actor,
        existing.owner_id,
        "update",
        EntityKind::Video,
    )?;

    let mut patch = VideoPatch {
        title: non_blank(body.title.as_deref()).map(str::to_string),
        description: non_blank(body.description.as_deref()).map(str::to_string),
        thumbnail: None,
    };

    let mut stage = state.media.stage();
    if let Some(upload) = thumbnail {
        let uploaded = stage
            .upload(MediaKind::Thumbnail, upload)
            .await
            .map_err(|e| upload_failed(MediaKind::Thumbnail, e))?;
        metrics::MEDIA_BYTES_UPLOADED.inc_by(uploaded.size);
        patch.thumbnail = Some(MediaRef {
            url: uploaded.secure_url,
            key: uploaded.key,
        });
    }

    let updated = match state
        .metadata
        .update_video(video_id, &patch, OffsetDateTime::now_utc())
        .await
    {
        Ok(Some(updated)) => updated,
        Ok(None) => {
            rollback(stage, "video deleted during update").await;
            return Err(ApiError::NotFound("Video not found".to_string()));
        }
        Err(e) => {
            rollback(stage, "video update not persisted").await;
            return Err(e.into());
        }
    };
    stage.commit();

    if patch.thumbnail.is_some() && existing.thumbnail_key != updated.thumbnail_key {
        release_unreferenced(&state, &existing.thumbnail_key).await;
    }

    Ok(ApiResponse::new(VideoResponse::from(updated)).with_message("Video updated successfully"))
}

/// DELETE /videos/{video_id} - Delete a video, its comments and likes, and its
/// media.
pub async fn delete_video(
    State(state): State<AppState>,
    ApiPath(video_id): ApiPath<String>,
    req: Request,
) -> ApiResult<StatusCode> {
    let video_id = parse_id(EntityKind::Video, &video_id)?;
    let actor = acting_user(&req);
    let body: VideoOwnerBody = read_json_body(req).await?;
    let actor = actor.resolve(body.user_id.as_deref())?;

    let existing = find_video(&state, video_id).await?;
    authorize_owner(
        state.owner_policy(),
        actor,
        existing.owner_id,
        "delete",
        EntityKind::Video,
    )?;

    let deleted = state
        .metadata
        .delete_video(video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;

    release_unreferenced(&state, &deleted.video.video_key).await;
    release_unreferenced(&state, &deleted.video.thumbnail_key).await;

    info!(
        video_id = %video_id,
        comments_deleted = deleted.comments_deleted,
        likes_deleted = deleted.likes_deleted,
        "Video deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /videos/{video_id}/publish - Flip the published flag.
pub async fn toggle_publish_status(
    State(state): State<AppState>,
    ApiPath(video_id): ApiPath<String>,
    req: Request,
) -> ApiResult<ApiResponse<VideoResponse>> {
    let video_id = parse_id(EntityKind::Video, &video_id)?;
    let actor = acting_user(&req);
    let body: VideoOwnerBody = read_json_body(req).await?;
    let actor = actor.resolve(body.user_id.as_deref())?;

    let existing = find_video(&state, video_id).await?;
    authorize_owner(
        state.owner_policy(),
        actor,
        existing.owner_id,
        "update",
        EntityKind::Video,
    )?;

    let video = state
        .metadata
        .toggle_publish(video_id, OffsetDateTime::now_utc())
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;

    let message = if video.is_published {
        "Video is now published"
    } else {
        "Video is now unpublished"
    };
    info!(video_id = %video_id, is_published = video.is_published, "Publish status toggled");

    Ok(ApiResponse::new(VideoResponse::from(video)).with_message(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_duration_must_be_a_non_negative_number() {
        assert_eq!(parse_duration(None).unwrap(), None);
        assert_eq!(parse_duration(Some("  ")).unwrap(), None);
        assert_eq!(parse_duration(Some("12.5")).unwrap(), Some(12.5));
        assert!(parse_duration(Some("-1")).is_err());
        assert!(parse_duration(Some("NaN")).is_err());
        assert!(parse_duration(Some("ten")).is_err());
    }

    #[test]
    fn client_upload_errors_keep_their_status() {
        let err = upload_failed(
            MediaKind::Video,
            StorageError::TooLarge { size: 10, max: 5 },
        );
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);

        let err = upload_failed(
            MediaKind::Thumbnail,
            StorageError::Io(std::io::Error::other("disk full")),
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Error uploading files");
    }
}
