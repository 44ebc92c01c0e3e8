//! Channel dashboard endpoints.

use crate::envelope::ApiResponse;
use crate::error::ApiResult;
use crate::extract::ApiPath;
use crate::handlers::videos::VideoResponse;
use crate::state::AppState;
use axum::extract::State;
use serde::Serialize;
use vidhub_core::{EntityKind, parse_id};
use vidhub_metadata::models::ChannelStats;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatsResponse {
    pub total_videos: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_subscribers: i64,
}

impl From<ChannelStats> for ChannelStatsResponse {
    fn from(stats: ChannelStats) -> Self {
        Self {
            total_videos: stats.total_videos,
            total_views: stats.total_views,
            total_likes: stats.total_likes,
            total_subscribers: stats.total_subscribers,
        }
    }
}

/// GET /dashboard/{channel_id}/stats
///
/// An unknown channel reports zeros.
pub async fn channel_stats(
    State(state): State<AppState>,
    ApiPath(channel_id): ApiPath<String>,
) -> ApiResult<ApiResponse<ChannelStatsResponse>> {
    let channel_id = parse_id(EntityKind::Channel, &channel_id)?;
    let stats = state.metadata.channel_stats(channel_id).await?;

    Ok(ApiResponse::new(ChannelStatsResponse::from(stats))
        .with_message("Channel statistics retrieved successfully"))
}

/// GET /dashboard/{channel_id}/videos
pub async fn channel_videos(
    State(state): State<AppState>,
    ApiPath(channel_id): ApiPath<String>,
) -> ApiResult<ApiResponse<Vec<VideoResponse>>> {
    let channel_id = parse_id(EntityKind::Channel, &channel_id)?;
    let videos = state.metadata.list_videos_by_owner(channel_id).await?;

    Ok(
        ApiResponse::new(videos.into_iter().map(VideoResponse::from).collect())
            .with_message("Channel videos retrieved successfully"),
    )
}
