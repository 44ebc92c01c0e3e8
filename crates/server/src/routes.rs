//! Route configuration.

use crate::error::{ApiError, ErrorResponse, INTERNAL_MESSAGE};
use crate::handlers;
use crate::identity::identity_middleware;
use crate::metrics::{self, metrics_handler};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router, middleware};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

/// Headroom on top of the media payloads for form fields and boundaries.
const FORM_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Health check (unauthenticated for load balancers/k8s probes)
        .route("/health", get(handlers::health_check))
        // Videos
        .route(
            "/videos",
            get(handlers::list_videos).post(handlers::publish_video),
        )
        .route(
            "/videos/{video_id}",
            get(handlers::get_video)
                .patch(handlers::update_video)
                .delete(handlers::delete_video),
        )
        .route(
            "/videos/{video_id}/publish",
            patch(handlers::toggle_publish_status),
        )
        // Comments
        .route(
            "/videos/{video_id}/comments",
            get(handlers::list_video_comments).post(handlers::add_comment),
        )
        .route(
            "/comments/{comment_id}",
            patch(handlers::update_comment).delete(handlers::delete_comment),
        )
        // Likes
        .route("/likes/video/{id}", post(handlers::toggle_video_like))
        .route("/likes/comment/{id}", post(handlers::toggle_comment_like))
        .route("/likes/tweet/{id}", post(handlers::toggle_tweet_like))
        .route("/likes/videos", get(handlers::get_liked_videos))
        // Subscriptions: the segment is a channel id for the toggle and the
        // subscriber list, and a subscriber id for the channel list.
        .route("/subscriptions/{id}", post(handlers::toggle_subscription))
        .route(
            "/subscriptions/{id}/subscribers",
            get(handlers::list_subscribers),
        )
        .route(
            "/subscriptions/{id}/channels",
            get(handlers::list_subscribed_channels),
        )
        // Tweets: GET takes a user id, PATCH/DELETE a tweet id.
        .route("/tweets", post(handlers::create_tweet))
        .route(
            "/tweets/{id}",
            get(handlers::list_user_tweets)
                .patch(handlers::update_tweet)
                .delete(handlers::delete_tweet),
        )
        // Dashboard
        .route(
            "/dashboard/{channel_id}/stats",
            get(handlers::channel_stats),
        )
        .route(
            "/dashboard/{channel_id}/videos",
            get(handlers::channel_videos),
        );

    let mut router = Router::new().merge(api_routes);

    // When enabled, /metrics should be network-restricted to the scraper.
    if state.config.server.metrics_enabled {
        router = router.merge(Router::new().route("/metrics", get(metrics_handler)));
    }

    let router = router
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed);

    // A publish carries two media payloads plus form fields.
    let body_limit = state
        .config
        .media
        .max_upload_bytes
        .saturating_mul(2)
        .saturating_add(FORM_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    // Layers run outermost first: TraceLayer -> panic guard -> identity -> handler
    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(identity_middleware))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("Method not allowed".to_string())
}

/// Answer a panicked request with the standard 500 body.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    metrics::HANDLER_PANICS.inc();
    tracing::error!(panic = %detail, "Handler panicked");

    let status = StatusCode::INTERNAL_SERVER_ERROR;
    (status, Json(ErrorResponse::new(status, INTERNAL_MESSAGE))).into_response()
}
