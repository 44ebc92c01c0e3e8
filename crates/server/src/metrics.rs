//! Prometheus metrics for the vidhub server.
//!
//! The `/metrics` endpoint is unauthenticated to allow Prometheus scraping.
//! It exposes aggregate activity only (no user or record ids), but should
//! still be network-restricted to the scraper at the infrastructure level.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    self, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Join-record toggles
pub static TOGGLES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "vidhub_toggles_total",
            "Like and subscription toggles by entity and outcome",
        ),
        &["entity", "outcome"],
    )
    .expect("metric creation failed")
});

// Content creation
pub static COMMENTS_CREATED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "vidhub_comments_created_total",
        "Total number of comments created",
    )
    .expect("metric creation failed")
});

pub static TWEETS_CREATED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("vidhub_tweets_created_total", "Total number of tweets created")
        .expect("metric creation failed")
});

pub static VIDEOS_PUBLISHED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "vidhub_videos_published_total",
        "Total number of videos published",
    )
    .expect("metric creation failed")
});

pub static VIDEO_PUBLISH_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "vidhub_video_publish_duration_seconds",
            "Time taken to store both media assets and persist a video",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
    )
    .expect("metric creation failed")
});

// Media
pub static MEDIA_BYTES_UPLOADED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "vidhub_media_bytes_uploaded_total",
        "Total bytes of media stored",
    )
    .expect("metric creation failed")
});

pub static MEDIA_UPLOAD_FAILURES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "vidhub_media_upload_failures_total",
            "Media uploads that failed, by asset kind",
        ),
        &["kind"],
    )
    .expect("metric creation failed")
});

pub static MEDIA_ROLLBACKS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "vidhub_media_rollbacks_total",
        "Staged media assets released because the request did not complete",
    )
    .expect("metric creation failed")
});

pub static MEDIA_RELEASE_FAILURES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "vidhub_media_release_failures_total",
        "Superseded media assets that could not be deleted",
    )
    .expect("metric creation failed")
});

// Errors
pub static HANDLER_PANICS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "vidhub_handler_panics_total",
        "Requests that panicked and were answered with 500",
    )
    .expect("metric creation failed")
});

/// Guard to ensure metrics are only registered once.
static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent, so integration tests can build many routers.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(TOGGLES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(COMMENTS_CREATED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(TWEETS_CREATED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(VIDEOS_PUBLISHED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(VIDEO_PUBLISH_DURATION.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(MEDIA_BYTES_UPLOADED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(MEDIA_UPLOAD_FAILURES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(MEDIA_ROLLBACKS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(MEDIA_RELEASE_FAILURES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(HANDLER_PANICS.clone()))
            .expect("metric registration failed");
    });
}

/// GET /metrics - Prometheus metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Count one toggle.
pub fn record_toggle(entity: &str, outcome: &str) {
    TOGGLES.with_label_values(&[entity, outcome]).inc();
}

/// Count one failed media upload.
pub fn record_upload_failure(kind: &str) {
    MEDIA_UPLOAD_FAILURES.with_label_values(&[kind]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        register_metrics();
        register_metrics();
    }

    #[test]
    fn test_toggle_counter_is_labelled() {
        register_metrics();
        let before = TOGGLES.with_label_values(&["like", "added"]).get();
        record_toggle("like", "added");
        assert!(TOGGLES.with_label_values(&["like", "added"]).get() > before);
    }
}
