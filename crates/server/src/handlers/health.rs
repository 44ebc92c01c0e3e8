//! Health endpoint.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the media store fails its probe.
    pub status: &'static str,
    pub version: &'static str,
    pub metadata: &'static str,
    pub storage: &'static str,
}

/// GET /health - Checks both stores. A metadata failure is an error; a media
/// store failure reports `degraded` with 503 so reads can keep being served.
pub async fn health_check(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<HealthResponse>)> {
    state.metadata.health_check().await?;

    let store = state.media.store();
    let (code, status) = match store.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!(backend = store.backend_name(), error = %e, "Media store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };

    Ok((
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            metadata: state.metadata.backend_name(),
            storage: store.backend_name(),
        }),
    ))
}
