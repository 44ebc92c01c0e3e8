//! HTTP API server for vidhub.
//!
//! This crate provides the HTTP surface of the platform:
//! - Comment, like, subscription and tweet endpoints
//! - Video publishing with staged media uploads
//! - Channel dashboard aggregates
//! - Health and Prometheus endpoints

pub mod bootstrap;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod identity;
pub mod metrics;
pub mod routes;
pub mod state;

pub use envelope::ApiResponse;
pub use error::{ApiError, ApiResult};
pub use identity::{ActingUser, TraceId};
pub use routes::create_router;
pub use state::AppState;
