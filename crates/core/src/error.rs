//! Error types for the core domain.

use crate::id::EntityKind;
use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid {entity} ID")]
    InvalidId { entity: EntityKind, value: String },

    #[error("invalid pagination: {0}")]
    InvalidPagination(String),

    #[error("invalid sort: {0}")]
    InvalidSort(String),

    #[error("unknown like target: {0}")]
    UnknownLikeTarget(String),

    #[error("media probe error: {0}")]
    MediaProbe(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
