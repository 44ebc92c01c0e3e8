//! Storage error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no object stored under {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by a remote object store.
    #[error("object store request failed: {0}")]
    S3(#[from] Box<dyn std::error::Error + Send + Sync>),

    /// Key that is not a plain relative path.
    #[error("unsupported object key: {0:?}")]
    InvalidKey(String),

    #[error("{0}")]
    EmptyUpload(String),

    #[error("upload of {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: u64, max: u64 },

    #[error("storage configuration error: {0}")]
    Config(String),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;
