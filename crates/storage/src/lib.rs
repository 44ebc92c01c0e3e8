//! Object storage abstraction and media hosting for vidhub.
//!
//! This crate provides:
//! - An object store trait with atomic writes
//! - Backends: local filesystem and S3-compatible
//! - A media library that turns uploads into public locations and releases
//!   staged uploads when a publish does not complete

pub mod backends;
pub mod error;
pub mod media;
pub mod traits;

pub use backends::{filesystem::FilesystemBackend, s3::S3Backend};
pub use error::{StorageError, StorageResult};
pub use media::{MediaKind, MediaLibrary, MediaStage, MediaUpload, UploadedMedia};
pub use traits::{ObjectInfo, ObjectStore};

use std::sync::Arc;
use vidhub_core::config::StorageConfig;

/// Create an object store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    config.validate().map_err(StorageError::Config)?;

    let store: Arc<dyn ObjectStore> = match config {
        StorageConfig::Filesystem { path } => Arc::new(FilesystemBackend::new(path).await?),
        StorageConfig::S3(s3) => Arc::new(S3Backend::new(s3).await?),
    };
    tracing::debug!(backend = store.backend_name(), "Object store ready");
    Ok(store)
}
