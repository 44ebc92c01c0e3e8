//! The object store seam under the media library.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;

/// Size and declared type of a stored object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectInfo {
    pub size: u64,
    pub content_type: Option<String>,
}

/// Flat blob store holding media assets.
///
/// Keys are `/`-separated relative paths such as `videos/<uuid>.mp4`.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Write an object, replacing any previous one. Readers never observe a
    /// partially written object.
    async fn put(&self, key: &str, data: Bytes, content_type: Option<&str>) -> StorageResult<()>;

    /// Read an object. Fails with `NotFound` if nothing is stored under `key`.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Size and content type, or `None` if nothing is stored under `key`.
    async fn stat(&self, key: &str) -> StorageResult<Option<ObjectInfo>>;

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.stat(key).await?.is_some())
    }

    /// Delete an object. Returns `false` if nothing was stored under `key`.
    async fn remove(&self, key: &str) -> StorageResult<bool>;

    /// Short backend identifier for logs.
    fn backend_name(&self) -> &'static str;

    /// Verify the backend is reachable.
    async fn health_check(&self) -> StorageResult<()>;
}
