//! Storage test utilities.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use vidhub_storage::{
    FilesystemBackend, ObjectInfo, ObjectStore, StorageError, StorageResult,
};

/// Filesystem store that refuses writes under one key prefix.
///
/// Everything else is delegated, so assets written before the failure are
/// really on disk and a missing rollback shows up in [`stored_keys`].
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct PrefixFailingStore {
    inner: FilesystemBackend,
    fail_prefix: String,
    pub failed_puts: AtomicUsize,
}

#[allow(dead_code)]
impl PrefixFailingStore {
    pub async fn new(root: &Path, fail_prefix: &str) -> Arc<Self> {
        let inner = FilesystemBackend::new(root)
            .await
            .expect("Failed to create storage backend");
        Arc::new(Self {
            inner,
            fail_prefix: fail_prefix.to_string(),
            failed_puts: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ObjectStore for PrefixFailingStore {
    async fn put(&self, key: &str, data: Bytes, content_type: Option<&str>) -> StorageResult<()> {
        if key.starts_with(&self.fail_prefix) {
            self.failed_puts.fetch_add(1, Ordering::SeqCst);
            return Err(StorageError::Io(std::io::Error::other(format!(
                "injected write failure for {key}"
            ))));
        }
        self.inner.put(key, data, content_type).await
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.inner.get(key).await
    }

    async fn stat(&self, key: &str) -> StorageResult<Option<ObjectInfo>> {
        self.inner.stat(key).await
    }

    async fn remove(&self, key: &str) -> StorageResult<bool> {
        self.inner.remove(key).await
    }

    fn backend_name(&self) -> &'static str {
        "prefix-failing"
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.inner.health_check().await
    }
}

/// Keys of every object under a filesystem storage root, sorted.
#[allow(dead_code)]
pub fn stored_keys(root: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path: PathBuf = entry.path();
            if path.is_dir() {
                walk(root, &path, out);
            } else if let Ok(rel) = path.strip_prefix(root) {
                out.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }

    let mut keys = Vec::new();
    walk(root, root, &mut keys);
    keys.sort();
    keys
}
