use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vidhub_storage::error::{StorageError, StorageResult};
use vidhub_storage::traits::{ObjectInfo, ObjectStore};

/// In-memory backend that records content types and can be told to fail
/// writes after a number of successful puts.
#[allow(dead_code)]
pub struct RecordingBackend {
    objects: Mutex<HashMap<String, (Bytes, Option<String>)>>,
    puts_before_failure: Option<usize>,
    pub puts: Arc<AtomicUsize>,
    pub deletes: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl RecordingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(None))
    }

    /// Accept `n` puts, then reject every further put.
    pub fn failing_after(n: usize) -> Arc<Self> {
        Arc::new(Self::build(Some(n)))
    }

    fn build(puts_before_failure: Option<usize>) -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            puts_before_failure,
            puts: Arc::new(AtomicUsize::new(0)),
            deletes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .and_then(|(_, ct)| ct.clone())
    }
}

#[async_trait]
impl ObjectStore for RecordingBackend {
    async fn put(&self, key: &str, data: Bytes, content_type: Option<&str>) -> StorageResult<()> {
        let attempt = self.puts.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = self.puts_before_failure
            && attempt >= limit
        {
            return Err(StorageError::Io(std::io::Error::other(
                "recording backend refused write",
            )));
        }
        self.objects.lock().unwrap().insert(
            key.to_string(),
            (data, content_type.map(ToString::to_string)),
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(data, _)| data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn stat(&self, key: &str) -> StorageResult<Option<ObjectInfo>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(data, content_type)| ObjectInfo {
                size: data.len() as u64,
                content_type: content_type.clone(),
            }))
    }

    async fn remove(&self, key: &str) -> StorageResult<bool> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(self.objects.lock().unwrap().remove(key).is_some())
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
