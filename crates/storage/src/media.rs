//! Media hosting on top of an object store.
//!
//! Uploaded payloads are written under a random key and exposed through a
//! public base URL. A [`MediaStage`] groups the uploads of one request so they
//! can be released together if the request does not complete.

use crate::error::{StorageError, StorageResult};
use crate::traits::ObjectStore;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;
use vidhub_core::config::MediaConfig;

/// Longest file extension carried over from the client's file name.
const MAX_EXTENSION_LEN: usize = 8;

/// Kind of media asset. Determines the key prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Thumbnail,
}

impl MediaKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Video => "videos",
            Self::Thumbnail => "thumbnails",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Thumbnail => "thumbnail",
        }
    }
}

/// A payload received from a client.
#[derive(Clone, Debug)]
pub struct MediaUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl MediaUpload {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            file_name: None,
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Lowercased alphanumeric extension of the client's file name, if any.
    fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let (_, ext) = name.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        let valid = !ext.is_empty()
            && ext.len() <= MAX_EXTENSION_LEN
            && ext.chars().all(|c| c.is_ascii_alphanumeric());
        valid.then_some(ext)
    }
}

/// A stored media asset.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadedMedia {
    /// Storage key, used to release the asset later.
    pub key: String,
    /// Public location of the asset.
    pub secure_url: String,
    /// Stored size in bytes.
    pub size: u64,
    /// Presentation length in seconds, when the container declares one.
    pub duration: Option<f64>,
}

/// Turns uploads into hosted assets.
#[derive(Clone)]
pub struct MediaLibrary {
    store: Arc<dyn ObjectStore>,
    public_base_url: String,
    max_upload_bytes: u64,
}

impl MediaLibrary {
    pub fn new(store: Arc<dyn ObjectStore>, config: &MediaConfig) -> Self {
        Self {
            store,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// The underlying object store.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Public location for a storage key.
    pub fn secure_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    /// Store one payload and return its location.
    pub async fn upload(&self, kind: MediaKind, upload: MediaUpload) -> StorageResult<UploadedMedia> {
        let size = upload.data.len() as u64;
        if size == 0 {
            return Err(StorageError::EmptyUpload(format!(
                "{} file is empty",
                kind.as_str()
            )));
        }
        if size > self.max_upload_bytes {
            return Err(StorageError::TooLarge {
                size,
                max: self.max_upload_bytes,
            });
        }

        let key = match upload.extension() {
            Some(ext) => format!("{}/{}.{ext}", kind.prefix(), Uuid::new_v4()),
            None => format!("{}/{}", kind.prefix(), Uuid::new_v4()),
        };

        let duration = match kind {
            MediaKind::Video => vidhub_core::mp4::probe_duration(&upload.data),
            MediaKind::Thumbnail => None,
        };

        self.store
            .put(&key, upload.data, upload.content_type.as_deref())
            .await?;

        debug!(key = %key, size, kind = kind.as_str(), "Stored media asset");

        Ok(UploadedMedia {
            secure_url: self.secure_url(&key),
            key,
            size,
            duration,
        })
    }

    /// Delete a stored asset. A missing asset counts as released.
    pub async fn release(&self, key: &str) -> StorageResult<()> {
        if !self.store.remove(key).await? {
            debug!(key = %key, "Media asset already gone");
        }
        Ok(())
    }

    /// Start a group of uploads that is released as a whole unless committed.
    pub fn stage(&self) -> MediaStage {
        MediaStage {
            library: self.clone(),
            keys: Vec::new(),
        }
    }
}

/// Uploads belonging to one in-flight request.
///
/// Call [`MediaStage::commit`] once the referencing record is persisted, or
/// [`MediaStage::rollback`] to release everything uploaded so far. A stage
/// dropped without either schedules the release on the current runtime.
pub struct MediaStage {
    library: MediaLibrary,
    keys: Vec<String>,
}

impl MediaStage {
    /// Upload through the library and remember the key for rollback.
    pub async fn upload(
        &mut self,
        kind: MediaKind,
        upload: MediaUpload,
    ) -> StorageResult<UploadedMedia> {
        let uploaded = self.library.upload(kind, upload).await?;
        self.keys.push(uploaded.key.clone());
        Ok(uploaded)
    }

    /// Keys uploaded so far.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Keep every staged asset.
    pub fn commit(mut self) {
        self.keys.clear();
    }

    /// Release every staged asset. Returns how many were released; failures
    /// are logged and skipped.
    pub async fn rollback(mut self) -> usize {
        let keys = std::mem::take(&mut self.keys);
        release_all(&self.library, keys).await
    }
}

impl Drop for MediaStage {
    fn drop(&mut self) {
        if self.keys.is_empty() {
            return;
        }
        let keys = std::mem::take(&mut self.keys);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let library = self.library.clone();
                handle.spawn(async move {
                    release_all(&library, keys).await;
                });
            }
            Err(_) => {
                warn!(?keys, "Media stage dropped outside a runtime; assets leaked");
            }
        }
    }
}

async fn release_all(library: &MediaLibrary, keys: Vec<String>) -> usize {
    let mut released = 0;
    for key in keys {
        match library.release(&key).await {
            Ok(()) => {
                released += 1;
                debug!(key = %key, "Released staged media");
            }
            Err(e) => warn!(key = %key, error = %e, "Failed to release staged media"),
        }
    }
    released
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FilesystemBackend;

    async fn library(dir: &tempfile::TempDir, max_upload_bytes: u64) -> MediaLibrary {
        let backend = FilesystemBackend::new(dir.path()).await.unwrap();
        let config = MediaConfig {
            public_base_url: "https://cdn.example.com/".to_string(),
            max_upload_bytes,
            allow_insecure_urls: false,
        };
        MediaLibrary::new(Arc::new(backend), &config)
    }

    #[tokio::test]
    async fn test_upload_returns_secure_url_under_kind_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let media = library(&dir, 1024).await;

        let uploaded = media
            .upload(
                MediaKind::Thumbnail,
                MediaUpload::new(&b"png"[..]).with_file_name("Cover.PNG"),
            )
            .await
            .unwrap();

        assert!(uploaded.key.starts_with("thumbnails/"));
        assert!(uploaded.key.ends_with(".png"));
        assert_eq!(
            uploaded.secure_url,
            format!("https://cdn.example.com/{}", uploaded.key)
        );
        assert_eq!(uploaded.size, 3);
        assert_eq!(uploaded.duration, None);
        assert!(media.store().exists(&uploaded.key).await.unwrap());
    }

    #[tokio::test]
    async fn test_suspicious_extension_is_dropped() {
        let upload = MediaUpload::new(&b"x"[..]).with_file_name("clip.mp4/../../etc");
        assert_eq!(upload.extension(), None);
        let upload = MediaUpload::new(&b"x"[..]).with_file_name("noext");
        assert_eq!(upload.extension(), None);
    }

    #[tokio::test]
    async fn test_rejects_empty_and_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let media = library(&dir, 4).await;

        assert!(matches!(
            media.upload(MediaKind::Video, MediaUpload::new(Bytes::new())).await,
            Err(StorageError::EmptyUpload(_))
        ));
        assert!(matches!(
            media
                .upload(MediaKind::Video, MediaUpload::new(&b"12345"[..]))
                .await,
            Err(StorageError::TooLarge { size: 5, max: 4 })
        ));
    }

    #[tokio::test]
    async fn test_release_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let media = library(&dir, 1024).await;
        media.release("videos/never-existed").await.unwrap();
    }

    #[tokio::test]
    async fn test_stage_rollback_releases_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let media = library(&dir, 1024).await;

        let mut stage = media.stage();
        let video = stage
            .upload(MediaKind::Video, MediaUpload::new(&b"frames"[..]))
            .await
            .unwrap();
        assert_eq!(stage.keys().len(), 1);

        assert_eq!(stage.rollback().await, 1);
        assert!(!media.store().exists(&video.key).await.unwrap());
    }

    #[tokio::test]
    async fn test_stage_commit_keeps_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let media = library(&dir, 1024).await;

        let mut stage = media.stage();
        let video = stage
            .upload(MediaKind::Video, MediaUpload::new(&b"frames"[..]))
            .await
            .unwrap();
        stage.commit();

        tokio::task::yield_now().await;
        assert!(media.store().exists(&video.key).await.unwrap());
    }
}
