//! Test fixtures for generating test data.

use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use uuid::Uuid;
use vidhub_metadata::MetadataStore;
use vidhub_metadata::models::{UserRow, VideoRow};

/// Counter for unique usernames across one test binary.
static USER_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Multipart boundary used by [`MultipartForm`].
pub const BOUNDARY: &str = "vidhub-test-boundary";

/// Insert a user with a unique username.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub async fn create_user(metadata: &dyn MetadataStore, name: &str) -> UserRow {
    let n = USER_COUNTER.fetch_add(1, Ordering::Relaxed);
    let username = format!("{name}{n}");
    let email = format!("{username}@example.com");
    metadata
        .create_user(&UserRow::new(username, email))
        .await
        .expect("Failed to create user")
}

/// Insert a video record directly, without media. `views` lets dashboard
/// tests control the aggregate.
#[allow(dead_code)]
pub async fn create_video(
    metadata: &dyn MetadataStore,
    owner_id: Uuid,
    title: &str,
    views: i64,
) -> VideoRow {
    let now = OffsetDateTime::now_utc();
    let video_id = Uuid::new_v4();
    metadata
        .create_video(&VideoRow {
            seq: 0,
            video_id,
            owner_id,
            title: title.to_string(),
            description: format!("{title} description"),
            video_file: format!("https://media.test/videos/{video_id}.mp4"),
            video_key: format!("videos/{video_id}.mp4"),
            thumbnail: format!("https://media.test/thumbnails/{video_id}.png"),
            thumbnail_key: format!("thumbnails/{video_id}.png"),
            duration: 12.0,
            views,
            is_published: true,
            created_at: now,
            updated_at: now,
        })
        .await
        .expect("Failed to create video")
}

/// Minimal MP4 whose `mvhd` box declares `units / timescale` seconds.
#[allow(dead_code)]
pub fn mp4_bytes(timescale: u32, units: u32) -> Vec<u8> {
    fn boxed(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
        out.extend_from_slice(kind);
        out.extend_from_slice(payload);
        out
    }

    let mut mvhd = vec![0u8; 12];
    mvhd.extend_from_slice(&timescale.to_be_bytes());
    mvhd.extend_from_slice(&units.to_be_bytes());
    mvhd.extend_from_slice(&[0u8; 80]);

    let mut file = boxed(b"ftyp", b"isom\0\0\0\0");
    file.extend(boxed(b"moov", &boxed(b"mvhd", &mvhd)));
    file
}

/// Builder for `multipart/form-data` request bodies.
#[allow(dead_code)]
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

#[allow(dead_code)]
impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// A complete publish form with a 3.5 second video.
#[allow(dead_code)]
pub fn publish_form(title: &str) -> MultipartForm {
    MultipartForm::new()
        .text("title", title)
        .text("description", "A test upload")
        .file("videoFile", "clip.mp4", "video/mp4", &mp4_bytes(1000, 3500))
        .file("thumbnail", "thumb.png", "image/png", b"\x89PNG fake thumbnail")
}
