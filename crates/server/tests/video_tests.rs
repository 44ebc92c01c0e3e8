//! Integration tests for the video endpoints, including media staging.

mod common;

use axum::http::StatusCode;
use common::{
    MultipartForm, PrefixFailingStore, TestServer, create_user, create_video, mp4_bytes,
    publish_form,
};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use uuid::Uuid;
use vidhub_storage::ObjectStore;

#[tokio::test]
async fn test_publish_video() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let user = create_user(metadata.as_ref(), "creator").await;

    let (status, body) = server
        .multipart("POST", "/videos", publish_form("Holiday"), Some(user.user_id))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Video published successfully");

    let video = &body["data"];
    assert_eq!(video["title"], "Holiday");
    assert_eq!(video["owner"], json!(user.user_id));
    assert_eq!(video["duration"], 3.5);
    assert_eq!(video["views"], 0);
    assert_eq!(video["isPublished"], true);

    let video_file = video["videoFile"].as_str().unwrap();
    let thumbnail = video["thumbnail"].as_str().unwrap();
    assert!(video_file.starts_with("https://media.test/videos/"));
    assert!(video_file.ends_with(".mp4"));
    assert!(thumbnail.starts_with("https://media.test/thumbnails/"));

    let keys = server.stored_keys();
    assert_eq!(keys.len(), 2);
    assert!(keys.iter().any(|k| video_file.ends_with(k.as_str())));
    assert!(keys.iter().any(|k| thumbnail.ends_with(k.as_str())));
}

#[tokio::test]
async fn test_publish_uses_declared_duration_without_container() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let user = create_user(metadata.as_ref(), "creator").await;

    let form = MultipartForm::new()
        .text("title", "Raw")
        .text("description", "no container")
        .text("duration", "61.5")
        .text("userId", &user.user_id.to_string())
        .file("videoFile", "clip.bin", "application/octet-stream", b"not an mp4")
        .file("thumbnail", "thumb.png", "image/png", b"png");

    let (status, body) = server.multipart("POST", "/videos", form, None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["duration"], 61.5);
}

#[tokio::test]
async fn test_publish_requires_all_fields() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let user = create_user(metadata.as_ref(), "creator").await;

    let form = MultipartForm::new()
        .text("title", "Half")
        .file("videoFile", "clip.mp4", "video/mp4", &mp4_bytes(1000, 1000));
    let (status, body) = server
        .multipart("POST", "/videos", form, Some(user.user_id))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "All fields are required");

    // An empty file part counts as missing.
    let form = MultipartForm::new()
        .text("title", "Empty")
        .text("description", "d")
        .file("videoFile", "clip.mp4", "video/mp4", b"")
        .file("thumbnail", "thumb.png", "image/png", b"png");
    let (status, _) = server
        .multipart("POST", "/videos", form, Some(user.user_id))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .multipart("POST", "/videos", publish_form("Anon"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(server.stored_keys().is_empty());
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let server = TestServer::with_config(|config| {
        config.media.max_upload_bytes = 16;
    })
    .await;
    let metadata = server.metadata();
    let user = create_user(metadata.as_ref(), "creator").await;

    let (status, _) = server
        .multipart("POST", "/videos", publish_form("Big"), Some(user.user_id))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(server.stored_keys().is_empty());
}

#[tokio::test]
async fn test_body_over_limit_is_payload_too_large() {
    let server = TestServer::with_config(|config| {
        config.media.max_upload_bytes = 16;
    })
    .await;
    let metadata = server.metadata();
    let user = create_user(metadata.as_ref(), "creator").await;

    // Larger than the whole-request limit, so the form cannot even be read.
    let form = MultipartForm::new()
        .text("title", "Huge")
        .text("description", "too big")
        .file("videoFile", "clip.mp4", "video/mp4", &vec![0u8; 2 * 1024 * 1024])
        .file("thumbnail", "thumb.png", "image/png", b"png");
    let (status, body) = server
        .multipart("POST", "/videos", form, Some(user.user_id))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["statusCode"], 413);
    assert_eq!(body["message"], "Request body exceeds the upload limit");
    assert!(server.stored_keys().is_empty());
}

#[tokio::test]
async fn test_failed_video_insert_releases_both_uploads() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let user = create_user(metadata.as_ref(), "creator").await;
    sqlx::query(
        "CREATE TRIGGER reject_video_insert BEFORE INSERT ON videos \
         BEGIN SELECT RAISE(ABORT, 'videos are read-only'); END",
    )
    .execute(server.sqlite_pool())
    .await
    .unwrap();

    let (status, body) = server
        .multipart("POST", "/videos", publish_form("Unsaved"), Some(user.user_id))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["statusCode"], 500);
    assert!(server.stored_keys().is_empty());
}

#[tokio::test]
async fn test_failed_video_update_releases_new_thumbnail() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let user = create_user(metadata.as_ref(), "creator").await;

    let (status, body) = server
        .multipart("POST", "/videos", publish_form("Stable"), Some(user.user_id))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let video_id = body["data"]["id"].as_str().unwrap().to_string();
    let published_keys = server.stored_keys();
    assert_eq!(published_keys.len(), 2);

    sqlx::query(
        "CREATE TRIGGER reject_video_update BEFORE UPDATE ON videos \
         BEGIN SELECT RAISE(ABORT, 'videos are read-only'); END",
    )
    .execute(server.sqlite_pool())
    .await
    .unwrap();

    let form = MultipartForm::new()
        .text("title", "Stable v2")
        .file("thumbnail", "better.jpg", "image/jpeg", b"jpeg bytes");
    let (status, _) = server
        .multipart("PATCH", &format!("/videos/{video_id}"), form, Some(user.user_id))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // The new thumbnail is gone and the record still owns its original assets.
    assert_eq!(server.stored_keys(), published_keys);
    let (_, body) = server.get(&format!("/videos/{video_id}")).await;
    assert_eq!(body["data"]["title"], "Stable");
}

#[tokio::test]
async fn test_failed_thumbnail_upload_releases_video() {
    let failing: Arc<std::sync::OnceLock<Arc<PrefixFailingStore>>> = Arc::default();
    let slot = failing.clone();
    let server = TestServer::with_storage(|root| async move {
        let store = PrefixFailingStore::new(&root, "thumbnails/").await;
        let _ = slot.set(store.clone());
        store as Arc<dyn ObjectStore>
    })
    .await;
    let metadata = server.metadata();
    let user = create_user(metadata.as_ref(), "creator").await;

    let (status, body) = server
        .multipart("POST", "/videos", publish_form("Doomed"), Some(user.user_id))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Error uploading files");
    assert_eq!(body["statusCode"], 500);

    assert_eq!(
        failing.get().unwrap().failed_puts.load(Ordering::SeqCst),
        1
    );
    assert!(server.stored_keys().is_empty());

    let (_, listing) = server.get("/videos").await;
    assert_eq!(listing["pagination"]["totalDocs"], 0);
}

#[tokio::test]
async fn test_get_video() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let user = create_user(metadata.as_ref(), "creator").await;
    let video = create_video(metadata.as_ref(), user.user_id, "Detail", 7).await;

    let (status, body) = server.get(&format!("/videos/{}", video.video_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], json!(video.video_id));
    assert_eq!(body["data"]["ownerUsername"], user.username.as_str());
    assert_eq!(body["data"]["views"], 7);

    let (status, body) = server.get(&format!("/videos/{}", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Video not found");

    let (status, _) = server.get("/videos/zzz").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_videos_filters_sorts_and_paginates() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let alice = create_user(metadata.as_ref(), "alice").await;
    let bob = create_user(metadata.as_ref(), "bob").await;
    create_video(metadata.as_ref(), alice.user_id, "Rust basics", 30).await;
    create_video(metadata.as_ref(), alice.user_id, "Cooking pasta", 10).await;
    create_video(metadata.as_ref(), bob.user_id, "Advanced rust", 20).await;

    let (status, body) = server.get("/videos").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["title"], "Rust basics");
    assert_eq!(
        body["pagination"],
        json!({ "page": 1, "limit": 10, "totalPages": 1, "totalDocs": 3 })
    );

    let (_, body) = server.get("/videos?query=RUST&sortBy=views&sortType=desc").await;
    let titles: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, ["Rust basics", "Advanced rust"]);

    let (_, body) = server
        .get(&format!("/videos?userId={}&limit=1&page=2", alice.user_id))
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Cooking pasta");
    assert_eq!(body["pagination"]["totalPages"], 2);

    let (status, _) = server.get("/videos?sortBy=owner").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = server.get("/videos?sortType=sideways").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_details_with_json() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let user = create_user(metadata.as_ref(), "creator").await;
    let video = create_video(metadata.as_ref(), user.user_id, "Old", 0).await;
    let uri = format!("/videos/{}", video.video_id);

    let (status, body) = server
        .json(
            "PATCH",
            &uri,
            Some(json!({ "title": "New", "description": "" })),
            Some(user.user_id),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Video updated successfully");
    assert_eq!(body["data"]["title"], "New");
    assert_eq!(body["data"]["description"], video.description.as_str());
    assert_eq!(body["data"]["thumbnail"], video.thumbnail.as_str());

    let stranger = create_user(metadata.as_ref(), "stranger").await;
    let (status, body) = server
        .json("PATCH", &uri, Some(json!({ "title": "Mine" })), Some(stranger.user_id))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You can only update your own videos");
}

#[tokio::test]
async fn test_thumbnail_replacement_releases_previous_asset() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let user = create_user(metadata.as_ref(), "creator").await;

    let (_, body) = server
        .multipart("POST", "/videos", publish_form("Thumbs"), Some(user.user_id))
        .await;
    let video_id = body["data"]["id"].as_str().unwrap().to_string();
    let old_thumbnail = body["data"]["thumbnail"].as_str().unwrap().to_string();

    let form = MultipartForm::new()
        .text("title", "Thumbs v2")
        .file("thumbnail", "better.jpg", "image/jpeg", b"jpeg bytes");
    let (status, body) = server
        .multipart("PATCH", &format!("/videos/{video_id}"), form, Some(user.user_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Thumbs v2");
    let new_thumbnail = body["data"]["thumbnail"].as_str().unwrap();
    assert_ne!(new_thumbnail, old_thumbnail);
    assert!(new_thumbnail.ends_with(".jpg"));

    let keys = server.stored_keys();
    assert_eq!(keys.len(), 2);
    assert!(keys.iter().any(|k| new_thumbnail.ends_with(k.as_str())));
    assert!(!keys.iter().any(|k| old_thumbnail.ends_with(k.as_str())));
}

#[tokio::test]
async fn test_delete_video_cascades_and_releases_media() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let user = create_user(metadata.as_ref(), "creator").await;
    let fan = create_user(metadata.as_ref(), "fan").await;

    let (_, body) = server
        .multipart("POST", "/videos", publish_form("Short-lived"), Some(user.user_id))
        .await;
    let video_id: Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();

    let (_, comment) = server
        .json(
            "POST",
            &format!("/videos/{video_id}/comments"),
            Some(json!({ "content": "bye" })),
            Some(fan.user_id),
        )
        .await;
    let comment_id: Uuid = comment["data"]["id"].as_str().unwrap().parse().unwrap();
    server
        .json("POST", &format!("/likes/video/{video_id}"), None, Some(fan.user_id))
        .await;

    let (status, _) = server
        .json("DELETE", &format!("/videos/{video_id}"), None, Some(fan.user_id))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server
        .json("DELETE", &format!("/videos/{video_id}"), None, Some(user.user_id))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, json!(null));

    assert!(metadata.get_video(video_id).await.unwrap().is_none());
    assert!(metadata.get_comment(comment_id).await.unwrap().is_none());
    assert!(server.stored_keys().is_empty());

    let (_, stats) = server
        .get(&format!("/dashboard/{}/stats", user.user_id))
        .await;
    assert_eq!(stats["data"]["totalLikes"], 0);
}

#[tokio::test]
async fn test_toggle_publish_status() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let user = create_user(metadata.as_ref(), "creator").await;
    let video = create_video(metadata.as_ref(), user.user_id, "Flip", 0).await;
    let uri = format!("/videos/{}/publish", video.video_id);

    let (status, body) = server.json("PATCH", &uri, None, Some(user.user_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Video is now unpublished");
    assert_eq!(body["data"]["isPublished"], false);

    let (_, body) = server.json("PATCH", &uri, None, Some(user.user_id)).await;
    assert_eq!(body["message"], "Video is now published");
    assert_eq!(body["data"]["isPublished"], true);

    let (status, _) = server
        .json(
            "PATCH",
            &format!("/videos/{}/publish", Uuid::new_v4()),
            None,
            Some(user.user_id),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
