//! Integration tests for the like endpoints.

mod common;

use axum::http::StatusCode;
use common::{TestServer, create_user, create_video};
use serde_json::json;
use uuid::Uuid;
use vidhub_core::LikeTarget;

#[tokio::test]
async fn test_video_like_toggles() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let owner = create_user(metadata.as_ref(), "owner").await;
    let fan = create_user(metadata.as_ref(), "fan").await;
    let video = create_video(metadata.as_ref(), owner.user_id, "Clip", 0).await;
    let uri = format!("/likes/video/{}", video.video_id);
    let body = json!({ "userId": fan.user_id });

    let (status, added) = server.json("POST", &uri, Some(body.clone()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(added["message"], "Like added");
    assert_eq!(added["data"]["user"], json!(fan.user_id));
    assert_eq!(added["data"]["video"], json!(video.video_id));
    assert_eq!(added["data"]["videoOwner"], json!(owner.user_id));
    assert!(added["data"].get("comment").is_none());

    let (status, removed) = server.json("POST", &uri, Some(body.clone()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["message"], "Like removed");
    assert_eq!(removed["data"], json!(null));

    // Odd number of toggles leaves the like in place.
    server.json("POST", &uri, Some(body), None).await;
    assert_eq!(
        metadata
            .count_likes(LikeTarget::Video, video.video_id)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_comment_and_tweet_likes() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let user = create_user(metadata.as_ref(), "user").await;
    let video = create_video(metadata.as_ref(), user.user_id, "Clip", 0).await;

    let (_, comment) = server
        .json(
            "POST",
            &format!("/videos/{}/comments", video.video_id),
            Some(json!({ "userId": user.user_id, "content": "hi" })),
            None,
        )
        .await;
    let comment_id = comment["data"]["id"].as_str().unwrap().to_string();

    let (_, tweet) = server
        .json(
            "POST",
            "/tweets",
            Some(json!({ "userId": user.user_id, "content": "hello" })),
            None,
        )
        .await;
    let tweet_id = tweet["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = server
        .json("POST", &format!("/likes/comment/{comment_id}"), None, Some(user.user_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["comment"], comment_id);
    assert!(body["data"].get("videoOwner").is_none());

    let (status, body) = server
        .json("POST", &format!("/likes/tweet/{tweet_id}"), None, Some(user.user_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tweet"], tweet_id);
}

#[tokio::test]
async fn test_like_requires_existing_target_and_user() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let user = create_user(metadata.as_ref(), "user").await;
    let video = create_video(metadata.as_ref(), user.user_id, "Clip", 0).await;

    let (status, body) = server
        .json(
            "POST",
            &format!("/likes/video/{}", Uuid::new_v4()),
            None,
            Some(user.user_id),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Video not found");

    let (status, body) = server
        .json(
            "POST",
            &format!("/likes/tweet/{}", Uuid::new_v4()),
            None,
            Some(user.user_id),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Tweet not found");

    let (status, body) = server
        .json("POST", "/likes/comment/xyz", None, Some(user.user_id))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid comment ID");

    let (status, _) = server
        .json("POST", &format!("/likes/video/{}", video.video_id), None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = server
        .json(
            "POST",
            &format!("/likes/video/{}", video.video_id),
            None,
            Some(Uuid::new_v4()),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_liked_videos() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let owner = create_user(metadata.as_ref(), "owner").await;
    let fan = create_user(metadata.as_ref(), "fan").await;
    let first = create_video(metadata.as_ref(), owner.user_id, "First", 0).await;
    let second = create_video(metadata.as_ref(), owner.user_id, "Second", 0).await;
    create_video(metadata.as_ref(), owner.user_id, "Unliked", 0).await;

    for video in [&first, &second] {
        server
            .json(
                "POST",
                &format!("/likes/video/{}", video.video_id),
                None,
                Some(fan.user_id),
            )
            .await;
    }

    // Query parameter
    let (status, body) = server
        .get(&format!("/likes/videos?userId={}", fan.user_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    let liked = body["data"].as_array().unwrap();
    assert_eq!(liked.len(), 2);
    assert_eq!(liked[0]["video"]["title"], "First");
    assert_eq!(liked[1]["video"]["title"], "Second");
    assert_eq!(liked[0]["video"]["owner"], json!(owner.user_id));

    // Body wins over header
    let (_, body) = server
        .json(
            "GET",
            "/likes/videos",
            Some(json!({ "userId": owner.user_id })),
            Some(fan.user_id),
        )
        .await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = server.get("/likes/videos").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
