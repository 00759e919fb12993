//! HTTP scenario test macro for storage backends.
//!
//! The `api_integration_tests!` macro generates tests that drive the full
//! router: HTTP request → auth middleware → handler → service → store →
//! response envelope. Media goes to a temporary directory.

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;
use vidtube::core::auth::USER_ID_HEADER;
use vidtube::core::error::MediaError;
use vidtube::media::{LocalMediaStorage, MediaStorage, UploadedMedia};
use vidtube::server::ServerBuilder;
use vidtube::storage::DocumentStore;

pub const MEDIA_BASE_URL: &str = "http://media.test/objects";

/// Media storage refusing image uploads, used to exercise publish cleanup
pub struct RejectingThumbnails(pub LocalMediaStorage);

#[async_trait]
impl MediaStorage for RejectingThumbnails {
    async fn upload(&self, path: &Path) -> Result<UploadedMedia, MediaError> {
        if path.extension().is_some_and(|ext| ext == "jpg") {
            return Err(MediaError::Upload {
                path: path.display().to_string(),
                message: "storage unavailable".to_string(),
            });
        }
        self.0.upload(path).await
    }

    async fn delete(&self, url: &str) -> Result<(), MediaError> {
        self.0.delete(url).await
    }
}

/// A running router plus the directories it writes to
pub struct TestApp {
    pub server: TestServer,
    pub media_root: TempDir,
    _staging: TempDir,
}

impl TestApp {
    pub async fn start(store: Arc<dyn DocumentStore>) -> Self {
        Self::start_with(store, |root| Arc::new(LocalMediaStorage::new(root, MEDIA_BASE_URL)))
            .await
    }

    pub async fn start_rejecting_thumbnails(store: Arc<dyn DocumentStore>) -> Self {
        Self::start_with(store, |root| {
            Arc::new(RejectingThumbnails(LocalMediaStorage::new(root, MEDIA_BASE_URL)))
        })
        .await
    }

    async fn start_with<F>(store: Arc<dyn DocumentStore>, media: F) -> Self
    where
        F: FnOnce(&Path) -> Arc<dyn MediaStorage>,
    {
        let media_root = TempDir::new().unwrap();
        let staging = TempDir::new().unwrap();

        let builder = ServerBuilder::new()
            .with_shared_store(store)
            .with_shared_media(media(media_root.path()))
            .with_staging_dir(staging.path());
        builder.prepare_store().await.unwrap();
        let server = TestServer::new(builder.build().unwrap());

        Self {
            server,
            media_root,
            _staging: staging,
        }
    }

    /// Number of objects currently held by media storage
    pub fn media_objects(&self) -> usize {
        std::fs::read_dir(self.media_root.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// Register a user and return its id
    pub async fn register(&self, username: &str) -> Uuid {
        let response = self
            .server
            .post("/api/v1/users")
            .json(&json!({
                "username": username,
                "email": format!("{}@test.com", username),
                "fullName": format!("{} Tester", username),
                "avatar": format!("http://avatars.test/{}.png", username),
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        data_id(&response.json::<Value>())
    }

    /// Publish a video owned by `owner` and return the stored document
    pub async fn publish(&self, owner: &Uuid, title: &str) -> Value {
        let response = self
            .server
            .post("/api/v1/videos")
            .add_header(user_header(), user_value(owner))
            .multipart(video_form(title))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }
}

pub fn user_header() -> HeaderName {
    HeaderName::from_static(USER_ID_HEADER)
}

pub fn user_value(id: &Uuid) -> HeaderValue {
    HeaderValue::from_str(&id.to_string()).unwrap()
}

pub fn data_id(body: &Value) -> Uuid {
    Uuid::parse_str(body["data"]["id"].as_str().expect("data.id is a string")).unwrap()
}

pub fn video_form(title: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("title", title.to_string())
        .add_text("description", format!("About {}", title))
        .add_part(
            "videoFile",
            Part::bytes(b"fake video bytes".to_vec())
                .file_name("clip.mp4")
                .mime_type("video/mp4"),
        )
        .add_part(
            "thumbnail",
            Part::bytes(b"fake image bytes".to_vec())
                .file_name("thumb.jpg")
                .mime_type("image/jpeg"),
        )
}

/// Generate the HTTP scenario suite for a storage backend.
///
/// `$factory` must evaluate to a value implementing `DocumentStore`; each
/// test gets a fresh one.
#[macro_export]
macro_rules! api_integration_tests {
    ($factory:expr) => {
        mod api_integration_tests {
            use super::*;
            use axum::http::StatusCode;
            use axum_test::multipart::{MultipartForm, Part};
            use serde_json::{Value, json};
            use std::sync::Arc;
            use uuid::Uuid;
            use vidtube::storage::DocumentStore;

            async fn app() -> TestApp {
                let store: Arc<dyn DocumentStore> = Arc::new($factory);
                TestApp::start(store).await
            }

            fn video_titles(body: &Value) -> Vec<String> {
                body["data"]["videos"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|v| v["title"].as_str().unwrap().to_string())
                    .collect()
            }

            // ==============================================================
            // Surface
            // ==============================================================

            #[tokio::test]
            async fn test_healthcheck() {
                let app = app().await;
                let response = app.server.get("/api/v1/healthcheck").await;
                response.assert_status_ok();

                let body: Value = response.json();
                assert_eq!(body["data"]["status"], "OK");
                assert_eq!(body["success"], true);
                assert_eq!(body["statusCode"], 200);
            }

            #[tokio::test]
            async fn test_unknown_route_uses_envelope() {
                let app = app().await;
                let response = app.server.get("/api/v1/nothing/here").await;
                response.assert_status(StatusCode::NOT_FOUND);

                let body: Value = response.json();
                assert_eq!(body["success"], false);
                assert_eq!(body["errors"], json!([]));
            }

            #[tokio::test]
            async fn test_invalid_path_id_is_bad_request() {
                let app = app().await;
                let response = app.server.get("/api/v1/videos/not-a-uuid").await;
                response.assert_status(StatusCode::BAD_REQUEST);

                let body: Value = response.json();
                assert_eq!(body["errors"][0]["field"], "videoId");
            }

            #[tokio::test]
            async fn test_malformed_identity_is_unauthenticated() {
                let app = app().await;
                let response = app
                    .server
                    .post("/api/v1/tweets")
                    .add_header(
                        user_header(),
                        axum::http::HeaderValue::from_static("garbage"),
                    )
                    .json(&json!({ "content": "hello" }))
                    .await;
                response.assert_status(StatusCode::UNAUTHORIZED);
            }

            // ==============================================================
            // Users
            // ==============================================================

            #[tokio::test]
            async fn test_register_and_fetch_user() {
                let app = app().await;
                let id = app.register("alice").await;

                let response = app.server.get(&format!("/api/v1/users/{}", id)).await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["data"]["username"], "alice");
                assert_eq!(body["data"]["watchHistory"], json!([]));

                let duplicate = app
                    .server
                    .post("/api/v1/users")
                    .json(&json!({
                        "username": "ALICE",
                        "email": "other@test.com",
                        "fullName": "Other",
                        "avatar": "http://avatars.test/o.png",
                    }))
                    .await;
                duplicate.assert_status(StatusCode::CONFLICT);

                let missing = app
                    .server
                    .get(&format!("/api/v1/users/{}", Uuid::now_v7()))
                    .await;
                missing.assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_register_validates_body() {
                let app = app().await;
                let response = app
                    .server
                    .post("/api/v1/users")
                    .json(&json!({
                        "username": "bob",
                        "email": "not-an-email",
                        "fullName": "Bob",
                        "avatar": "http://avatars.test/b.png",
                    }))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["errors"][0]["field"], "email");
            }

            // ==============================================================
            // Videos
            // ==============================================================

            #[tokio::test]
            async fn test_publish_list_and_toggle_publish() {
                let app = app().await;
                let owner = app.register("owner").await;
                let video = app.publish(&owner, "First cut").await;
                assert_eq!(video["isPublished"], true);
                assert_eq!(video["views"], 0);
                assert_eq!(app.media_objects(), 2);

                let listed: Value = app.server.get("/api/v1/videos").await.json();
                assert_eq!(video_titles(&listed), vec!["First cut"]);
                assert_eq!(listed["data"]["totalVideos"], 1);
                assert_eq!(listed["data"]["videos"][0]["owner"]["username"], "owner");

                let response = app
                    .server
                    .patch(&format!(
                        "/api/v1/videos/toggle/publish/{}",
                        video["id"].as_str().unwrap()
                    ))
                    .add_header(user_header(), user_value(&owner))
                    .await;
                response.assert_status_ok();
                assert_eq!(response.json::<Value>()["data"]["isPublished"], false);

                let listed: Value = app.server.get("/api/v1/videos").await.json();
                assert!(video_titles(&listed).is_empty());
                assert_eq!(listed["data"]["totalVideos"], 0);
            }

            #[tokio::test]
            async fn test_publish_requires_identity_and_files() {
                let app = app().await;
                let owner = app.register("owner").await;

                let anonymous = app
                    .server
                    .post("/api/v1/videos")
                    .multipart(video_form("nope"))
                    .await;
                anonymous.assert_status(StatusCode::UNAUTHORIZED);

                let without_thumbnail = MultipartForm::new()
                    .add_text("title", "Half")
                    .add_text("description", "Missing a thumbnail")
                    .add_part(
                        "videoFile",
                        Part::bytes(b"bytes".to_vec()).file_name("clip.mp4"),
                    );
                let response = app
                    .server
                    .post("/api/v1/videos")
                    .add_header(user_header(), user_value(&owner))
                    .multipart(without_thumbnail)
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["errors"][0]["field"], "thumbnail");
                assert_eq!(app.media_objects(), 0);
            }

            #[tokio::test]
            async fn test_failed_thumbnail_upload_removes_video_object() {
                let store: Arc<dyn DocumentStore> = Arc::new($factory);
                let app = TestApp::start_rejecting_thumbnails(store).await;
                let owner = app.register("owner").await;

                let response = app
                    .server
                    .post("/api/v1/videos")
                    .add_header(user_header(), user_value(&owner))
                    .multipart(video_form("Doomed"))
                    .await;
                response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
                let body: Value = response.json();
                assert_eq!(body["message"], "Something went wrong");

                assert_eq!(app.media_objects(), 0);
                let listed: Value = app.server.get("/api/v1/videos").await.json();
                assert_eq!(listed["data"]["totalVideos"], 0);
            }

            #[tokio::test]
            async fn test_unpublished_video_visible_only_to_owner() {
                let app = app().await;
                let owner = app.register("owner").await;
                let viewer = app.register("viewer").await;
                let video = app.publish(&owner, "Draft").await;
                let path = format!("/api/v1/videos/{}", video["id"].as_str().unwrap());

                app.server
                    .patch(&format!(
                        "/api/v1/videos/toggle/publish/{}",
                        video["id"].as_str().unwrap()
                    ))
                    .add_header(user_header(), user_value(&owner))
                    .await
                    .assert_status_ok();

                app.server
                    .get(&path)
                    .add_header(user_header(), user_value(&viewer))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
                app.server.get(&path).await.assert_status(StatusCode::NOT_FOUND);

                let response = app
                    .server
                    .get(&path)
                    .add_header(user_header(), user_value(&owner))
                    .await;
                response.assert_status_ok();
                assert_eq!(response.json::<Value>()["data"]["isPublished"], false);
            }

            #[tokio::test]
            async fn test_viewing_counts_views_and_records_history() {
                let app = app().await;
                let owner = app.register("owner").await;
                let viewer = app.register("viewer").await;
                let first = app.publish(&owner, "One").await;
                let second = app.publish(&owner, "Two").await;

                for video in [&first, &second, &first] {
                    app.server
                        .get(&format!("/api/v1/videos/{}", video["id"].as_str().unwrap()))
                        .add_header(user_header(), user_value(&viewer))
                        .await
                        .assert_status_ok();
                }

                let response = app
                    .server
                    .get(&format!("/api/v1/videos/{}", first["id"].as_str().unwrap()))
                    .await;
                // two identified views plus this anonymous one
                let body: Value = response.json();
                assert_eq!(body["data"]["views"], 3);
                assert_eq!(
                    body["data"]["owner"],
                    json!({
                        "id": owner.to_string(),
                        "username": "owner",
                        "avatar": "http://avatars.test/owner.png",
                    })
                );

                let history: Value = app
                    .server
                    .get("/api/v1/users/history")
                    .add_header(user_header(), user_value(&viewer))
                    .await
                    .json();
                let titles: Vec<&str> = history["data"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|v| v["title"].as_str().unwrap())
                    .collect();
                assert_eq!(titles, vec!["One", "Two"]);
            }

            #[tokio::test]
            async fn test_video_listing_sorts_filters_and_searches() {
                let app = app().await;
                let alice = app.register("alice").await;
                let bob = app.register("bob").await;
                app.publish(&alice, "Rust basics").await;
                app.publish(&alice, "Cooking pasta").await;
                app.publish(&bob, "Advanced RUST").await;

                let body: Value = app
                    .server
                    .get("/api/v1/videos")
                    .add_query_param("sortBy", "title")
                    .add_query_param("sortType", "asc")
                    .await
                    .json();
                assert_eq!(
                    video_titles(&body),
                    vec!["Advanced RUST", "Cooking pasta", "Rust basics"]
                );

                let body: Value = app
                    .server
                    .get("/api/v1/videos")
                    .add_query_param("query", "rust")
                    .add_query_param("sortBy", "title")
                    .add_query_param("sortType", "asc")
                    .await
                    .json();
                assert_eq!(video_titles(&body), vec!["Advanced RUST", "Rust basics"]);

                let body: Value = app
                    .server
                    .get("/api/v1/videos")
                    .add_query_param("userId", alice.to_string())
                    .add_query_param("limit", "1")
                    .await
                    .json();
                assert_eq!(body["data"]["totalVideos"], 2);
                assert_eq!(body["data"]["totalPages"], 2);
                assert_eq!(body["data"]["hasNextPage"], true);
                assert_eq!(body["data"]["videos"].as_array().unwrap().len(), 1);

                app.server
                    .get("/api/v1/videos")
                    .add_query_param("sortBy", "likes")
                    .await
                    .assert_status(StatusCode::BAD_REQUEST);
            }

            #[tokio::test]
            async fn test_update_and_delete_video() {
                let app = app().await;
                let owner = app.register("owner").await;
                let stranger = app.register("stranger").await;
                let video = app.publish(&owner, "Original").await;
                let path = format!("/api/v1/videos/{}", video["id"].as_str().unwrap());

                let empty = app
                    .server
                    .patch(&path)
                    .add_header(user_header(), user_value(&owner))
                    .multipart(MultipartForm::new())
                    .await;
                empty.assert_status(StatusCode::BAD_REQUEST);

                let forbidden = app
                    .server
                    .patch(&path)
                    .add_header(user_header(), user_value(&stranger))
                    .multipart(MultipartForm::new().add_text("title", "Hijacked"))
                    .await;
                forbidden.assert_status(StatusCode::FORBIDDEN);

                let updated = app
                    .server
                    .patch(&path)
                    .add_header(user_header(), user_value(&owner))
                    .multipart(MultipartForm::new().add_text("title", "Renamed"))
                    .await;
                updated.assert_status_ok();
                let body: Value = updated.json();
                assert_eq!(body["data"]["title"], "Renamed");
                assert_eq!(body["data"]["description"], "About Original");

                app.server
                    .delete(&path)
                    .add_header(user_header(), user_value(&stranger))
                    .await
                    .assert_status(StatusCode::FORBIDDEN);

                let deleted = app
                    .server
                    .delete(&path)
                    .add_header(user_header(), user_value(&owner))
                    .await;
                deleted.assert_status_ok();
                assert_eq!(deleted.json::<Value>()["data"], Value::Null);
                assert_eq!(app.media_objects(), 0);

                app.server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
            }

            // ==============================================================
            // Likes and dashboard
            // ==============================================================

            #[tokio::test]
            async fn test_like_toggle_and_dashboard() {
                let app = app().await;
                let owner = app.register("owner").await;
                let fan = app.register("fan").await;
                let video = app.publish(&owner, "Likeable").await;
                let path = format!(
                    "/api/v1/likes/toggle/v/{}",
                    video["id"].as_str().unwrap()
                );

                let first: Value = app
                    .server
                    .post(&path)
                    .add_header(user_header(), user_value(&fan))
                    .await
                    .json();
                assert_eq!(first["data"], json!({ "liked": true }));

                let second: Value = app
                    .server
                    .post(&path)
                    .add_header(user_header(), user_value(&fan))
                    .await
                    .json();
                assert_eq!(second["data"], json!({ "liked": false }));

                let stats: Value = app
                    .server
                    .get("/api/v1/dashboard/stats")
                    .add_header(user_header(), user_value(&owner))
                    .await
                    .json();
                assert_eq!(stats["data"]["totalLikes"], 0);
                assert_eq!(stats["data"]["totalVideos"], 1);

                app.server
                    .post(&path)
                    .add_header(user_header(), user_value(&fan))
                    .await
                    .assert_status_ok();
                let stats: Value = app
                    .server
                    .get("/api/v1/dashboard/stats")
                    .add_header(user_header(), user_value(&owner))
                    .await
                    .json();
                assert_eq!(stats["data"]["totalLikes"], 1);
            }

            #[tokio::test]
            async fn test_like_missing_target_is_not_found() {
                let app = app().await;
                let fan = app.register("fan").await;

                app.server
                    .post(&format!("/api/v1/likes/toggle/t/{}", Uuid::now_v7()))
                    .add_header(user_header(), user_value(&fan))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_liked_videos_drop_deleted_videos() {
                let app = app().await;
                let owner = app.register("owner").await;
                let fan = app.register("fan").await;
                let video = app.publish(&owner, "Short lived").await;
                let id = video["id"].as_str().unwrap();

                app.server
                    .post(&format!("/api/v1/likes/toggle/v/{}", id))
                    .add_header(user_header(), user_value(&fan))
                    .await
                    .assert_status_ok();
                app.server
                    .delete(&format!("/api/v1/videos/{}", id))
                    .add_header(user_header(), user_value(&owner))
                    .await
                    .assert_status_ok();

                let body: Value = app
                    .server
                    .get("/api/v1/likes/videos")
                    .add_header(user_header(), user_value(&fan))
                    .await
                    .json();
                assert_eq!(body["data"]["totalDocs"], 0);
                assert!(body["data"]["docs"].as_array().unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_liked_videos_hide_unpublished() {
                let app = app().await;
                let owner = app.register("owner").await;
                let fan = app.register("fan").await;
                let kept = app.publish(&owner, "Kept").await;
                let hidden = app.publish(&owner, "Hidden").await;

                for video in [&kept, &hidden] {
                    app.server
                        .post(&format!(
                            "/api/v1/likes/toggle/v/{}",
                            video["id"].as_str().unwrap()
                        ))
                        .add_header(user_header(), user_value(&fan))
                        .await
                        .assert_status_ok();
                }
                app.server
                    .patch(&format!(
                        "/api/v1/videos/toggle/publish/{}",
                        hidden["id"].as_str().unwrap()
                    ))
                    .add_header(user_header(), user_value(&owner))
                    .await
                    .assert_status_ok();

                let body: Value = app
                    .server
                    .get("/api/v1/likes/videos")
                    .add_header(user_header(), user_value(&fan))
                    .await
                    .json();
                let docs = body["data"]["docs"].as_array().unwrap();
                assert_eq!(docs.len(), 1);
                assert_eq!(docs[0]["title"], "Kept");
                assert_eq!(docs[0]["videoId"], kept["id"]);
                assert_eq!(body["data"]["totalDocs"], 1);
            }

            // ==============================================================
            // Comments
            // ==============================================================

            #[tokio::test]
            async fn test_comment_validation_and_owner_fields() {
                let app = app().await;
                let owner = app.register("owner").await;
                let commenter = app.register("commenter").await;
                let video = app.publish(&owner, "Talk").await;
                let path = format!("/api/v1/comments/{}", video["id"].as_str().unwrap());

                let blank = app
                    .server
                    .post(&path)
                    .add_header(user_header(), user_value(&commenter))
                    .json(&json!({ "content": "   " }))
                    .await;
                blank.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(blank.json::<Value>()["errors"][0]["field"], "content");

                let created = app
                    .server
                    .post(&path)
                    .add_header(user_header(), user_value(&commenter))
                    .json(&json!({ "content": "nice!" }))
                    .await;
                created.assert_status(StatusCode::CREATED);
                let body: Value = created.json();
                assert_eq!(body["data"]["content"], "nice!");

                let owner_fields: Vec<&String> =
                    body["data"]["owner"].as_object().unwrap().keys().collect();
                assert_eq!(owner_fields.len(), 3);
                assert_eq!(body["data"]["owner"]["id"], commenter.to_string());
                assert_eq!(body["data"]["owner"]["username"], "commenter");
                assert!(body["data"]["owner"]["avatar"].is_string());

                let listed: Value = app.server.get(&path).await.json();
                assert_eq!(listed["data"]["docs"][0]["owner"], body["data"]["owner"]);
            }

            #[tokio::test]
            async fn test_comment_ownership() {
                let app = app().await;
                let owner = app.register("owner").await;
                let author = app.register("author").await;
                let stranger = app.register("stranger").await;
                let video = app.publish(&owner, "Talk").await;

                let created: Value = app
                    .server
                    .post(&format!("/api/v1/comments/{}", video["id"].as_str().unwrap()))
                    .add_header(user_header(), user_value(&author))
                    .json(&json!({ "content": "mine" }))
                    .await
                    .json();
                let path = format!("/api/v1/comments/c/{}", data_id(&created));

                let forbidden = app
                    .server
                    .patch(&path)
                    .add_header(user_header(), user_value(&stranger))
                    .json(&json!({ "content": "theirs" }))
                    .await;
                forbidden.assert_status(StatusCode::FORBIDDEN);

                app.server
                    .delete(&path)
                    .add_header(user_header(), user_value(&stranger))
                    .await
                    .assert_status(StatusCode::FORBIDDEN);

                let updated = app
                    .server
                    .patch(&path)
                    .add_header(user_header(), user_value(&author))
                    .json(&json!({ "content": "edited" }))
                    .await;
                updated.assert_status_ok();
                assert_eq!(updated.json::<Value>()["data"]["content"], "edited");

                app.server
                    .delete(&path)
                    .add_header(user_header(), user_value(&author))
                    .await
                    .assert_status_ok();
                app.server
                    .delete(&path)
                    .add_header(user_header(), user_value(&author))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_comment_pagination() {
                let app = app().await;
                let owner = app.register("owner").await;
                let video = app.publish(&owner, "Busy").await;
                let path = format!("/api/v1/comments/{}", video["id"].as_str().unwrap());

                for i in 0..5 {
                    app.server
                        .post(&path)
                        .add_header(user_header(), user_value(&owner))
                        .json(&json!({ "content": format!("comment {}", i) }))
                        .await
                        .assert_status(StatusCode::CREATED);
                }

                let body: Value = app
                    .server
                    .get(&path)
                    .add_query_param("page", "3")
                    .add_query_param("limit", "2")
                    .await
                    .json();
                let page = &body["data"];
                assert_eq!(page["docs"].as_array().unwrap().len(), 1);
                assert_eq!(page["totalDocs"], 5);
                assert_eq!(page["totalPages"], 3);
                assert_eq!(page["hasNextPage"], false);
                assert_eq!(page["hasPrevPage"], true);
                assert_eq!(page["prevPage"], 2);
                assert_eq!(page["nextPage"], Value::Null);

                let beyond: Value = app
                    .server
                    .get(&path)
                    .add_query_param("page", "9")
                    .add_query_param("limit", "2")
                    .await
                    .json();
                assert!(beyond["data"]["docs"].as_array().unwrap().is_empty());
                assert_eq!(beyond["data"]["totalDocs"], 5);

                app.server
                    .get(&path)
                    .add_query_param("page", "abc")
                    .await
                    .assert_status(StatusCode::BAD_REQUEST);
                app.server
                    .get(&path)
                    .add_query_param("limit", "0")
                    .await
                    .assert_status(StatusCode::BAD_REQUEST);
            }

            #[tokio::test]
            async fn test_comments_on_missing_video() {
                let app = app().await;
                app.server
                    .get(&format!("/api/v1/comments/{}", Uuid::now_v7()))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_page_far_past_the_end_is_empty() {
                let app = app().await;
                let owner = app.register("owner").await;
                let video = app.publish(&owner, "Lonely").await;

                let response = app
                    .server
                    .get(&format!("/api/v1/comments/{}", video["id"].as_str().unwrap()))
                    .add_query_param("page", i64::MAX.to_string())
                    .add_query_param("limit", "10")
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert!(body["data"]["docs"].as_array().unwrap().is_empty());
                assert_eq!(body["data"]["totalDocs"], 0);
                assert_eq!(body["data"]["hasNextPage"], false);
            }

            #[tokio::test]
            async fn test_hidden_video_is_not_found_for_comments_and_likes() {
                let app = app().await;
                let owner = app.register("owner").await;
                let stranger = app.register("stranger").await;
                let video = app.publish(&owner, "Draft").await;
                let id = video["id"].as_str().unwrap();

                app.server
                    .patch(&format!("/api/v1/videos/toggle/publish/{}", id))
                    .add_header(user_header(), user_value(&owner))
                    .await
                    .assert_status_ok();

                app.server
                    .get(&format!("/api/v1/comments/{}", id))
                    .add_header(user_header(), user_value(&stranger))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
                app.server
                    .get(&format!("/api/v1/comments/{}", id))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
                app.server
                    .post(&format!("/api/v1/comments/{}", id))
                    .add_header(user_header(), user_value(&stranger))
                    .json(&json!({"content": "found it"}))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
                app.server
                    .post(&format!("/api/v1/likes/toggle/v/{}", id))
                    .add_header(user_header(), user_value(&stranger))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);

                // the owner still reaches it
                app.server
                    .post(&format!("/api/v1/comments/{}", id))
                    .add_header(user_header(), user_value(&owner))
                    .json(&json!({"content": "note to self"}))
                    .await
                    .assert_status(StatusCode::CREATED);
                let comments: Value = app
                    .server
                    .get(&format!("/api/v1/comments/{}", id))
                    .add_header(user_header(), user_value(&owner))
                    .await
                    .json();
                assert_eq!(comments["data"]["totalDocs"], 1);
                app.server
                    .post(&format!("/api/v1/likes/toggle/v/{}", id))
                    .add_header(user_header(), user_value(&owner))
                    .await
                    .assert_status_ok();
            }

            // ==============================================================
            // Tweets
            // ==============================================================

            #[tokio::test]
            async fn test_tweets() {
                let app = app().await;
                let author = app.register("author").await;
                let stranger = app.register("stranger").await;

                let too_long = app
                    .server
                    .post("/api/v1/tweets")
                    .add_header(user_header(), user_value(&author))
                    .json(&json!({ "content": "x".repeat(281) }))
                    .await;
                too_long.assert_status(StatusCode::BAD_REQUEST);

                let created = app
                    .server
                    .post("/api/v1/tweets")
                    .add_header(user_header(), user_value(&author))
                    .json(&json!({ "content": "  hello world  " }))
                    .await;
                created.assert_status(StatusCode::CREATED);
                let body: Value = created.json();
                assert_eq!(body["data"]["content"], "hello world");
                let path = format!("/api/v1/tweets/{}", data_id(&body));

                app.server
                    .delete(&path)
                    .add_header(user_header(), user_value(&stranger))
                    .await
                    .assert_status(StatusCode::FORBIDDEN);

                let listed: Value = app
                    .server
                    .get(&format!("/api/v1/tweets/user/{}", author))
                    .await
                    .json();
                assert_eq!(listed["data"]["totalDocs"], 1);
                assert_eq!(listed["data"]["docs"][0]["owner"]["username"], "author");

                app.server
                    .get(&format!("/api/v1/tweets/user/{}", Uuid::now_v7()))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            // ==============================================================
            // Subscriptions
            // ==============================================================

            #[tokio::test]
            async fn test_subscriptions() {
                let app = app().await;
                let channel = app.register("channel").await;
                let fan = app.register("fan").await;
                let path = format!("/api/v1/subscriptions/c/{}", channel);

                app.server
                    .post(&format!("/api/v1/subscriptions/c/{}", fan))
                    .add_header(user_header(), user_value(&fan))
                    .await
                    .assert_status(StatusCode::BAD_REQUEST);

                let first: Value = app
                    .server
                    .post(&path)
                    .add_header(user_header(), user_value(&fan))
                    .await
                    .json();
                assert_eq!(first["data"], json!({ "subscribed": true }));

                let subscribers: Value = app.server.get(&path).await.json();
                assert_eq!(subscribers["data"]["totalDocs"], 1);
                assert_eq!(subscribers["data"]["docs"][0]["username"], "fan");
                assert_eq!(subscribers["data"]["docs"][0]["fullName"], "fan Tester");

                let channels: Value = app
                    .server
                    .get(&format!("/api/v1/subscriptions/u/{}", fan))
                    .await
                    .json();
                assert_eq!(channels["data"]["docs"][0]["id"], channel.to_string());

                let stats: Value = app
                    .server
                    .get("/api/v1/dashboard/stats")
                    .add_header(user_header(), user_value(&channel))
                    .await
                    .json();
                assert_eq!(stats["data"]["totalSubscribers"], 1);

                let second: Value = app
                    .server
                    .post(&path)
                    .add_header(user_header(), user_value(&fan))
                    .await
                    .json();
                assert_eq!(second["data"], json!({ "subscribed": false }));

                app.server
                    .post(&format!("/api/v1/subscriptions/c/{}", Uuid::now_v7()))
                    .add_header(user_header(), user_value(&fan))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            // ==============================================================
            // Playlists
            // ==============================================================

            #[tokio::test]
            async fn test_playlist_lifecycle() {
                let app = app().await;
                let owner = app.register("owner").await;
                let stranger = app.register("stranger").await;
                let video = app.publish(&owner, "Track").await;
                let video_id = video["id"].as_str().unwrap().to_string();

                let created = app
                    .server
                    .post("/api/v1/playlist")
                    .add_header(user_header(), user_value(&owner))
                    .json(&json!({ "name": "Mix", "description": "Favourites" }))
                    .await;
                created.assert_status(StatusCode::CREATED);
                let playlist_id = data_id(&created.json::<Value>());

                let duplicate = app
                    .server
                    .post("/api/v1/playlist")
                    .add_header(user_header(), user_value(&owner))
                    .json(&json!({ "name": "Mix", "description": "Again" }))
                    .await;
                duplicate.assert_status(StatusCode::CONFLICT);
                assert_eq!(
                    duplicate.json::<Value>()["message"],
                    "Playlist with same name already exists"
                );

                let add_path = format!("/api/v1/playlist/add/{}/{}", video_id, playlist_id);
                for _ in 0..2 {
                    app.server
                        .patch(&add_path)
                        .add_header(user_header(), user_value(&owner))
                        .await
                        .assert_status_ok();
                }
                let fetched: Value = app
                    .server
                    .get(&format!("/api/v1/playlist/{}", playlist_id))
                    .await
                    .json();
                assert_eq!(fetched["data"]["videos"], json!([video_id]));

                app.server
                    .patch(&add_path)
                    .add_header(user_header(), user_value(&stranger))
                    .await
                    .assert_status(StatusCode::FORBIDDEN);

                let removed: Value = app
                    .server
                    .patch(&format!("/api/v1/playlist/remove/{}/{}", video_id, playlist_id))
                    .add_header(user_header(), user_value(&owner))
                    .await
                    .json();
                assert_eq!(removed["data"]["videos"], json!([]));

                let listed: Value = app
                    .server
                    .get(&format!("/api/v1/playlist/user/{}", owner))
                    .await
                    .json();
                assert_eq!(listed["data"].as_array().unwrap().len(), 1);

                app.server
                    .delete(&format!("/api/v1/playlist/{}", playlist_id))
                    .add_header(user_header(), user_value(&stranger))
                    .await
                    .assert_status(StatusCode::FORBIDDEN);
                app.server
                    .delete(&format!("/api/v1/playlist/{}", playlist_id))
                    .add_header(user_header(), user_value(&owner))
                    .await
                    .assert_status_ok();
                app.server
                    .get(&format!("/api/v1/playlist/{}", playlist_id))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_playlist_update_rules() {
                let app = app().await;
                let owner = app.register("owner").await;

                let mut ids = vec![];
                for name in ["A", "B"] {
                    let created: Value = app
                        .server
                        .post("/api/v1/playlist")
                        .add_header(user_header(), user_value(&owner))
                        .json(&json!({ "name": name, "description": "d" }))
                        .await
                        .json();
                    ids.push(data_id(&created));
                }
                let path = format!("/api/v1/playlist/{}", ids[1]);

                app.server
                    .patch(&path)
                    .add_header(user_header(), user_value(&owner))
                    .json(&json!({}))
                    .await
                    .assert_status(StatusCode::BAD_REQUEST);

                app.server
                    .patch(&path)
                    .add_header(user_header(), user_value(&owner))
                    .json(&json!({ "name": "A" }))
                    .await
                    .assert_status(StatusCode::CONFLICT);

                let renamed = app
                    .server
                    .patch(&path)
                    .add_header(user_header(), user_value(&owner))
                    .json(&json!({ "name": "C" }))
                    .await;
                renamed.assert_status_ok();
                let body: Value = renamed.json();
                assert_eq!(body["data"]["name"], "C");
                assert_eq!(body["data"]["description"], "d");

                app.server
                    .patch(&format!("/api/v1/playlist/{}", Uuid::now_v7()))
                    .add_header(user_header(), user_value(&owner))
                    .json(&json!({ "name": "D" }))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            // ==============================================================
            // Dashboard
            // ==============================================================

            #[tokio::test]
            async fn test_dashboard_totals_and_videos() {
                let app = app().await;
                let owner = app.register("owner").await;
                let viewer = app.register("viewer").await;
                let video = app.publish(&owner, "One").await;
                app.publish(&owner, "Two").await;

                for _ in 0..3 {
                    app.server
                        .get(&format!("/api/v1/videos/{}", video["id"].as_str().unwrap()))
                        .add_header(user_header(), user_value(&viewer))
                        .await
                        .assert_status_ok();
                }

                let stats: Value = app
                    .server
                    .get("/api/v1/dashboard/stats")
                    .add_header(user_header(), user_value(&owner))
                    .await
                    .json();
                assert_eq!(
                    stats["data"],
                    json!({
                        "totalVideos": 2,
                        "totalViews": 3,
                        "totalLikes": 0,
                        "totalSubscribers": 0,
                    })
                );

                let empty: Value = app
                    .server
                    .get("/api/v1/dashboard/stats")
                    .add_header(user_header(), user_value(&viewer))
                    .await
                    .json();
                assert_eq!(empty["data"]["totalVideos"], 0);
                assert_eq!(empty["data"]["totalViews"], 0);

                let videos: Value = app
                    .server
                    .get("/api/v1/dashboard/videos")
                    .add_header(user_header(), user_value(&owner))
                    .add_query_param("limit", "1")
                    .await
                    .json();
                assert_eq!(videos["data"]["totalDocs"], 2);
                assert_eq!(videos["data"]["docs"][0]["title"], "Two");

                app.server
                    .get("/api/v1/dashboard/stats")
                    .await
                    .assert_status(StatusCode::UNAUTHORIZED);
            }
        }
    };
}
