//! Shared test harness for storage backend testing
//!
//! Provides document fixtures built from the real entity types, plus two
//! macro-generated suites every backend runs:
//!
//! - `document_store_tests!`: the [`DocumentStore`] contract
//! - `api_integration_tests!`: HTTP scenarios through the full router
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//!
//! document_store_tests!(InMemoryStore::new());
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod api_tests;

pub use api_tests::*;

use serde_json::Value;
use uuid::Uuid;
use vidtube::entities::{Comment, Like, LikeTarget, Playlist, User, Video};
use vidtube::storage::DocumentStore;

/// Serialize an entity into the document a service would store
pub fn to_doc<T: serde::Serialize>(entity: &T) -> Value {
    serde_json::to_value(entity).expect("entity serializes")
}

pub fn test_user(username: &str) -> User {
    User::new(
        username,
        format!("{}@test.com", username),
        format!("{} Tester", username),
        format!("http://media/{}.png", username),
        None,
    )
}

pub fn test_video(owner: &Uuid, title: &str, views: i64, published: bool) -> Video {
    let mut video = Video::new(
        *owner,
        title,
        format!("About {}", title),
        format!("http://media/{}.mp4", title),
        format!("http://media/{}.jpg", title),
        60.0,
    );
    video.views = views;
    video.is_published = published;
    video
}

pub fn test_comment(video: &Uuid, owner: &Uuid, content: &str) -> Comment {
    Comment::new(*video, *owner, content)
}

pub fn test_like(target: LikeTarget, liked_by: &Uuid) -> Like {
    Like::new(target, *liked_by)
}

pub fn test_playlist(owner: &Uuid, name: &str) -> Playlist {
    Playlist::new(*owner, name, format!("{} playlist", name))
}

/// Insert an entity, panicking on failure
pub async fn seed<T: serde::Serialize>(store: &dyn DocumentStore, collection: &str, entity: &T) {
    store
        .insert_one(collection, to_doc(entity))
        .await
        .expect("seed insert succeeds");
}

/// String form of a document id
pub fn id_of(doc: &Value) -> &str {
    doc["id"].as_str().expect("document has a string id")
}
