use super::timestamp;
use crate::impl_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An uploaded video and its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub owner: Uuid,
    pub title: String,
    pub description: String,

    /// Media URL of the video object
    pub video_file: String,

    /// Media URL of the thumbnail image
    pub thumbnail: String,

    /// Length in seconds as reported by media storage
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,

    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Video, "videos", "video", owned_by owner as "owner");

impl Video {
    pub fn new(
        owner: Uuid,
        title: impl Into<String>,
        description: impl Into<String>,
        video_file: impl Into<String>,
        thumbnail: impl Into<String>,
        duration: f64,
    ) -> Self {
        let now = timestamp::now();
        Self {
            id: Uuid::now_v7(),
            owner,
            title: title.into(),
            description: description.into(),
            video_file: video_file.into(),
            thumbnail: thumbnail.into(),
            duration,
            views: 0,
            is_published: true,
            created_at: now,
            updated_at: now,
        }
    }
}
