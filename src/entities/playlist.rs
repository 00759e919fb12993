use super::timestamp;
use crate::impl_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named, ordered set of videos; `(owner, name)` is unique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub videos: Vec<Uuid>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Playlist, "playlists", "playlist", owned_by owner as "owner");

impl Playlist {
    pub fn new(owner: Uuid, name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = timestamp::now();
        Self {
            id: Uuid::now_v7(),
            owner,
            name: name.into(),
            description: description.into(),
            videos: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
