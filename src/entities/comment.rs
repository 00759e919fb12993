use super::timestamp;
use crate::impl_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub video: Uuid,
    pub owner: Uuid,
    pub content: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Comment, "comments", "comment", owned_by owner as "owner");

impl Comment {
    pub fn new(video: Uuid, owner: Uuid, content: impl Into<String>) -> Self {
        let now = timestamp::now();
        Self {
            id: Uuid::now_v7(),
            video,
            owner,
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
