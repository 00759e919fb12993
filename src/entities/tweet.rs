use super::timestamp;
use crate::impl_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum tweet length in characters, after trimming
pub const MAX_TWEET_CHARS: usize = 280;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub id: Uuid,
    pub owner: Uuid,
    pub content: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Tweet, "tweets", "tweet", owned_by owner as "owner");

impl Tweet {
    pub fn new(owner: Uuid, content: impl Into<String>) -> Self {
        let now = timestamp::now();
        Self {
            id: Uuid::now_v7(),
            owner,
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
