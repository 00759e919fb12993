//! Registered users (channels)

use super::timestamp;
use crate::impl_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    #[serde(default)]
    pub cover_image: Option<String>,

    /// Video ids, most recent first, without duplicates
    #[serde(default)]
    pub watch_history: Vec<Uuid>,

    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl_entity!(User, "users", "user");

impl User {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        full_name: impl Into<String>,
        avatar: impl Into<String>,
        cover_image: Option<String>,
    ) -> Self {
        let now = timestamp::now();
        Self {
            id: Uuid::now_v7(),
            username: username.into().trim().to_lowercase(),
            email: email.into().trim().to_lowercase(),
            full_name: full_name.into().trim().to_string(),
            avatar: avatar.into(),
            cover_image,
            watch_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
