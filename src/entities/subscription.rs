use super::timestamp;
use crate::impl_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `subscriber` follows `channel`; the pair is unique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub subscriber: Uuid,
    pub channel: Uuid,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Subscription, "subscriptions", "subscription", owned_by subscriber as "subscriber");

impl Subscription {
    pub fn new(subscriber: Uuid, channel: Uuid) -> Self {
        let now = timestamp::now();
        Self {
            id: Uuid::now_v7(),
            subscriber,
            channel,
            created_at: now,
            updated_at: now,
        }
    }
}
