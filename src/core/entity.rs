//! Entity traits shared by every persisted document

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Base trait for all documents stored in a collection.
///
/// All entities have:
/// - id: UUIDv7 identifier, unique within the collection
/// - createdAt: Creation timestamp
/// - updatedAt: Last modification timestamp
///
/// Entities round-trip through `serde_json::Value`, which is the unit of
/// exchange with every [`DocumentStore`](crate::storage::DocumentStore).
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// The collection name (e.g., "videos", "likes")
    fn resource_name() -> &'static str;

    /// The singular resource name used in messages (e.g., "video")
    fn resource_name_singular() -> &'static str;

    /// Get the unique identifier for this entity instance
    fn id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc>;
}

/// Entities that can only be mutated by the user they reference.
///
/// The owner field is part of the store filter on every mutation, so an
/// update or delete by anyone else matches nothing.
pub trait Owned: Entity {
    /// Wire name of the owner reference (`owner`, `likedBy`, `subscriber`)
    fn owner_field() -> &'static str;

    /// Get the owning user id
    fn owner_id(&self) -> Uuid;

    fn is_owned_by(&self, user_id: &Uuid) -> bool {
        &self.owner_id() == user_id
    }
}
