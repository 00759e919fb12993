//! Document storage
//!
//! Every backend implements [`DocumentStore`], a small collection-oriented
//! API over `serde_json::Value` documents plus the aggregation pipeline
//! vocabulary in [`pipeline`]. Typed access goes through [`Repository`].
//!
//! Backends:
//! - [`InMemoryStore`]: always available, used for development and tests
//! - [`MongoStore`]: feature `mongodb_backend`

pub mod filter;
pub mod in_memory;
#[cfg(feature = "mongodb_backend")]
pub mod mongodb;
pub mod pipeline;

pub use filter::{Filter, Update, UpdateOp, id_value};
pub use in_memory::InMemoryStore;
#[cfg(feature = "mongodb_backend")]
pub use mongodb::MongoStore;
pub use pipeline::{Accumulator, Pipeline, ProjectField, Projection, SortDirection, SortKey, Stage};

use crate::core::entity::{Entity, Owned};
use crate::core::error::{ApiError, StoreError};
use crate::entities::timestamp;
use async_trait::async_trait;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// A unique index over one or more fields of a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub collection: &'static str,
    pub fields: &'static [&'static str],
}

impl IndexSpec {
    /// Index name shared by every backend
    pub fn name(&self) -> String {
        format!("uniq_{}_{}", self.collection, self.fields.join("_"))
    }
}

/// Unique indexes the domain relies on
pub fn unique_indexes() -> Vec<IndexSpec> {
    vec![
        IndexSpec {
            collection: "users",
            fields: &["username"],
        },
        IndexSpec {
            collection: "users",
            fields: &["email"],
        },
        IndexSpec {
            collection: "likes",
            fields: &["likedBy", "video", "comment", "tweet"],
        },
        IndexSpec {
            collection: "subscriptions",
            fields: &["subscriber", "channel"],
        },
        IndexSpec {
            collection: "playlists",
            fields: &["owner", "name"],
        },
    ]
}

/// Collection-oriented storage over JSON documents
///
/// Documents use wire field names and carry their identifier under `id`.
/// Implementations must make each single-document operation atomic and
/// reject writes that violate an index registered with
/// [`ensure_indexes`](DocumentStore::ensure_indexes).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name used in logs and errors
    fn backend_name(&self) -> &'static str;

    /// Register unique indexes; idempotent
    async fn ensure_indexes(&self, indexes: &[IndexSpec]) -> Result<(), StoreError>;

    async fn insert_one(&self, collection: &str, document: Value) -> Result<(), StoreError>;

    async fn find_one(&self, collection: &str, filter: &Filter)
    -> Result<Option<Value>, StoreError>;

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: &[SortKey],
    ) -> Result<Vec<Value>, StoreError>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Apply `update` to the first matching document and return it as it is
    /// after the update
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<Value>, StoreError>;

    /// Remove the first matching document and return it
    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Value>, StoreError>;

    async fn aggregate(&self, collection: &str, pipeline: &Pipeline)
    -> Result<Vec<Value>, StoreError>;
}

/// Typed access to the collection of `T`
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    fn encode(entity: &T) -> Result<Value, StoreError> {
        serde_json::to_value(entity)
            .map_err(|e| StoreError::serialization(T::resource_name(), e))
    }

    fn decode(document: Value) -> Result<T, StoreError> {
        serde_json::from_value(document)
            .map_err(|e| StoreError::serialization(T::resource_name(), e))
    }

    pub async fn insert(&self, entity: T) -> Result<T, StoreError> {
        let document = Self::encode(&entity)?;
        self.store.insert_one(T::resource_name(), document).await?;
        Ok(entity)
    }

    pub async fn get(&self, id: &Uuid) -> Result<Option<T>, StoreError> {
        self.find_one(&Filter::by_id(id)).await
    }

    pub async fn find_one(&self, filter: &Filter) -> Result<Option<T>, StoreError> {
        self.store
            .find_one(T::resource_name(), filter)
            .await?
            .map(Self::decode)
            .transpose()
    }

    pub async fn find(&self, filter: &Filter, sort: &[SortKey]) -> Result<Vec<T>, StoreError> {
        self.store
            .find(T::resource_name(), filter, sort)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    pub async fn exists(&self, filter: &Filter) -> Result<bool, StoreError> {
        Ok(self.store.find_one(T::resource_name(), filter).await?.is_some())
    }

    pub async fn count(&self, filter: &Filter) -> Result<u64, StoreError> {
        self.store.count(T::resource_name(), filter).await
    }

    /// Update the first match, stamping `updatedAt`, and return the result
    pub async fn update(&self, filter: &Filter, update: Update) -> Result<Option<T>, StoreError> {
        let update = if update.touches("updatedAt") {
            update
        } else {
            update.set("updatedAt", timestamp::to_value(&timestamp::now()))
        };

        self.store
            .find_one_and_update(T::resource_name(), filter, &update)
            .await?
            .map(Self::decode)
            .transpose()
    }

    pub async fn delete(&self, filter: &Filter) -> Result<Option<T>, StoreError> {
        self.store
            .find_one_and_delete(T::resource_name(), filter)
            .await?
            .map(Self::decode)
            .transpose()
    }

    /// `NotFound` error naming this entity
    pub fn not_found() -> ApiError {
        ApiError::not_found(format!("{} not found", capitalize(T::resource_name_singular())))
    }
}

impl<T: Owned> Repository<T> {
    fn owned_filter(id: &Uuid, actor: &Uuid) -> Filter {
        Filter::and([Filter::by_id(id), Filter::id_eq(T::owner_field(), actor)])
    }

    /// Explain why an owner-scoped write matched nothing
    ///
    /// The document either exists under another owner (`Forbidden`) or does
    /// not exist at all (`NotFound`).
    async fn classify_miss(&self, id: &Uuid, action: &str) -> ApiError {
        match self.exists(&Filter::by_id(id)).await {
            Ok(true) => ApiError::forbidden(format!(
                "You are not allowed to {} this {}",
                action,
                T::resource_name_singular()
            )),
            Ok(false) => Self::not_found(),
            Err(e) => e.into(),
        }
    }

    /// Update a document only if `actor` owns it
    pub async fn update_owned(&self, id: &Uuid, actor: &Uuid, update: Update) -> Result<T, ApiError> {
        match self.update(&Self::owned_filter(id, actor), update).await? {
            Some(entity) => Ok(entity),
            None => Err(self.classify_miss(id, "modify").await),
        }
    }

    /// Delete a document only if `actor` owns it
    pub async fn delete_owned(&self, id: &Uuid, actor: &Uuid) -> Result<T, ApiError> {
        match self.delete(&Self::owned_filter(id, actor)).await? {
            Some(entity) => Ok(entity),
            None => Err(self.classify_miss(id, "delete").await),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
