//! MongoDB storage backend using the official MongoDB async driver.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag:
//! ```toml
//! [dependencies]
//! vidtube = { version = "0.1", features = ["mongodb_backend"] }
//! ```
//!
//! # Serialization strategy
//!
//! Documents arrive as `serde_json::Value` and are converted to BSON, so ids
//! are stored as strings and timestamps as fixed-precision RFC 3339 strings.
//! The `id` field is mapped to MongoDB's `_id` convention on the way in
//! (documents, filter paths, pipeline paths) and back on the way out.

use super::filter::{Filter, Update, UpdateOp};
use super::pipeline::{Accumulator, Pipeline, ProjectField, Projection, SortDirection, SortKey, Stage};
use super::{DocumentStore, IndexSpec, unique_indexes};
use crate::core::error::StoreError;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Database, IndexModel};
use serde_json::Value;

const BACKEND: &str = "MongoDB";
const DUPLICATE_KEY_CODE: i32 = 11000;

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Rename every `id` segment of a dotted path to `_id`
fn mongo_path(path: &str) -> String {
    path.split('.')
        .map(|segment| if segment == "id" { "_id" } else { segment })
        .collect::<Vec<_>>()
        .join(".")
}

fn json_to_bson(value: &Value) -> Result<Bson, StoreError> {
    mongodb::bson::to_bson(value)
        .map_err(|e| StoreError::backend(BACKEND, format!("Failed to convert JSON to BSON: {}", e)))
}

/// Convert a JSON object into a BSON document, renaming `id` → `_id`.
fn json_to_document(collection: &str, json: Value) -> Result<Document, StoreError> {
    let mut doc = match json_to_bson(&json)? {
        Bson::Document(d) => d,
        _ => return Err(StoreError::serialization(collection, "expected a JSON object")),
    };

    if let Some(id) = doc.remove("id") {
        doc.insert("_id", id);
    }

    Ok(doc)
}

/// Rename `_id` → `id` at every level of a JSON value
fn rename_ids(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    let key = if k == "_id" { "id".to_string() } else { k };
                    (key, rename_ids(v))
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(rename_ids).collect()),
        other => other,
    }
}

/// Convert a BSON document back into JSON with domain field names.
fn document_to_json(doc: Document) -> Value {
    rename_ids(Bson::Document(doc).into_relaxed_extjson())
}

fn filter_to_document(filter: &Filter) -> Result<Document, StoreError> {
    Ok(match filter {
        Filter::All => Document::new(),
        Filter::Eq(field, value) => doc! { mongo_path(field): json_to_bson(value)? },
        Filter::Ne(field, value) => doc! { mongo_path(field): { "$ne": json_to_bson(value)? } },
        Filter::In(field, values) => {
            let values = values.iter().map(json_to_bson).collect::<Result<Vec<_>, _>>()?;
            doc! { mongo_path(field): { "$in": values } }
        }
        Filter::Contains { field, needle } => doc! {
            mongo_path(field): { "$regex": regex::escape(needle), "$options": "i" }
        },
        Filter::And(filters) if filters.is_empty() => Document::new(),
        Filter::And(filters) => doc! { "$and": filters_to_array(filters)? },
        Filter::Or(filters) if filters.is_empty() => doc! { "$expr": false },
        Filter::Or(filters) => doc! { "$or": filters_to_array(filters)? },
    })
}

fn filters_to_array(filters: &[Filter]) -> Result<Vec<Document>, StoreError> {
    filters.iter().map(filter_to_document).collect()
}

fn update_to_document(update: &Update) -> Result<Document, StoreError> {
    let mut grouped = Document::new();

    let mut add = |operator: &str, field: &str, value: Bson| {
        let entry = grouped
            .entry(operator.to_string())
            .or_insert_with(|| Bson::Document(Document::new()));
        if let Bson::Document(fields) = entry {
            fields.insert(mongo_path(field), value);
        }
    };

    for op in &update.ops {
        match op {
            UpdateOp::Set(field, value) => add("$set", field, json_to_bson(value)?),
            UpdateOp::Inc(field, by) => add("$inc", field, Bson::Int64(*by)),
            UpdateOp::AddToSet(field, value) => add("$addToSet", field, json_to_bson(value)?),
            UpdateOp::Pull(field, value) => add("$pull", field, json_to_bson(value)?),
            UpdateOp::PushFront(field, value) => add(
                "$push",
                field,
                Bson::Document(doc! { "$each": [json_to_bson(value)?], "$position": 0 }),
            ),
        }
    }

    Ok(grouped)
}

fn sort_to_document(keys: &[SortKey]) -> Document {
    let mut sort = Document::new();
    for key in keys {
        let direction = match key.direction {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        };
        sort.insert(mongo_path(&key.field), direction);
    }
    sort
}

/// Compile a projection. Top-level output keys follow the document naming
/// (`id` → `_id`); nested projections are built from path expressions.
fn projection_to_document(projection: &Projection, prefix: Option<&str>) -> Document {
    let mut out = Document::new();

    for (name, field) in &projection.fields {
        let input_path = match prefix {
            Some(prefix) => format!("{}.{}", prefix, name),
            None => name.clone(),
        };

        let value = match (field, prefix) {
            (ProjectField::Include, None) => Bson::Int32(1),
            (ProjectField::Include, Some(_)) => Bson::String(format!("${}", mongo_path(&input_path))),
            (ProjectField::Path(path), _) => Bson::String(format!("${}", mongo_path(path))),
            (ProjectField::Nested(inner), _) => {
                Bson::Document(projection_to_document(inner, Some(&input_path)))
            }
        };

        let key = if prefix.is_none() { mongo_path(name) } else { name.clone() };
        out.insert(key, value);
    }

    if prefix.is_none() && !out.contains_key("_id") {
        out.insert("_id", 0);
    }

    out
}

/// BSON has no unsigned 64-bit integer; saturate instead of wrapping
fn clamp_count(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn stage_to_document(stage: &Stage) -> Result<Document, StoreError> {
    Ok(match stage {
        Stage::Match(filter) => doc! { "$match": filter_to_document(filter)? },
        Stage::Lookup {
            from,
            local_field,
            foreign_field,
            as_field,
        } => doc! {
            "$lookup": {
                "from": from.as_str(),
                "localField": mongo_path(local_field),
                "foreignField": mongo_path(foreign_field),
                "as": as_field.as_str(),
            }
        },
        Stage::Unwind(field) => doc! { "$unwind": format!("${}", mongo_path(field)) },
        Stage::Sort(keys) => doc! { "$sort": sort_to_document(keys) },
        Stage::Project(projection) => doc! { "$project": projection_to_document(projection, None) },
        Stage::Group(accumulators) => {
            let mut group = doc! { "_id": Bson::Null };
            for (name, accumulator) in accumulators {
                let sum = match accumulator {
                    Accumulator::Count => Bson::Int32(1),
                    Accumulator::Sum(field) => Bson::String(format!("${}", mongo_path(field))),
                };
                group.insert(name.clone(), doc! { "$sum": sum });
            }
            doc! { "$group": group }
        }
        Stage::Skip(n) => doc! { "$skip": clamp_count(*n) },
        Stage::Limit(n) => doc! { "$limit": clamp_count(*n) },
        Stage::Count(name) => doc! { "$count": name.as_str() },
    })
}

fn map_error(collection: &str, action: &str, err: mongodb::error::Error) -> StoreError {
    let duplicate = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    };

    if duplicate {
        let message = err.to_string();
        let keys = unique_indexes()
            .into_iter()
            .find(|index| message.contains(&index.name()))
            .map(|index| index.fields.iter().map(|f| f.to_string()).collect())
            .unwrap_or_else(|| vec!["id".to_string()]);

        return StoreError::DuplicateKey {
            collection: collection.to_string(),
            keys,
        };
    }

    StoreError::backend(BACKEND, format!("Failed to {} in '{}': {}", action, collection, err))
}

// ---------------------------------------------------------------------------
// MongoStore
// ---------------------------------------------------------------------------

/// Document store backed by MongoDB.
///
/// Each collection name maps to the MongoDB collection of the same name.
///
/// # Example
///
/// ```rust,ignore
/// use vidtube::storage::MongoStore;
///
/// let store = MongoStore::connect("mongodb://localhost:27017", "vidtube").await?;
/// store.ensure_indexes(&unique_indexes()).await?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Create a new `MongoStore` with the given database handle.
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Connect to `uri` and use database `name`
    pub async fn connect(uri: &str, name: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StoreError::backend(BACKEND, format!("Failed to connect: {}", e)))?;
        Ok(Self::new(client.database(name)))
    }

    /// Get a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.database.collection(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    /// Idempotent: re-creating an identical index is a no-op in MongoDB
    async fn ensure_indexes(&self, indexes: &[IndexSpec]) -> Result<(), StoreError> {
        for index in indexes {
            let mut keys = Document::new();
            for field in index.fields {
                keys.insert(mongo_path(field), 1);
            }

            let model = IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name(index.name())
                        .build(),
                )
                .build();

            self.collection(index.collection)
                .create_index(model)
                .await
                .map_err(|e| map_error(index.collection, "create index", e))?;
        }

        tracing::info!(count = indexes.len(), "ensured MongoDB unique indexes");
        Ok(())
    }

    async fn insert_one(&self, collection: &str, document: Value) -> Result<(), StoreError> {
        let doc = json_to_document(collection, document)?;
        self.collection(collection)
            .insert_one(doc)
            .await
            .map_err(|e| map_error(collection, "insert document", e))?;

        tracing::debug!(collection, backend = BACKEND, "inserted document");
        Ok(())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Value>, StoreError> {
        let doc = self
            .collection(collection)
            .find_one(filter_to_document(filter)?)
            .await
            .map_err(|e| map_error(collection, "find document", e))?;

        Ok(doc.map(document_to_json))
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: &[SortKey],
    ) -> Result<Vec<Value>, StoreError> {
        let cursor = self
            .collection(collection)
            .find(filter_to_document(filter)?)
            .sort(sort_to_document(sort))
            .await
            .map_err(|e| map_error(collection, "find documents", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| map_error(collection, "collect documents", e))?;

        Ok(docs.into_iter().map(document_to_json).collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.collection(collection)
            .count_documents(filter_to_document(filter)?)
            .await
            .map_err(|e| map_error(collection, "count documents", e))
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<Value>, StoreError> {
        let doc = self
            .collection(collection)
            .find_one_and_update(filter_to_document(filter)?, update_to_document(update)?)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| map_error(collection, "update document", e))?;

        tracing::debug!(collection, backend = BACKEND, matched = doc.is_some(), "updated document");
        Ok(doc.map(document_to_json))
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Value>, StoreError> {
        let doc = self
            .collection(collection)
            .find_one_and_delete(filter_to_document(filter)?)
            .await
            .map_err(|e| map_error(collection, "delete document", e))?;

        Ok(doc.map(document_to_json))
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<Value>, StoreError> {
        let stages = pipeline
            .stages
            .iter()
            .map(stage_to_document)
            .collect::<Result<Vec<_>, _>>()?;

        let cursor = self
            .collection(collection)
            .aggregate(stages)
            .await
            .map_err(|e| map_error(collection, "aggregate", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| map_error(collection, "collect aggregation", e))?;

        tracing::debug!(collection, backend = BACKEND, rows = docs.len(), "aggregated");
        Ok(docs.into_iter().map(document_to_json).collect())
    }
}
