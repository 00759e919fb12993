//! In-memory implementation of DocumentStore for testing and development

use super::filter::{Filter, Update, UpdateOp};
use super::pipeline::{Accumulator, Pipeline, ProjectField, Projection, SortDirection, SortKey, Stage};
use super::{DocumentStore, IndexSpec};
use crate::core::error::StoreError;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

const BACKEND: &str = "in-memory";

#[derive(Default)]
struct State {
    collections: HashMap<String, Vec<Value>>,
    indexes: Vec<IndexSpec>,
}

impl State {
    fn docs(&self, collection: &str) -> &[Value] {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Reject `candidate` if it collides with another document on `id` or on
    /// any unique index of the collection. `skip` is the position of the
    /// document being replaced, if any.
    fn check_unique(
        &self,
        collection: &str,
        candidate: &Value,
        skip: Option<usize>,
    ) -> Result<(), StoreError> {
        let docs = self.docs(collection);
        let others = docs
            .iter()
            .enumerate()
            .filter(|(pos, _)| Some(*pos) != skip)
            .map(|(_, doc)| doc);

        for other in others {
            if values_equal(lookup(other, "id"), lookup(candidate, "id")) {
                return Err(StoreError::DuplicateKey {
                    collection: collection.to_string(),
                    keys: vec!["id".to_string()],
                });
            }

            for index in self.indexes.iter().filter(|i| i.collection == collection) {
                let collides = index
                    .fields
                    .iter()
                    .all(|field| values_equal(lookup(other, field), lookup(candidate, field)));
                if collides {
                    return Err(StoreError::DuplicateKey {
                        collection: collection.to_string(),
                        keys: index.fields.iter().map(|f| f.to_string()).collect(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// In-memory document store
///
/// Useful for testing and development. Uses a single RwLock so every
/// operation, including a whole aggregation, sees a consistent snapshot.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|e| StoreError::backend(BACKEND, format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|e| StoreError::backend(BACKEND, format!("Failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn ensure_indexes(&self, indexes: &[IndexSpec]) -> Result<(), StoreError> {
        let mut state = self.write()?;
        for index in indexes {
            if !state.indexes.contains(index) {
                state.indexes.push(index.clone());
            }
        }
        Ok(())
    }

    async fn insert_one(&self, collection: &str, document: Value) -> Result<(), StoreError> {
        if !document.is_object() {
            return Err(StoreError::serialization(collection, "document is not an object"));
        }

        let mut state = self.write()?;
        state.check_unique(collection, &document, None)?;
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(document);

        tracing::debug!(collection, backend = BACKEND, "inserted document");
        Ok(())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Value>, StoreError> {
        let state = self.read()?;
        Ok(state
            .docs(collection)
            .iter()
            .find(|doc| matches(doc, filter))
            .cloned())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: &[SortKey],
    ) -> Result<Vec<Value>, StoreError> {
        let state = self.read()?;
        let mut docs: Vec<Value> = state
            .docs(collection)
            .iter()
            .filter(|doc| matches(doc, filter))
            .cloned()
            .collect();
        sort_documents(&mut docs, sort);
        Ok(docs)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let state = self.read()?;
        Ok(state
            .docs(collection)
            .iter()
            .filter(|doc| matches(doc, filter))
            .count() as u64)
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<Value>, StoreError> {
        let mut state = self.write()?;

        let Some(pos) = state.docs(collection).iter().position(|doc| matches(doc, filter)) else {
            return Ok(None);
        };

        let mut updated = state.docs(collection)[pos].clone();
        apply_update(&mut updated, update)?;
        state.check_unique(collection, &updated, Some(pos))?;

        if let Some(docs) = state.collections.get_mut(collection) {
            docs[pos] = updated.clone();
        }

        tracing::debug!(collection, backend = BACKEND, ops = update.ops.len(), "updated document");
        Ok(Some(updated))
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Value>, StoreError> {
        let mut state = self.write()?;
        let Some(docs) = state.collections.get_mut(collection) else {
            return Ok(None);
        };

        let removed = docs
            .iter()
            .position(|doc| matches(doc, filter))
            .map(|pos| docs.remove(pos));

        if removed.is_some() {
            tracing::debug!(collection, backend = BACKEND, "deleted document");
        }
        Ok(removed)
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<Value>, StoreError> {
        let state = self.read()?;
        let mut docs = state.docs(collection).to_vec();

        for stage in &pipeline.stages {
            docs = run_stage(&state, docs, stage);
        }

        tracing::debug!(
            collection,
            backend = BACKEND,
            stages = pipeline.stages.len(),
            rows = docs.len(),
            "aggregated"
        );
        Ok(docs)
    }
}

// ---------------------------------------------------------------------------
// Document evaluation
// ---------------------------------------------------------------------------

/// Resolve a dotted path inside a document
fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |current, segment| current.get(segment))
}

/// Set a dotted path, creating intermediate objects
fn set_path(doc: &mut Value, path: &str, value: Value) {
    let mut current = doc;
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };

        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

fn is_nullish(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn values_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (a, b) if is_nullish(a) && is_nullish(b) => true,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x.as_f64() == y.as_f64(),
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Cross-type ordering: null < numbers < strings < objects < arrays < booleans
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Equality with array-membership semantics on the document side
fn field_matches(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        Some(Value::Array(items)) if !expected.is_array() => {
            items.iter().any(|item| values_equal(Some(item), Some(expected)))
        }
        _ => values_equal(actual, Some(expected)),
    }
}

fn matches(doc: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::All => true,
        Filter::Eq(field, expected) => field_matches(lookup(doc, field), expected),
        Filter::Ne(field, expected) => !field_matches(lookup(doc, field), expected),
        Filter::In(field, candidates) => {
            let actual = lookup(doc, field);
            candidates.iter().any(|c| field_matches(actual, c))
        }
        Filter::Contains { field, needle } => match lookup(doc, field) {
            Some(Value::String(text)) => text.to_lowercase().contains(&needle.to_lowercase()),
            _ => false,
        },
        Filter::And(filters) => filters.iter().all(|f| matches(doc, f)),
        Filter::Or(filters) => filters.iter().any(|f| matches(doc, f)),
    }
}

fn sort_documents(docs: &mut [Value], keys: &[SortKey]) {
    docs.sort_by(|a, b| {
        keys.iter()
            .map(|key| {
                let ord = compare_values(lookup(a, &key.field), lookup(b, &key.field));
                match key.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

fn array_field<'a>(doc: &'a mut Value, field: &str) -> Result<&'a mut Vec<Value>, StoreError> {
    let Value::Object(map) = doc else {
        return Err(StoreError::backend(BACKEND, "document is not an object"));
    };

    let slot = map
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if slot.is_null() {
        *slot = Value::Array(Vec::new());
    }

    slot.as_array_mut()
        .ok_or_else(|| StoreError::backend(BACKEND, format!("field '{}' is not an array", field)))
}

fn apply_update(doc: &mut Value, update: &Update) -> Result<(), StoreError> {
    for op in &update.ops {
        match op {
            UpdateOp::Set(field, value) => set_path(doc, field, value.clone()),
            UpdateOp::Inc(field, by) => {
                let next = match lookup(doc, field) {
                    None | Some(Value::Null) => Value::from(*by),
                    Some(Value::Number(n)) => match n.as_i64() {
                        Some(current) => Value::from(current.saturating_add(*by)),
                        None => Value::from(n.as_f64().unwrap_or(0.0) + *by as f64),
                    },
                    Some(_) => {
                        return Err(StoreError::backend(
                            BACKEND,
                            format!("cannot increment non-numeric field '{}'", field),
                        ));
                    }
                };
                set_path(doc, field, next);
            }
            UpdateOp::AddToSet(field, value) => {
                let items = array_field(doc, field)?;
                if !items.iter().any(|item| values_equal(Some(item), Some(value))) {
                    items.push(value.clone());
                }
            }
            UpdateOp::Pull(field, value) => {
                let items = array_field(doc, field)?;
                items.retain(|item| !values_equal(Some(item), Some(value)));
            }
            UpdateOp::PushFront(field, value) => {
                array_field(doc, field)?.insert(0, value.clone());
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pipeline evaluation
// ---------------------------------------------------------------------------

fn run_stage(state: &State, docs: Vec<Value>, stage: &Stage) -> Vec<Value> {
    match stage {
        Stage::Match(filter) => docs.into_iter().filter(|d| matches(d, filter)).collect(),
        Stage::Lookup {
            from,
            local_field,
            foreign_field,
            as_field,
        } => {
            let foreign = state.docs(from);
            docs.into_iter()
                .map(|mut doc| {
                    let joined: Vec<Value> = {
                        let local = lookup(&doc, local_field);
                        foreign
                            .iter()
                            .filter(|f| local_matches(local, lookup(f, foreign_field)))
                            .cloned()
                            .collect()
                    };
                    set_path(&mut doc, as_field, Value::Array(joined));
                    doc
                })
                .collect()
        }
        Stage::Unwind(field) => docs
            .into_iter()
            .flat_map(|doc| match lookup(&doc, field) {
                Some(Value::Array(items)) => items
                    .clone()
                    .into_iter()
                    .map(|item| {
                        let mut row = doc.clone();
                        set_path(&mut row, field, item);
                        row
                    })
                    .collect::<Vec<_>>(),
                None | Some(Value::Null) => Vec::new(),
                Some(_) => vec![doc.clone()],
            })
            .collect(),
        Stage::Sort(keys) => {
            let mut docs = docs;
            sort_documents(&mut docs, keys);
            docs
        }
        Stage::Project(projection) => docs
            .iter()
            .map(|doc| Value::Object(project(doc, projection, None)))
            .collect(),
        Stage::Group(accumulators) => {
            if docs.is_empty() {
                return Vec::new();
            }
            vec![group(&docs, accumulators)]
        }
        Stage::Skip(n) => docs.into_iter().skip(*n as usize).collect(),
        Stage::Limit(n) => docs.into_iter().take(*n as usize).collect(),
        Stage::Count(name) => {
            if docs.is_empty() {
                return Vec::new();
            }
            let mut row = Map::new();
            row.insert(name.clone(), Value::from(docs.len() as u64));
            vec![Value::Object(row)]
        }
    }
}

fn local_matches(local: Option<&Value>, foreign: Option<&Value>) -> bool {
    match local {
        Some(Value::Array(items)) => items.iter().any(|item| values_equal(Some(item), foreign)),
        _ => values_equal(local, foreign),
    }
}

/// Build a projected object; `prefix` is the input path of a nested projection
fn project(doc: &Value, projection: &Projection, prefix: Option<&str>) -> Map<String, Value> {
    let mut out = Map::new();

    for (name, field) in &projection.fields {
        let value = match field {
            ProjectField::Include => {
                let path = match prefix {
                    Some(prefix) => format!("{}.{}", prefix, name),
                    None => name.clone(),
                };
                lookup(doc, &path).cloned()
            }
            ProjectField::Path(path) => lookup(doc, path).cloned(),
            ProjectField::Nested(inner) => {
                let path = match prefix {
                    Some(prefix) => format!("{}.{}", prefix, name),
                    None => name.clone(),
                };
                Some(Value::Object(project(doc, inner, Some(&path))))
            }
        };

        if let Some(value) = value {
            out.insert(name.clone(), value);
        }
    }

    out
}

fn group(docs: &[Value], accumulators: &IndexMap<String, Accumulator>) -> Value {
    let mut row = Map::new();
    row.insert("id".to_string(), Value::Null);

    for (name, accumulator) in accumulators {
        let value = match accumulator {
            Accumulator::Count => Value::from(docs.len() as u64),
            Accumulator::Sum(field) => {
                let numbers: Vec<&serde_json::Number> = docs
                    .iter()
                    .filter_map(|doc| lookup(doc, field).and_then(Value::as_number))
                    .collect();

                if numbers.iter().all(|n| n.is_i64()) {
                    Value::from(numbers.iter().filter_map(|n| n.as_i64()).sum::<i64>())
                } else {
                    Value::from(numbers.iter().filter_map(|n| n.as_f64()).sum::<f64>())
                }
            }
        };
        row.insert(name.clone(), value);
    }

    Value::Object(row)
}
