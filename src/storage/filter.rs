//! Backend-neutral filters and updates
//!
//! Field names are wire names (camelCase, `id` for the identifier) and may be
//! dotted paths into embedded documents (`video.isPublished`). Each backend
//! translates these values into its own query language.

use serde_json::Value;
use uuid::Uuid;

/// Encode an id the way it is stored
pub fn id_value(id: &Uuid) -> Value {
    Value::String(id.to_string())
}

/// A predicate over documents
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document
    All,

    /// Field equals value; `Null` also matches a missing field, and an array
    /// field matches when any element equals the value
    Eq(String, Value),

    /// Negation of [`Filter::Eq`]
    Ne(String, Value),

    /// Field equals any of the values
    In(String, Vec<Value>),

    /// Case-insensitive substring match; the needle is literal text
    Contains { field: String, needle: String },

    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ne(field.into(), value.into())
    }

    /// Reference field equals the given id
    pub fn id_eq(field: impl Into<String>, id: &Uuid) -> Self {
        Filter::Eq(field.into(), id_value(id))
    }

    /// Document identifier equals the given id
    pub fn by_id(id: &Uuid) -> Self {
        Self::id_eq("id", id)
    }

    pub fn id_in(field: impl Into<String>, ids: &[Uuid]) -> Self {
        Filter::In(field.into(), ids.iter().map(id_value).collect())
    }

    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Filter::Contains {
            field: field.into(),
            needle: needle.into(),
        }
    }

    /// Conjunction, flattening nested `And`s and dropping `All`
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut parts = Vec::new();
        for filter in filters {
            match filter {
                Filter::All => {}
                Filter::And(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }

        match parts.len() {
            0 => Filter::All,
            1 => parts.remove(0),
            _ => Filter::And(parts),
        }
    }

    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(filters.into_iter().collect())
    }
}

/// A single update operator
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    Set(String, Value),
    Inc(String, i64),

    /// Append to an array field unless an equal element is present
    AddToSet(String, Value),

    /// Remove every equal element from an array field
    Pull(String, Value),

    /// Insert at position 0 of an array field
    PushFront(String, Value),
}

/// An ordered list of update operators applied atomically to one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    pub ops: Vec<UpdateOp>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ops.push(UpdateOp::Set(field.into(), value.into()));
        self
    }

    pub fn inc(mut self, field: impl Into<String>, by: i64) -> Self {
        self.ops.push(UpdateOp::Inc(field.into(), by));
        self
    }

    pub fn add_to_set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ops.push(UpdateOp::AddToSet(field.into(), value.into()));
        self
    }

    pub fn pull(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ops.push(UpdateOp::Pull(field.into(), value.into()));
        self
    }

    pub fn push_front(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ops.push(UpdateOp::PushFront(field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Whether any operator writes the given top-level field
    pub fn touches(&self, field: &str) -> bool {
        self.ops.iter().any(|op| match op {
            UpdateOp::Set(f, _)
            | UpdateOp::Inc(f, _)
            | UpdateOp::AddToSet(f, _)
            | UpdateOp::Pull(f, _)
            | UpdateOp::PushFront(f, _) => f == field,
        })
    }
}
