//! Aggregation pipeline vocabulary
//!
//! A [`Pipeline`] is an ordered list of [`Stage`]s evaluated over one
//! collection. The stage set is the subset of MongoDB's aggregation
//! framework that the read models need; [`InMemoryStore`] evaluates the same
//! stages with the same semantics.
//!
//! [`InMemoryStore`]: crate::storage::InMemoryStore

use super::filter::Filter;
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse `asc` / `desc` (case-insensitive)
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Primary key followed by `id` in the same direction
    ///
    /// Ids are time-ordered, so documents with equal primary keys come out in
    /// insertion order (newest first when descending).
    pub fn with_tie_break(field: impl Into<String>, direction: SortDirection) -> Vec<SortKey> {
        let field = field.into();
        let mut keys = vec![SortKey {
            field: field.clone(),
            direction,
        }];
        if field != "id" {
            keys.push(SortKey {
                field: "id".to_string(),
                direction,
            });
        }
        keys
    }
}

/// One output field of a projection
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectField {
    /// Copy the field of the same name
    Include,

    /// Copy the value found at a (dotted) path of the input document
    Path(String),

    /// Build an embedded document
    Nested(Projection),
}

/// Whitelist of output fields, in output order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub fields: IndexMap<String, ProjectField>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into(), ProjectField::Include);
        self
    }

    /// Include several fields at once
    pub fn include_all(mut self, fields: &[&str]) -> Self {
        for field in fields {
            self.fields.insert(field.to_string(), ProjectField::Include);
        }
        self
    }

    pub fn path(mut self, output: impl Into<String>, path: impl Into<String>) -> Self {
        self.fields
            .insert(output.into(), ProjectField::Path(path.into()));
        self
    }

    pub fn nested(mut self, output: impl Into<String>, projection: Projection) -> Self {
        self.fields
            .insert(output.into(), ProjectField::Nested(projection));
        self
    }
}

/// Accumulator of a [`Stage::Group`]
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    /// Number of input documents
    Count,

    /// Sum of a numeric field; missing and non-numeric values count as 0
    Sum(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Filter),

    /// Left outer join: `as_field` receives the array of documents of `from`
    /// whose `foreign_field` equals this document's `local_field`
    Lookup {
        from: String,
        local_field: String,
        foreign_field: String,
        as_field: String,
    },

    /// Replace an array field by each of its elements; documents whose array
    /// is empty or missing are dropped
    Unwind(String),

    Sort(Vec<SortKey>),
    Project(Projection),

    /// Collapse every input document into a single row; no input, no row
    Group(IndexMap<String, Accumulator>),

    Skip(u64),
    Limit(u64),

    /// Emit `{ <name>: n }`, or nothing when n is 0
    Count(String),
}

/// An ordered list of stages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn matching(self, filter: Filter) -> Self {
        self.stage(Stage::Match(filter))
    }

    /// Join a single related document and flatten it in place
    ///
    /// Rows whose related document no longer exists are dropped.
    pub fn join_one(
        self,
        from: impl Into<String>,
        local_field: impl Into<String>,
        as_field: impl Into<String>,
    ) -> Self {
        let as_field = as_field.into();
        self.stage(Stage::Lookup {
            from: from.into(),
            local_field: local_field.into(),
            foreign_field: "id".to_string(),
            as_field: as_field.clone(),
        })
        .stage(Stage::Unwind(as_field))
    }

    pub fn sort(self, keys: Vec<SortKey>) -> Self {
        self.stage(Stage::Sort(keys))
    }

    pub fn project(self, projection: Projection) -> Self {
        self.stage(Stage::Project(projection))
    }

    pub fn group(self, accumulators: IndexMap<String, Accumulator>) -> Self {
        self.stage(Stage::Group(accumulators))
    }

    pub fn skip(self, n: u64) -> Self {
        self.stage(Stage::Skip(n))
    }

    pub fn limit(self, n: u64) -> Self {
        self.stage(Stage::Limit(n))
    }

    pub fn count(self, name: impl Into<String>) -> Self {
        self.stage(Stage::Count(name.into()))
    }

    /// The same pipeline with a trailing count stage
    pub fn counted(&self, name: &str) -> Self {
        self.clone().count(name)
    }

    /// The same pipeline restricted to one page
    pub fn paged(&self, skip: u64, limit: u64) -> Self {
        self.clone().skip(skip).limit(limit)
    }
}
