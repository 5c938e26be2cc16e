//! Namespaced vector storage.
//!
//! Every operation is scoped to a [`Namespace`]; implementations must never
//! return entries written under another namespace.

mod memory;
mod qdrant;

pub use memory::InMemoryVectorIndex;
pub use qdrant::QdrantVectorIndex;

use std::cmp::Ordering;
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::error::RagResult;

/// Payload stored next to each vector
pub type Metadata = serde_json::Map<String, Value>;

/// Per-user partition key inside the shared index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    pub fn for_user(user_id: Uuid) -> Self {
        Self(format!("user-{user_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl FilterValue {
    /// Array fields match when any element matches
    fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Array(items)) => items.iter().any(|item| self.matches(item)),
            (FilterValue::Str(expected), Value::String(actual)) => expected == actual,
            (FilterValue::Int(expected), Value::Number(actual)) => actual.as_i64() == Some(*expected),
            (FilterValue::Bool(expected), Value::Bool(actual)) => expected == actual,
            _ => false,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Str(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Str(value)
    }
}

impl From<Uuid> for FilterValue {
    fn from(value: Uuid) -> Self {
        FilterValue::Str(value.to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

/// Conjunction of equality constraints on metadata fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFilter {
    conditions: Vec<(String, FilterValue)>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[(String, FilterValue)] {
        &self.conditions
    }

    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.conditions.iter().all(|(field, expected)| {
            metadata
                .get(field)
                .is_some_and(|actual| expected.matches(actual))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub id: Uuid,
    pub score: f32,
    pub metadata: Metadata,
}

/// Descending score, ties by ascending id
pub fn rank_matches(matches: &mut [VectorMatch]) {
    matches.sort_by(|a, b| match b.score.total_cmp(&a.score) {
        Ordering::Equal => a.id.cmp(&b.id),
        other => other,
    });
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace the vector stored under `id`
    async fn upsert(
        &self,
        namespace: &Namespace,
        id: Uuid,
        vector: Vec<f32>,
        metadata: Metadata,
    ) -> RagResult<()>;

    /// At most `top_k` matches from `namespace` that satisfy `filter`, ranked by [`rank_matches`]
    async fn query(
        &self,
        namespace: &Namespace,
        vector: Vec<f32>,
        top_k: usize,
        filter: &MetadataFilter,
    ) -> RagResult<Vec<VectorMatch>>;

    /// Up to `limit` entries from `namespace` that satisfy `filter`, by ascending id,
    /// with a zero score. Used when similarity search is unavailable.
    async fn scan(
        &self,
        namespace: &Namespace,
        filter: &MetadataFilter,
        limit: usize,
    ) -> RagResult<Vec<VectorMatch>>;

    /// Missing ids are ignored
    async fn delete(&self, namespace: &Namespace, ids: &[Uuid]) -> RagResult<()>;

    async fn health(&self) -> RagResult<()>;
}
