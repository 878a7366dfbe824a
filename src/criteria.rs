//! Query criteria.
//!
//! A criteria object narrows or reshapes a query before it reaches storage.
//! [`AnyCriteria`] is the neutral element: it returns its input unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Transforms a query of type `Q`.
pub trait Criteria<Q> {
    fn apply(&self, query: Q) -> Q;
}

/// Criteria that matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnyCriteria;

impl<Q> Criteria<Q> for AnyCriteria {
    fn apply(&self, query: Q) -> Q {
        query
    }
}

/// A minimal filterable query: equality filters plus paging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryRequest {
    pub filters: BTreeMap<String, Value>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl QueryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.insert(field.to_string(), value.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a record satisfies every filter.
    pub fn matches(&self, record: &serde_json::Map<String, Value>) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| record.get(field) == Some(expected))
    }
}

/// Adds one equality filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCriteria {
    field: String,
    value: Value,
}

impl FieldCriteria {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl Criteria<QueryRequest> for FieldCriteria {
    fn apply(&self, query: QueryRequest) -> QueryRequest {
        query.filter(&self.field, self.value.clone())
    }
}
