//! Metadata filtering for vector search
//!
//! A filter is a conjunction of conditions on top-level metadata fields.
//! An empty filter matches everything.

use super::Metadata;
use serde_json::Value;
use std::collections::BTreeSet;

/// A single condition on a top-level metadata field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value exactly
    Eq { field: String, value: Value },
    /// Field is a string contained in the set
    In {
        field: String,
        values: BTreeSet<String>,
    },
}

impl Condition {
    fn matches(&self, metadata: &Metadata) -> bool {
        match self {
            Condition::Eq { field, value } => metadata.get(field) == Some(value),
            Condition::In { field, values } => metadata
                .get(field)
                .and_then(Value::as_str)
                .map_or(false, |s| values.contains(s)),
        }
    }
}

/// Restriction predicate applied before ranking
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataFilter {
    conditions: Vec<Condition>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn field_in<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions.push(Condition::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.conditions.iter().all(|c| c.matches(metadata))
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }
}
