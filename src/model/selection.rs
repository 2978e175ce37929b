use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A brush or click constraint keyed by column name. Values stay as the
/// chart reported them; whether an entry is a range or a set is decided
/// against the table it filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeMap<String, Vec<Value>>);

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Values of one column's constraint.
    pub fn get(&self, column: &str) -> Option<&[Value]> {
        self.0.get(column).map(Vec::as_slice)
    }
}

#[cfg(test)]
impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, column: impl Into<String>, lo: f64, hi: f64) -> Self {
        self.0
            .insert(column.into(), vec![Value::from(lo), Value::from(hi)]);
        self
    }

    pub fn with_members<I, S>(mut self, column: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.insert(
            column.into(),
            members
                .into_iter()
                .map(|m| Value::String(m.into()))
                .collect(),
        );
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, values: Vec<Value>) {
        self.0.insert(column.into(), values);
    }
}
