//! Locally held resource state.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::AttrKind;

/// A single locally held attribute value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Absent or unset.
    #[default]
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    List(Vec<String>),
}

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// Name used in mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Null => "null",
            AttrValue::Bool(_) => "boolean",
            AttrValue::Int64(_) => "integer",
            AttrValue::Float64(_) => "number",
            AttrValue::String(_) => "string",
            AttrValue::List(_) => "list",
        }
    }

    /// Whether this value can be held by a field of `kind`.
    pub fn fits(&self, kind: AttrKind) -> bool {
        matches!(
            (self, kind),
            (AttrValue::Null, _)
                | (AttrValue::Bool(_), AttrKind::Bool)
                | (AttrValue::Int64(_), AttrKind::Int64)
                | (AttrValue::Float64(_), AttrKind::Float64)
                | (AttrValue::String(_), AttrKind::String)
                | (AttrValue::List(_), AttrKind::ListOfString)
        )
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int64(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float64(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::String(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::String(v)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(v: Vec<String>) -> Self {
        AttrValue::List(v)
    }
}

impl From<Vec<&str>> for AttrValue {
    fn from(v: Vec<&str>) -> Self {
        AttrValue::List(v.into_iter().map(String::from).collect())
    }
}

/// Locally held state of one resource, keyed by canonical field name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceState {
    values: IndexMap<String, AttrValue>,
}

impl ResourceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// The value of a field, or `None` when absent or null.
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
