//! Reconciliation planning - whether and how a response value overwrites local state.
//!
//! Singular resources trust local state for create-only fields and for optional
//! mutable fields; only required mutable fields, `name` and `type` are read back.
//! Listings and data sources read every field. The identifier is read back from the
//! response `id` member whenever present.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::descriptor::FieldDescriptor;
use crate::error::ReconcileError;
use crate::types::{json_type_name, AttrKind, Mutability, ID_FIELD, STABLE_IDENTIFIER_FIELDS};
use crate::value::{AttrValue, ResourceState};

/// Whether a resource is a single instance or a multi-row listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceMode {
    Instance,
    Listing,
}

/// Read-back policy of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "policy", content = "decoder")]
pub enum ReadBack {
    /// Keep the locally held value.
    Keep,
    /// Overwrite from the same-named response member.
    Overwrite(Decoder),
    /// Overwrite from the response `id` member, as text.
    Identifier,
}

/// Per-kind decoding of a response value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoder {
    /// Only a literal boolean.
    Bool,
    /// A raw number, or an object carrying a numeric `parsed` member.
    Int,
    /// A raw number.
    Float,
    /// Any array, each element stringified.
    StringList,
    /// A raw string, an object carrying a `value` member, or any value stringified.
    Text,
}

impl Decoder {
    pub fn for_kind(kind: AttrKind) -> Self {
        match kind {
            AttrKind::Bool => Decoder::Bool,
            AttrKind::Int64 => Decoder::Int,
            AttrKind::Float64 => Decoder::Float,
            AttrKind::ListOfString => Decoder::StringList,
            AttrKind::String => Decoder::Text,
        }
    }

    /// Decode a non-null response value; `None` leaves local state untouched.
    pub fn decode(&self, value: &Value) -> Option<AttrValue> {
        match (self, value) {
            (Decoder::Bool, Value::Bool(b)) => Some(AttrValue::Bool(*b)),
            (Decoder::Int, Value::Number(_)) => number_as_i64(value).map(AttrValue::Int64),
            (Decoder::Int, Value::Object(map)) => map
                .get("parsed")
                .and_then(number_as_i64)
                .map(AttrValue::Int64),
            (Decoder::Float, Value::Number(n)) => n.as_f64().map(AttrValue::Float64),
            (Decoder::StringList, Value::Array(items)) => {
                Some(AttrValue::List(items.iter().map(stringify).collect()))
            }
            (Decoder::Text, Value::String(s)) => Some(AttrValue::String(s.clone())),
            (Decoder::Text, Value::Object(map)) => match map.get("value") {
                Some(inner) if !inner.is_null() => Some(AttrValue::String(stringify(inner))),
                _ => None,
            },
            (Decoder::Text, other) => Some(AttrValue::String(stringify(other))),
            _ => None,
        }
    }
}

/// Select the read-back policy for a field, keyed by its payload property name.
pub fn plan(
    wire_name: &str,
    kind: AttrKind,
    mutability: Mutability,
    required: bool,
    mode: ResourceMode,
) -> ReadBack {
    if mutability == Mutability::Identifier {
        return ReadBack::Identifier;
    }
    let read = match mode {
        ResourceMode::Listing => true,
        ResourceMode::Instance if STABLE_IDENTIFIER_FIELDS.contains(&wire_name) => true,
        ResourceMode::Instance => match mutability {
            Mutability::Mutable => required,
            _ => false,
        },
    };
    if read {
        ReadBack::Overwrite(Decoder::for_kind(kind))
    } else {
        ReadBack::Keep
    }
}

/// Merge a read response into local state following each field's policy.
///
/// A response that is not a key/value map is an error and leaves state untouched.
pub fn apply(
    fields: &[FieldDescriptor],
    response: &Value,
    state: &mut ResourceState,
) -> Result<(), ReconcileError> {
    let map = as_object(response)?;
    for field in fields {
        match field.read_back {
            ReadBack::Keep => {}
            ReadBack::Identifier => {
                if let Some(v) = present(map, ID_FIELD) {
                    state.set(field.name.clone(), AttrValue::String(stringify(v)));
                }
            }
            ReadBack::Overwrite(decoder) => {
                if let Some(decoded) = present(map, &field.wire_name).and_then(|v| decoder.decode(v)) {
                    state.set(field.name.clone(), decoded);
                }
            }
        }
    }
    Ok(())
}

/// Decode every row of a listing response.
pub fn apply_rows(
    fields: &[FieldDescriptor],
    response: &Value,
) -> Result<Vec<ResourceState>, ReconcileError> {
    let rows = response.as_array().ok_or(ReconcileError::NotAnArray {
        actual: json_type_name(response),
    })?;
    rows.iter()
        .map(|row| {
            let mut state = ResourceState::new();
            apply(fields, row, &mut state)?;
            Ok(state)
        })
        .collect()
}

/// Generic string conversion of a response value.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_object(response: &Value) -> Result<&Map<String, Value>, ReconcileError> {
    response.as_object().ok_or(ReconcileError::NotAnObject {
        actual: json_type_name(response),
    })
}

fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn number_as_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}
