//! Marshal planning - how a locally held value becomes a call parameter.
//!
//! [`plan`] picks a [`MarshalRule`] per field from its kind and schema. The
//! remaining functions evaluate those rules against a [`ResourceState`]. Absent
//! values are left out of the parameter map entirely; a value that fails to decode
//! aborts the whole call so nothing is ever partially submitted.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::descriptor::FieldDescriptor;
use crate::error::MarshalError;
use crate::schema::{PropertySchema, Shape};
use crate::types::{AttrKind, IdWireType};
use crate::value::{AttrValue, ResourceState};

/// How a field is converted into a call parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarshalRule {
    /// Scalars (bool, int, float, string) are sent unchanged.
    SendAsIs,
    /// A local list is sent as a list of strings.
    SendStringList,
    /// Each list element is JSON text decoded into an object.
    SendJsonArrayOfObjects,
    /// The field is JSON text decoded into a single object.
    SendDecodedJsonObject,
}

/// Select the marshal rule for a field.
pub fn plan(kind: AttrKind, schema: &PropertySchema) -> MarshalRule {
    match kind {
        AttrKind::ListOfString if is_array_of_objects(schema) => MarshalRule::SendJsonArrayOfObjects,
        AttrKind::ListOfString => MarshalRule::SendStringList,
        AttrKind::String if is_object_like(schema) => MarshalRule::SendDecodedJsonObject,
        _ => MarshalRule::SendAsIs,
    }
}

/// True when the schema is an object, has an object alternative, or is discriminated.
pub fn is_object_like(schema: &PropertySchema) -> bool {
    match &schema.shape {
        Shape::Object { .. } => true,
        Shape::AnyOf {
            variants,
            discriminated,
        }
        | Shape::OneOf {
            variants,
            discriminated,
        } => *discriminated || variants.iter().any(PropertySchema::is_object),
        Shape::Nullable(inner) => is_object_like(inner),
        _ => false,
    }
}

/// True when the schema (or its array alternative) holds objects.
pub fn is_array_of_objects(schema: &PropertySchema) -> bool {
    match &schema.shape {
        Shape::Array { items } => items.as_ref().map(|i| i.is_object()).unwrap_or(false),
        Shape::AnyOf { variants, .. } => variants
            .iter()
            .find(|v| v.is_array())
            .map(is_array_of_objects)
            .unwrap_or(false),
        Shape::Nullable(inner) => is_array_of_objects(inner),
        _ => false,
    }
}

/// Convert one present value according to a rule.
pub fn marshal_value(
    field: &str,
    kind: AttrKind,
    rule: MarshalRule,
    value: &AttrValue,
) -> Result<Value, MarshalError> {
    match (rule, value) {
        (MarshalRule::SendAsIs, AttrValue::Bool(b)) => Ok(Value::Bool(*b)),
        (MarshalRule::SendAsIs, AttrValue::Int64(n)) => Ok(Value::from(*n)),
        (MarshalRule::SendAsIs, AttrValue::Float64(n)) => Ok(Value::from(*n)),
        (MarshalRule::SendAsIs, AttrValue::String(s)) => Ok(Value::String(s.clone())),
        (MarshalRule::SendStringList, AttrValue::List(items)) => Ok(Value::Array(
            items.iter().cloned().map(Value::String).collect(),
        )),
        (MarshalRule::SendJsonArrayOfObjects, AttrValue::List(items)) => items
            .iter()
            .map(|item| decode_object(field, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        (MarshalRule::SendDecodedJsonObject, AttrValue::String(s)) => decode_object(field, s),
        (_, other) => Err(MarshalError::TypeMismatch {
            field: field.to_string(),
            expected: kind,
            actual: other.type_name(),
        }),
    }
}

/// Build a named parameter map from the fields that carry a marshal rule.
///
/// Fields whose local value is absent are omitted.
pub fn build_params<'a>(
    fields: impl IntoIterator<Item = &'a FieldDescriptor>,
    state: &ResourceState,
) -> Result<Map<String, Value>, MarshalError> {
    let mut params = Map::new();
    for field in fields {
        let Some(rule) = field.marshal else {
            continue;
        };
        let Some(value) = state.get(&field.name) else {
            continue;
        };
        let encoded = marshal_value(&field.name, field.kind, rule, value)?;
        params.insert(field.wire_name.clone(), encoded);
    }
    Ok(params)
}

/// Encode a locally held identifier for the wire.
pub fn identifier_param(id: &str, wire: IdWireType) -> Result<Value, MarshalError> {
    match wire {
        IdWireType::String => Ok(Value::String(id.to_string())),
        IdWireType::Integer => id
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|source| MarshalError::InvalidIdentifier {
                value: id.to_string(),
                source,
            }),
    }
}

/// Encode the delete call's parameter, wrapping it as `[id, {}]` when the delete
/// operation takes an options argument.
pub fn delete_param(id: &str, wire: IdWireType, with_options: bool) -> Result<Value, MarshalError> {
    let id = identifier_param(id, wire)?;
    if with_options {
        Ok(json!([id, {}]))
    } else {
        Ok(id)
    }
}

/// Decode JSON text of any shape.
pub fn decode_json(field: &str, text: &str) -> Result<Value, MarshalError> {
    serde_json::from_str(text).map_err(|source| MarshalError::Decode {
        field: field.to_string(),
        source,
    })
}

fn decode_object(field: &str, text: &str) -> Result<Value, MarshalError> {
    serde_json::from_str::<Map<String, Value>>(text)
        .map(Value::Object)
        .map_err(|source| MarshalError::Decode {
            field: field.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::attr_kind;

    fn plan_json(value: Value) -> MarshalRule {
        let schema = PropertySchema::from_value(&value);
        plan(attr_kind(&schema), &schema)
    }

    // === Rule Selection ===

    #[test]
    fn scalars_send_as_is() {
        assert_eq!(plan_json(json!({ "type": "string" })), MarshalRule::SendAsIs);
        assert_eq!(plan_json(json!({ "type": "integer" })), MarshalRule::SendAsIs);
        assert_eq!(plan_json(json!({ "type": "number" })), MarshalRule::SendAsIs);
        assert_eq!(plan_json(json!({ "type": "boolean" })), MarshalRule::SendAsIs);
    }

    #[test]
    fn primitive_array_is_string_list() {
        assert_eq!(
            plan_json(json!({ "type": "array", "items": { "type": "string" } })),
            MarshalRule::SendStringList
        );
        assert_eq!(plan_json(json!({ "type": "array" })), MarshalRule::SendStringList);
    }

    #[test]
    fn object_array_is_json_array() {
        assert_eq!(
            plan_json(json!({ "type": "array", "items": { "type": "object" } })),
            MarshalRule::SendJsonArrayOfObjects
        );
        assert_eq!(
            plan_json(json!({ "type": "array", "items": [{ "type": "object" }] })),
            MarshalRule::SendJsonArrayOfObjects
        );
    }

    #[test]
    fn object_and_alternatives_decode_json() {
        assert_eq!(plan_json(json!({ "type": "object" })), MarshalRule::SendDecodedJsonObject);
        assert_eq!(
            plan_json(json!({ "anyOf": [{ "type": "object" }, { "type": "null" }] })),
            MarshalRule::SendDecodedJsonObject
        );
        assert_eq!(
            plan_json(json!({ "oneOf": [{ "type": "string" }, { "type": "object" }] })),
            MarshalRule::SendDecodedJsonObject
        );
        assert_eq!(
            plan_json(json!({ "type": "string", "discriminator": "kind" })),
            MarshalRule::SendDecodedJsonObject
        );
    }

    #[test]
    fn any_of_with_integer_stays_scalar() {
        assert_eq!(
            plan_json(json!({ "anyOf": [{ "type": "object" }, { "type": "integer" }] })),
            MarshalRule::SendAsIs
        );
    }

    // === Evaluation ===

    #[test]
    fn string_list_passes_through() {
        let value = AttrValue::from(vec!["a", "b"]);
        let out = marshal_value("tags", AttrKind::ListOfString, MarshalRule::SendStringList, &value)
            .unwrap();
        assert_eq!(out, json!(["a", "b"]));
    }

    #[test]
    fn json_array_decodes_each_element() {
        let value = AttrValue::from(vec![r#"{"x":1}"#]);
        let out = marshal_value(
            "devices",
            AttrKind::ListOfString,
            MarshalRule::SendJsonArrayOfObjects,
            &value,
        )
        .unwrap();
        assert_eq!(out, json!([{ "x": 1 }]));
    }

    #[test]
    fn json_array_decode_failure_names_field() {
        let value = AttrValue::from(vec![r#"{"x":1}"#, "not json"]);
        let err = marshal_value(
            "devices",
            AttrKind::ListOfString,
            MarshalRule::SendJsonArrayOfObjects,
            &value,
        )
        .unwrap_err();
        assert!(matches!(err, MarshalError::Decode { ref field, .. } if field == "devices"));
    }

    #[test]
    fn decoded_object_rejects_non_object_json() {
        let value = AttrValue::from("[1, 2]");
        let err = marshal_value(
            "options",
            AttrKind::String,
            MarshalRule::SendDecodedJsonObject,
            &value,
        )
        .unwrap_err();
        assert!(matches!(err, MarshalError::Decode { .. }));
    }

    #[test]
    fn mismatched_value_is_error() {
        let err = marshal_value("memory", AttrKind::Int64, MarshalRule::SendAsIs, &AttrValue::from(vec!["a"]))
            .unwrap_err();
        assert!(matches!(
            err,
            MarshalError::TypeMismatch { expected: AttrKind::Int64, actual: "list", .. }
        ));
    }

    #[test]
    fn decode_json_accepts_any_shape() {
        assert_eq!(decode_json("paths", r#"["/mnt/a"]"#).unwrap(), json!(["/mnt/a"]));
        assert_eq!(decode_json("n", "3").unwrap(), json!(3));
        assert!(decode_json("n", "{").is_err());
    }

    // === Identifier ===

    #[test]
    fn identifier_string_and_integer() {
        assert_eq!(identifier_param("tank/data", IdWireType::String).unwrap(), json!("tank/data"));
        assert_eq!(identifier_param("42", IdWireType::Integer).unwrap(), json!(42));
        assert!(matches!(
            identifier_param("abc", IdWireType::Integer),
            Err(MarshalError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn delete_param_with_options() {
        assert_eq!(delete_param("7", IdWireType::Integer, true).unwrap(), json!([7, {}]));
        assert_eq!(delete_param("7", IdWireType::Integer, false).unwrap(), json!(7));
        assert_eq!(delete_param("app1", IdWireType::String, true).unwrap(), json!(["app1", {}]));
    }
}
