//! Type mapping - collapses a schema node into one attribute kind.

use crate::schema::{PrimitiveKind, PropertySchema, Shape};
use crate::types::AttrKind;

/// Classify a schema node.
///
/// Total and pure: malformed or unrecognised schemas map to [`AttrKind::String`].
///
/// - `anyOf` takes the first alternative that is integer, boolean or array.
/// - `oneOf` / discriminated schemas are carried as encoded text.
/// - Objects are carried as encoded text; arrays become lists of strings.
pub fn attr_kind(schema: &PropertySchema) -> AttrKind {
    match &schema.shape {
        Shape::AnyOf { variants, .. } => variants
            .iter()
            .find_map(|variant| match &variant.shape {
                Shape::Primitive(PrimitiveKind::Integer)
                | Shape::Enumerated {
                    kind: Some(PrimitiveKind::Integer),
                    ..
                } => Some(AttrKind::Int64),
                Shape::Primitive(PrimitiveKind::Boolean)
                | Shape::Enumerated {
                    kind: Some(PrimitiveKind::Boolean),
                    ..
                } => Some(AttrKind::Bool),
                Shape::Array { .. } => Some(AttrKind::ListOfString),
                _ => None,
            })
            .unwrap_or(AttrKind::String),
        Shape::OneOf { .. } => AttrKind::String,
        Shape::Primitive(kind) => primitive_kind(*kind),
        Shape::Enumerated {
            kind: Some(kind), ..
        } => primitive_kind(*kind),
        Shape::Array { .. } => AttrKind::ListOfString,
        Shape::Nullable(inner) => attr_kind(inner),
        Shape::Enumerated { kind: None, .. } | Shape::Object { .. } | Shape::Null | Shape::Any => {
            AttrKind::String
        }
    }
}

fn primitive_kind(kind: PrimitiveKind) -> AttrKind {
    match kind {
        PrimitiveKind::String => AttrKind::String,
        PrimitiveKind::Integer => AttrKind::Int64,
        PrimitiveKind::Number => AttrKind::Float64,
        PrimitiveKind::Boolean => AttrKind::Bool,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn kind(value: Value) -> AttrKind {
        attr_kind(&PropertySchema::from_value(&value))
    }

    #[test]
    fn primitives() {
        assert_eq!(kind(json!({ "type": "string" })), AttrKind::String);
        assert_eq!(kind(json!({ "type": "integer" })), AttrKind::Int64);
        assert_eq!(kind(json!({ "type": "number" })), AttrKind::Float64);
        assert_eq!(kind(json!({ "type": "boolean" })), AttrKind::Bool);
    }

    #[test]
    fn array_and_object() {
        assert_eq!(
            kind(json!({ "type": "array", "items": { "type": "integer" } })),
            AttrKind::ListOfString
        );
        assert_eq!(
            kind(json!({ "type": "object", "properties": { "a": { "type": "integer" } } })),
            AttrKind::String
        );
    }

    #[test]
    fn any_of_first_satisfiable_alternative() {
        assert_eq!(
            kind(json!({ "anyOf": [{ "type": "string" }, { "type": "integer" }, { "type": "boolean" }] })),
            AttrKind::Int64
        );
        assert_eq!(
            kind(json!({ "anyOf": [{ "type": "null" }, { "type": "boolean" }] })),
            AttrKind::Bool
        );
        assert_eq!(
            kind(json!({ "anyOf": [{ "type": "array" }, { "type": "null" }] })),
            AttrKind::ListOfString
        );
    }

    #[test]
    fn any_of_typed_enum_alternative() {
        assert_eq!(
            kind(json!({ "anyOf": [{ "type": "integer", "enum": [512, 1024] }, { "type": "null" }] })),
            AttrKind::Int64
        );
        assert_eq!(
            kind(json!({ "anyOf": [{ "type": "string", "enum": ["a"] }, { "type": "boolean", "const": true }] })),
            AttrKind::Bool
        );
        // untyped enums carry no kind
        assert_eq!(
            kind(json!({ "anyOf": [{ "enum": [1, 2] }, { "type": "null" }] })),
            AttrKind::String
        );
    }

    #[test]
    fn any_of_without_match_falls_back_to_string() {
        assert_eq!(
            kind(json!({ "anyOf": [{ "type": "number" }, { "type": "null" }] })),
            AttrKind::String
        );
        assert_eq!(kind(json!({ "anyOf": [] })), AttrKind::String);
    }

    #[test]
    fn one_of_and_discriminator_are_text() {
        assert_eq!(
            kind(json!({ "oneOf": [{ "type": "integer" }, { "type": "null" }] })),
            AttrKind::String
        );
        assert_eq!(
            kind(json!({ "type": "integer", "discriminator": { "propertyName": "x" } })),
            AttrKind::String
        );
    }

    #[test]
    fn enum_uses_declared_type() {
        assert_eq!(kind(json!({ "type": "integer", "enum": [1, 2] })), AttrKind::Int64);
        assert_eq!(kind(json!({ "enum": ["A", "B"] })), AttrKind::String);
    }

    #[test]
    fn nullable_uses_inner_type() {
        assert_eq!(kind(json!({ "type": ["boolean", "null"] })), AttrKind::Bool);
    }

    #[test]
    fn malformed_defaults_to_string() {
        assert_eq!(kind(json!(null)), AttrKind::String);
        assert_eq!(kind(json!("integer")), AttrKind::String);
        assert_eq!(kind(json!({})), AttrKind::String);
        assert_eq!(kind(json!({ "type": "null" })), AttrKind::String);
    }

    #[test]
    fn list_of_one_resolves_first() {
        assert_eq!(kind(json!([{ "type": "integer" }])), AttrKind::Int64);
    }
}
