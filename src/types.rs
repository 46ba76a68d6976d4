//! Core types shared by the inference passes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the identifier property in request and response payloads.
pub const ID_FIELD: &str = "id";

/// Name of the synthetic lifecycle trigger field.
pub const START_ON_CREATE_FIELD: &str = "start_on_create";

/// Field names that are always read back, even when create-only or optional.
pub const STABLE_IDENTIFIER_FIELDS: &[&str] = &["name", "type"];

/// Field name that may be renamed through update even when the update schema omits it.
pub const RENAMEABLE_FIELD: &str = "name";

/// Method verbs that belong to a resource group rather than to an action.
pub const CRUD_VERBS: &[&str] = &["create", "update", "delete", "query", "get_instance"];

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Attribute kind of a generated field.
///
/// Every schema fragment collapses to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttrKind {
    String,
    Int64,
    Float64,
    Bool,
    ListOfString,
}

impl AttrKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttrKind::String => "String",
            AttrKind::Int64 => "Int64",
            AttrKind::Float64 => "Float64",
            AttrKind::Bool => "Bool",
            AttrKind::ListOfString => "ListOfString",
        }
    }
}

impl std::fmt::Display for AttrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutability class of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutability {
    /// Can be changed in place through the update call.
    Mutable,
    /// Only settable at creation; a change forces replacement.
    CreateOnly,
    /// The resource identifier, assigned by the remote side.
    Identifier,
    /// Observed only; fields of data sources and listings.
    ReadOnly,
}

/// Wire type of the resource identifier in call parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdWireType {
    #[default]
    String,
    Integer,
}

/// Verb half of a `{resource}.{verb}` method name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Verb {
    Create,
    Update,
    Delete,
    GetInstance,
    Query,
    Start,
    Stop,
    Action(String),
}

impl Verb {
    pub fn parse(s: &str) -> Self {
        match s {
            "create" => Verb::Create,
            "update" => Verb::Update,
            "delete" => Verb::Delete,
            "get_instance" => Verb::GetInstance,
            "query" => Verb::Query,
            "start" => Verb::Start,
            "stop" => Verb::Stop,
            other => Verb::Action(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Delete => "delete",
            Verb::GetInstance => "get_instance",
            Verb::Query => "query",
            Verb::Start => "start",
            Verb::Stop => "stop",
            Verb::Action(s) => s,
        }
    }

    /// True for verbs that are consumed by resource, data source or listing generation.
    pub fn is_crud(&self) -> bool {
        CRUD_VERBS.contains(&self.as_str())
    }
}

/// Split a dotted method name into its resource base and verb.
///
/// Returns `None` when the name has no dot.
pub fn split_method_name(name: &str) -> Option<(&str, Verb)> {
    let (base, verb) = name.rsplit_once('.')?;
    if base.is_empty() || verb.is_empty() {
        return None;
    }
    Some((base, Verb::parse(verb)))
}

/// Build `{base}.{verb}`.
pub fn method_name(base: &str, verb: &Verb) -> String {
    format!("{}.{}", base, verb.as_str())
}
