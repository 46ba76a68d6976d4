//! Immutable descriptors handed to the template renderer.
//!
//! A [`ResourceDescriptor`] bundles the ordered field list with everything the
//! renderer needs to emit create/read/update/delete code: marshal and read-back
//! rules per field, job flags, identifier encoding and lifecycle hooks. The
//! descriptors also evaluate their own rules against a [`ResourceState`], which is
//! what the generated code does at runtime.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::{MarshalError, ReconcileError};
use crate::marshal::{self, MarshalRule};
use crate::reconcile::{self, ReadBack};
use crate::types::{AttrKind, IdWireType, Mutability, ID_FIELD, START_ON_CREATE_FIELD};
use crate::value::{AttrValue, ResourceState};

/// One generated attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// Canonical local name.
    pub name: String,
    /// Property name in request and response payloads.
    pub wire_name: String,
    pub kind: AttrKind,
    pub required: bool,
    pub mutability: Mutability,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Optional and assigned by the remote side when omitted.
    pub auto_generated: bool,
    /// `None` for fields that never appear in a request body.
    pub marshal: Option<MarshalRule>,
    pub read_back: ReadBack,
}

impl FieldDescriptor {
    /// The identifier field, always first in a descriptor.
    pub fn identifier(description: impl Into<String>) -> Self {
        Self {
            name: ID_FIELD.to_string(),
            wire_name: ID_FIELD.to_string(),
            kind: AttrKind::String,
            required: false,
            mutability: Mutability::Identifier,
            description: description.into(),
            default: None,
            auto_generated: true,
            marshal: None,
            read_back: ReadBack::Identifier,
        }
    }

    /// Synthetic boolean controlling the post-create start call.
    pub fn start_trigger() -> Self {
        Self {
            name: START_ON_CREATE_FIELD.to_string(),
            wire_name: START_ON_CREATE_FIELD.to_string(),
            kind: AttrKind::Bool,
            required: false,
            mutability: Mutability::Mutable,
            description: "Start the resource immediately after creation (default: true)".into(),
            default: Some(Value::Bool(true)),
            auto_generated: false,
            marshal: None,
            read_back: ReadBack::Keep,
        }
    }

    pub fn is_identifier(&self) -> bool {
        self.mutability == Mutability::Identifier
    }

    pub fn is_start_trigger(&self) -> bool {
        self.name == START_ON_CREATE_FIELD && self.marshal.is_none()
    }
}

/// Which CRUD calls are long-running jobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobFlags {
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

/// Stop call issued before delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopStep {
    pub method: String,
    /// Seconds to wait after the stop call returns.
    pub wait_secs: u64,
}

/// Lifecycle hooks around create and delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Lifecycle {
    /// Start method called after create when the trigger field is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopStep>,
}

/// Remote method names backing a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceMethods {
    pub create: String,
    pub update: Option<String>,
    pub delete: Option<String>,
    pub get_instance: String,
}

/// One generated resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDescriptor {
    /// Canonical resource name.
    pub name: String,
    /// Dotted base of the remote method names.
    pub method_base: String,
    pub description: String,
    /// Identifier first, then the optional trigger, then resolved fields.
    pub fields: Vec<FieldDescriptor>,
    /// Canonical names of the fields the update call carries.
    pub update_fields: Vec<String>,
    pub jobs: JobFlags,
    pub id_wire_type: IdWireType,
    pub delete_needs_options: bool,
    pub lifecycle: Lifecycle,
    pub methods: ResourceMethods,
    /// Number of request-schema variants merged into the field set.
    pub variants: usize,
}

impl ResourceDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn identifier(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.is_identifier())
    }

    /// True when a start call follows create.
    pub fn has_start(&self) -> bool {
        self.lifecycle.start.is_some()
    }

    /// Names of fields whose change forces replacement.
    pub fn create_only_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.mutability == Mutability::CreateOnly)
            .map(|f| f.name.as_str())
    }

    /// Parameter object of the create call.
    pub fn create_params(&self, state: &ResourceState) -> Result<Map<String, Value>, MarshalError> {
        marshal::build_params(&self.fields, state)
    }

    /// Parameters of the update call: `[id, {update fields}]`.
    pub fn update_params(&self, state: &ResourceState) -> Result<Value, MarshalError> {
        let id = self.identifier_param(state)?;
        let fields = self
            .fields
            .iter()
            .filter(|f| self.update_fields.contains(&f.name));
        let data = marshal::build_params(fields, state)?;
        Ok(json!([id, data]))
    }

    /// The identifier as encoded for get_instance, start and stop calls.
    pub fn identifier_param(&self, state: &ResourceState) -> Result<Value, MarshalError> {
        marshal::identifier_param(&local_identifier(state)?, self.id_wire_type)
    }

    /// Parameter of the delete call.
    pub fn delete_param(&self, state: &ResourceState) -> Result<Value, MarshalError> {
        marshal::delete_param(
            &local_identifier(state)?,
            self.id_wire_type,
            self.delete_needs_options,
        )
    }

    /// Merge a get_instance (or create/update) response into local state.
    pub fn reconcile(
        &self,
        response: &Value,
        state: &mut ResourceState,
    ) -> Result<(), ReconcileError> {
        reconcile::apply(&self.fields, response, state)
    }
}

/// Read-only lookup of one instance via `{base}.get_instance`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSourceDescriptor {
    pub name: String,
    pub method: String,
    pub description: String,
    pub id_wire_type: IdWireType,
    pub fields: Vec<FieldDescriptor>,
}

impl DataSourceDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn identifier_param(&self, state: &ResourceState) -> Result<Value, MarshalError> {
        marshal::identifier_param(&local_identifier(state)?, self.id_wire_type)
    }

    pub fn reconcile(&self, response: &Value) -> Result<ResourceState, ReconcileError> {
        let mut state = ResourceState::new();
        reconcile::apply(&self.fields, response, &mut state)?;
        Ok(state)
    }
}

/// Multi-row listing via `{base}.query`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingDescriptor {
    pub name: String,
    pub method: String,
    pub description: String,
    /// Per-row fields.
    pub fields: Vec<FieldDescriptor>,
}

impl ListingDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn reconcile_rows(&self, response: &Value) -> Result<Vec<ResourceState>, ReconcileError> {
        reconcile::apply_rows(&self.fields, response)
    }
}

/// How an action parameter is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamEncoding {
    Scalar,
    /// List and object parameters, held locally as JSON text and decoded before dispatch.
    Json,
}

/// One positional parameter of an action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionParameter {
    pub name: String,
    pub wire_name: String,
    pub kind: AttrKind,
    pub required: bool,
    pub description: String,
    pub encoding: ParamEncoding,
}

/// A non-CRUD operation exposed as a one-shot action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDescriptor {
    pub name: String,
    pub method: String,
    pub description: String,
    pub job: bool,
    pub parameters: Vec<ActionParameter>,
}

impl ActionDescriptor {
    /// Positional call parameters.
    ///
    /// An absent parameter followed by a present one is sent as `null`; trailing
    /// absent parameters are dropped.
    pub fn params(&self, state: &ResourceState) -> Result<Vec<Value>, MarshalError> {
        let mut params = Vec::with_capacity(self.parameters.len());
        let mut pending_nulls = 0;
        for param in &self.parameters {
            let Some(value) = state.get(&param.name) else {
                pending_nulls += 1;
                continue;
            };
            params.extend(std::iter::repeat(Value::Null).take(pending_nulls));
            pending_nulls = 0;
            params.push(encode_action_param(param, value)?);
        }
        Ok(params)
    }
}

fn encode_action_param(param: &ActionParameter, value: &AttrValue) -> Result<Value, MarshalError> {
    match (param.encoding, value) {
        (ParamEncoding::Json, AttrValue::String(text)) => marshal::decode_json(&param.name, text),
        (ParamEncoding::Json, other) => Err(MarshalError::TypeMismatch {
            field: param.name.clone(),
            expected: AttrKind::String,
            actual: other.type_name(),
        }),
        (ParamEncoding::Scalar, _) => {
            marshal::marshal_value(&param.name, param.kind, MarshalRule::SendAsIs, value)
        }
    }
}

fn local_identifier(state: &ResourceState) -> Result<String, MarshalError> {
    match state.get(ID_FIELD) {
        Some(AttrValue::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(AttrValue::Int64(n)) => Ok(n.to_string()),
        _ => Err(MarshalError::MissingIdentifier),
    }
}

/// Why a resource group produced no descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Listed in the configuration's exclusion set.
    Excluded,
    /// Neither create nor update carries a request schema.
    NoSchema,
    /// The request schema resolved to zero properties.
    EmptyProperties,
    /// An action with no named parameters.
    NoParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedGroup {
    pub name: String,
    pub reason: SkipReason,
}

/// Side channel reporting what the catalogue held but generation did not cover.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Method names not consumed by any emitted descriptor, in catalogue order.
    pub unconsumed: Vec<String>,
    pub skipped: Vec<SkippedGroup>,
}

/// Everything inferred from one catalogue.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub resources: Vec<ResourceDescriptor>,
    pub data_sources: Vec<DataSourceDescriptor>,
    pub listings: Vec<ListingDescriptor>,
    pub actions: Vec<ActionDescriptor>,
    pub diagnostics: Diagnostics,
}

impl GenerationPlan {
    pub fn resource(&self, name: &str) -> Option<&ResourceDescriptor> {
        self.resources
            .iter()
            .find(|r| r.name == name || r.method_base == name)
    }

    pub fn action(&self, name: &str) -> Option<&ActionDescriptor> {
        self.actions.iter().find(|a| a.name == name || a.method == name)
    }
}
