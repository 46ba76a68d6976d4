//! RPC Resource Schema
//!
//! Infers infrastructure resource descriptors from a catalogue of remote-API
//! method signatures.
//!
//! A catalogue maps dotted method names (`pool.dataset.create`, `vm.update`, ...)
//! to request and response schemas. Methods sharing a base name form a resource
//! group; this library turns each group into a [`ResourceDescriptor`] carrying
//! the ordered field list, per-field mutability, marshal rules and read-back
//! rules a code generator needs. Query and get_instance methods become listings
//! and data sources, remaining job or lifecycle methods become actions, and
//! anything left over is reported as unconsumed.
//!
//! # Example
//!
//! ```
//! use rpc_resource_schema::{assemble, load_catalogue_str, AssemblerConfig, Mutability};
//!
//! let catalogue = load_catalogue_str(r#"{
//!     "methods": {
//!         "share.create": {
//!             "accepts": [{
//!                 "type": "object",
//!                 "required": ["path"],
//!                 "properties": {
//!                     "path": { "type": "string" },
//!                     "comment": { "type": "string" }
//!                 }
//!             }]
//!         },
//!         "share.update": {
//!             "accepts": [
//!                 { "type": "integer" },
//!                 { "type": "object", "properties": { "comment": { "type": "string" } } }
//!             ]
//!         }
//!     }
//! }"#).unwrap();
//!
//! let plan = assemble(&catalogue, &AssemblerConfig::default());
//! let share = plan.resource("share").unwrap();
//!
//! // The identifier always comes first
//! assert_eq!(share.fields[0].name, "id");
//! // Update cannot change the path, so it forces replacement
//! assert_eq!(share.field("path").unwrap().mutability, Mutability::CreateOnly);
//! assert_eq!(share.field("comment").unwrap().mutability, Mutability::Mutable);
//! ```
//!
//! # Read-back Rules
//!
//! | Field | Singular resource | Listing / data source |
//! |-------|-------------------|-----------------------|
//! | identifier | from response `id`, as text | from response `id`, as text |
//! | `name`, `type` | overwrite | overwrite |
//! | create-only | keep local value | overwrite |
//! | mutable, required | overwrite | overwrite |
//! | mutable, optional | keep local value | overwrite |

mod assembler;
mod config;
mod descriptor;
mod error;
mod loader;
mod mapper;
mod marshal;
mod mutability;
mod naming;
mod reconcile;
mod resolver;
mod schema;
mod types;
mod validator;
mod value;

pub use assembler::{
    assemble, assemble_action, assemble_data_source, assemble_listing, assemble_resource,
    resource_id_wire_type,
};
pub use config::{AssemblerConfig, DEFAULT_ACTION_KEYWORDS, DEFAULT_RESERVED_NAMES};
pub use descriptor::{
    ActionDescriptor, ActionParameter, DataSourceDescriptor, Diagnostics, FieldDescriptor,
    GenerationPlan, JobFlags, Lifecycle, ListingDescriptor, ParamEncoding, ResourceDescriptor,
    ResourceMethods, SkipReason, SkippedGroup, StopStep,
};
pub use error::{CatalogError, ConfigError, MarshalError, ReconcileError};
pub use loader::{
    catalogue_from_value, find_latest_catalogue, is_url, load_catalogue, load_catalogue_auto,
    load_catalogue_str, DEFAULT_CATALOGUE_PREFIX,
};
pub use mapper::attr_kind;
pub use marshal::{build_params, delete_param, identifier_param, marshal_value, MarshalRule};
pub use mutability::{analyze, update_properties, MutabilityAnalysis};
pub use naming::{action_name, field_name, listing_name, resource_name};
pub use reconcile::{Decoder, ReadBack, ResourceMode};
pub use resolver::{resolve, resolve_first_param, ResolvedProperties};
pub use schema::{
    Catalogue, CatalogueMetadata, MethodSpec, PrimitiveKind, PropertyMap, PropertySchema,
    SchemaMeta, Shape,
};
pub use types::{split_method_name, AttrKind, IdWireType, Mutability, Verb};
pub use validator::validate_catalogue;
pub use value::{AttrValue, ResourceState};

#[cfg(feature = "remote")]
pub use loader::load_catalogue_url;
