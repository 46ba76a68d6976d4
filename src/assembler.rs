//! Resource assembly - turns a method catalogue into descriptors.
//!
//! Methods are grouped by their dotted base name. Every base with a `create`
//! method becomes a candidate resource; `get_instance` and `query` methods become
//! data sources and listings; remaining non-CRUD methods that are jobs or carry an
//! action verb become actions. Anything not consumed by an emitted descriptor is
//! reported in [`Diagnostics::unconsumed`].
//!
//! Assembly is pure: the same catalogue and config always produce the same plan.

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info, warn};

use crate::config::AssemblerConfig;
use crate::descriptor::{
    ActionDescriptor, ActionParameter, DataSourceDescriptor, FieldDescriptor,
    GenerationPlan, JobFlags, Lifecycle, ListingDescriptor, ParamEncoding, ResourceDescriptor,
    ResourceMethods, SkipReason, SkippedGroup, StopStep,
};
use crate::mapper::attr_kind;
use crate::marshal::{self, is_object_like};
use crate::mutability::{analyze, update_properties};
use crate::naming::{action_name, field_name, listing_name, resource_name};
use crate::reconcile::{self, ResourceMode};
use crate::resolver::{resolve, ResolvedProperties};
use crate::schema::{Catalogue, MethodSpec, PrimitiveKind, PropertySchema, Shape};
use crate::types::{
    method_name, split_method_name, AttrKind, IdWireType, Mutability, Verb, ID_FIELD,
    START_ON_CREATE_FIELD,
};

const MAX_DESCRIPTION: usize = 200;
const MAX_FIELD_DESCRIPTION: usize = 100;
const IDENTIFIER_DESCRIPTION: &str = "Resource ID";

/// Build every descriptor the catalogue supports.
pub fn assemble(catalogue: &Catalogue, config: &AssemblerConfig) -> GenerationPlan {
    let groups = group_methods(catalogue);
    let mut consumed: IndexSet<String> = IndexSet::new();
    let mut plan = GenerationPlan {
        version: catalogue.metadata.version.clone(),
        ..GenerationPlan::default()
    };

    for (base, verbs) in &groups {
        if !verbs.contains(&Verb::Create) {
            continue;
        }
        if config.skip_resources.contains(base.as_str()) {
            debug!(resource = %base, "resource excluded by config");
            plan.diagnostics.skipped.push(SkippedGroup {
                name: base.clone(),
                reason: SkipReason::Excluded,
            });
            continue;
        }
        match assemble_resource(catalogue, base, config) {
            Ok(resource) => {
                consumed.extend(resource_methods_used(catalogue, &resource));
                plan.resources.push(resource);
            }
            Err(reason) => {
                info!(resource = %base, ?reason, "resource skipped");
                plan.diagnostics.skipped.push(SkippedGroup {
                    name: base.clone(),
                    reason,
                });
            }
        }
    }

    for (base, verbs) in &groups {
        if !config.wants_data_source(base) {
            continue;
        }
        if verbs.contains(&Verb::GetInstance) {
            if let Some(ds) = assemble_data_source(catalogue, base, config) {
                consumed.insert(ds.method.clone());
                plan.data_sources.push(ds);
            }
        }
        if verbs.contains(&Verb::Query) {
            if let Some(listing) = assemble_listing(catalogue, base, config) {
                consumed.insert(listing.method.clone());
                plan.listings.push(listing);
            }
        }
    }

    for spec in catalogue.methods.values() {
        if !is_action_candidate(spec, config) {
            continue;
        }
        match assemble_action(spec) {
            Ok(action) => {
                consumed.insert(action.method.clone());
                plan.actions.push(action);
            }
            Err(reason) => {
                debug!(method = %spec.name, ?reason, "action skipped");
                plan.diagnostics.skipped.push(SkippedGroup {
                    name: spec.name.clone(),
                    reason,
                });
            }
        }
    }

    plan.diagnostics.unconsumed = catalogue
        .method_names()
        .filter(|name| !consumed.contains(*name))
        .map(String::from)
        .collect();

    info!(
        resources = plan.resources.len(),
        data_sources = plan.data_sources.len(),
        listings = plan.listings.len(),
        actions = plan.actions.len(),
        unconsumed = plan.diagnostics.unconsumed.len(),
        "assembly complete"
    );
    plan
}

/// Assemble the resource for one base name.
pub fn assemble_resource(
    catalogue: &Catalogue,
    base: &str,
    config: &AssemblerConfig,
) -> Result<ResourceDescriptor, SkipReason> {
    let create_name = method_name(base, &Verb::Create);
    let create = catalogue.get(&create_name);
    let update = catalogue.get(&method_name(base, &Verb::Update));
    let delete = catalogue.get(&method_name(base, &Verb::Delete));

    let schema = create
        .and_then(MethodSpec::first_param)
        .or_else(|| update.and_then(MethodSpec::data_param))
        .ok_or(SkipReason::NoSchema)?;

    let create_props = resolve(schema);
    if create_props.is_empty() {
        return Err(SkipReason::EmptyProperties);
    }

    let update_props = update.and_then(update_properties);
    let analysis = analyze(&create_props, update_props.as_ref());

    let mut merged = create_props.clone();
    if let Some(update_props) = &update_props {
        merged.overlay(update_props);
    }

    let start_name = method_name(base, &Verb::Start);
    let stop_name = method_name(base, &Verb::Stop);
    let has_start = catalogue.contains(&start_name) && !config.start_suppressed.contains(base);
    let has_stop = catalogue.contains(&stop_name);

    let mut fields = vec![FieldDescriptor::identifier(IDENTIFIER_DESCRIPTION)];
    if has_start {
        fields.push(FieldDescriptor::start_trigger());
    }
    let mut seen: IndexSet<String> = fields.iter().map(|f| f.name.clone()).collect();

    for (wire, property) in &merged.properties {
        if wire == ID_FIELD || config.is_reserved(wire) {
            continue;
        }
        let name = field_name(wire);
        if !seen.insert(name.clone()) {
            warn!(resource = %base, field = %wire, canonical = %name, "canonical name collision, field dropped");
            continue;
        }
        let kind = attr_kind(property);
        let required = merged.is_required(wire);
        let mutability = analysis.class(wire);
        let auto_generated = !required
            && property
                .description()
                .unwrap_or_default()
                .to_lowercase()
                .contains("generate");
        fields.push(FieldDescriptor {
            auto_generated,
            marshal: Some(marshal::plan(kind, property)),
            read_back: reconcile::plan(wire, kind, mutability, required, ResourceMode::Instance),
            default: property.meta.default.clone(),
            name,
            wire_name: wire.clone(),
            kind,
            required,
            mutability,
            description: field_description(property),
        });
    }

    let update_fields = match &update_props {
        Some(update_props) => fields
            .iter()
            .filter(|f| f.marshal.is_some() && update_props.contains(&f.wire_name))
            .map(|f| f.name.clone())
            .collect(),
        None => Vec::new(),
    };

    let description = create
        .and_then(MethodSpec::summary)
        .map(truncate_description)
        .unwrap_or_else(|| format!("Manages {} resources", base));

    debug!(
        resource = %base,
        fields = fields.len(),
        create_only = analysis.create_only().count(),
        variants = create_props.variants,
        "resource assembled"
    );

    Ok(ResourceDescriptor {
        name: resource_name(base),
        method_base: base.to_string(),
        description,
        fields,
        update_fields,
        jobs: JobFlags {
            create: create.map(|m| m.job).unwrap_or(false),
            update: update.map(|m| m.job).unwrap_or(false),
            delete: delete.map(|m| m.job).unwrap_or(false),
        },
        id_wire_type: resource_id_wire_type(update, delete),
        delete_needs_options: delete.map(|d| d.accepts.len() >= 2).unwrap_or(false),
        lifecycle: Lifecycle {
            start: has_start.then(|| start_name.clone()),
            stop: has_stop.then(|| StopStep {
                method: stop_name.clone(),
                wait_secs: config.stop_wait_secs,
            }),
        },
        methods: ResourceMethods {
            create: create_name,
            update: update.map(|m| m.name.clone()),
            delete: delete.map(|m| m.name.clone()),
            get_instance: method_name(base, &Verb::GetInstance),
        },
        variants: create_props.variants,
    })
}

/// Assemble the single-instance data source backed by `{base}.get_instance`.
///
/// Returns `None` when the method is missing or its response has no properties.
pub fn assemble_data_source(
    catalogue: &Catalogue,
    base: &str,
    config: &AssemblerConfig,
) -> Option<DataSourceDescriptor> {
    let spec = catalogue.get(&method_name(base, &Verb::GetInstance))?;
    let props = resolve(spec.response()?);
    if props.is_empty() {
        return None;
    }

    let id_wire_type = match props.kind(ID_FIELD) {
        Some(AttrKind::Int64) => IdWireType::Integer,
        _ => IdWireType::String,
    };
    let mut identifier = FieldDescriptor::identifier(IDENTIFIER_DESCRIPTION);
    identifier.required = true;
    identifier.auto_generated = false;

    let mut fields = vec![identifier];
    fields.extend(read_only_fields(base, &props, config, |_| true));

    let name = resource_name(base);
    let description = spec
        .summary()
        .map(truncate_description)
        .unwrap_or_else(|| format!("Retrieves {} data", name));

    Some(DataSourceDescriptor {
        name,
        method: spec.name.clone(),
        description,
        id_wire_type,
        fields,
    })
}

/// Assemble the multi-row listing backed by `{base}.query`.
///
/// List-kind item properties are left out of rows. Returns `None` when the response
/// is not an array of objects or nothing remains after filtering.
pub fn assemble_listing(
    catalogue: &Catalogue,
    base: &str,
    config: &AssemblerConfig,
) -> Option<ListingDescriptor> {
    let spec = catalogue.get(&method_name(base, &Verb::Query))?;
    let items = listing_items(spec.response()?)?;
    let props = resolve(items);

    let mut fields = Vec::new();
    if props.contains(ID_FIELD) {
        fields.push(FieldDescriptor::identifier(IDENTIFIER_DESCRIPTION));
    }
    fields.extend(read_only_fields(base, &props, config, |kind| {
        kind != AttrKind::ListOfString
    }));
    if fields.is_empty() {
        return None;
    }

    let name = listing_name(base);
    let description = spec
        .summary()
        .map(truncate_description)
        .unwrap_or_else(|| format!("Query {} resources", name));

    Some(ListingDescriptor {
        name,
        method: spec.name.clone(),
        description,
        fields,
    })
}

/// Assemble a one-shot action from a method's named parameters.
pub fn assemble_action(spec: &MethodSpec) -> Result<ActionDescriptor, SkipReason> {
    let mut seen = IndexSet::new();
    let mut parameters = Vec::new();
    for param in &spec.accepts {
        let Some(wire) = param.meta.param_name.as_deref() else {
            continue;
        };
        let name = field_name(wire);
        if !seen.insert(name.clone()) {
            warn!(method = %spec.name, param = %wire, "duplicate parameter name, dropped");
            continue;
        }
        let kind = attr_kind(param);
        let json = kind == AttrKind::ListOfString || is_object_like(param);
        parameters.push(ActionParameter {
            name,
            wire_name: wire.to_string(),
            kind: if json { AttrKind::String } else { kind },
            required: param.meta.param_required,
            description: param
                .description()
                .map(|d| truncate(&d.replace('\n', " "), MAX_DESCRIPTION))
                .unwrap_or_default(),
            encoding: if json {
                ParamEncoding::Json
            } else {
                ParamEncoding::Scalar
            },
        });
    }
    if parameters.is_empty() {
        return Err(SkipReason::NoParameters);
    }

    Ok(ActionDescriptor {
        name: action_name(&spec.name),
        method: spec.name.clone(),
        description: action_summary(spec)
            .unwrap_or_else(|| format!("Execute {} action", spec.name)),
        job: spec.job,
        parameters,
    })
}

/// Wire type of a resource identifier.
///
/// String when the first parameter of update or delete is a string, integer when
/// they take a non-string identifier, string when neither declares one.
pub fn resource_id_wire_type(update: Option<&MethodSpec>, delete: Option<&MethodSpec>) -> IdWireType {
    let firsts: Vec<&PropertySchema> = [update, delete]
        .into_iter()
        .flatten()
        .filter_map(MethodSpec::first_param)
        .collect();
    if firsts.is_empty() || firsts.iter().any(|p| is_string_schema(p)) {
        IdWireType::String
    } else {
        IdWireType::Integer
    }
}

// --- Internal implementation ---

/// Method verbs per base name, in catalogue order.
fn group_methods(catalogue: &Catalogue) -> IndexMap<String, Vec<Verb>> {
    let mut groups: IndexMap<String, Vec<Verb>> = IndexMap::new();
    for name in catalogue.method_names() {
        if let Some((base, verb)) = split_method_name(name) {
            groups.entry(base.to_string()).or_default().push(verb);
        }
    }
    groups
}

fn resource_methods_used<'a>(
    catalogue: &'a Catalogue,
    resource: &'a ResourceDescriptor,
) -> impl Iterator<Item = String> + 'a {
    let methods = &resource.methods;
    [
        Some(&methods.create),
        methods.update.as_ref(),
        methods.delete.as_ref(),
        Some(&methods.get_instance),
        resource.lifecycle.start.as_ref(),
        resource.lifecycle.stop.as_ref().map(|s| &s.method),
    ]
    .into_iter()
    .flatten()
    .filter(move |name| catalogue.contains(name))
    .cloned()
}

fn is_action_candidate(spec: &MethodSpec, config: &AssemblerConfig) -> bool {
    if config.skip_actions.contains(&spec.name) {
        return false;
    }
    let verb = match split_method_name(&spec.name) {
        Some((_, verb)) => verb,
        None => Verb::parse(&spec.name),
    };
    !verb.is_crud() && (spec.job || config.is_action_verb(verb.as_str()))
}

fn read_only_fields(
    base: &str,
    props: &ResolvedProperties,
    config: &AssemblerConfig,
    keep: impl Fn(AttrKind) -> bool,
) -> Vec<FieldDescriptor> {
    let mut seen: IndexSet<String> = [ID_FIELD.to_string(), START_ON_CREATE_FIELD.to_string()]
        .into_iter()
        .collect();
    let mut fields = Vec::new();
    for (wire, property) in &props.properties {
        if wire == ID_FIELD || config.is_reserved(wire) {
            continue;
        }
        let kind = attr_kind(property);
        if !keep(kind) {
            continue;
        }
        let name = field_name(wire);
        if !seen.insert(name.clone()) {
            warn!(base = %base, field = %wire, canonical = %name, "canonical name collision, field dropped");
            continue;
        }
        fields.push(FieldDescriptor {
            read_back: reconcile::plan(wire, kind, Mutability::ReadOnly, false, ResourceMode::Listing),
            name,
            wire_name: wire.clone(),
            kind,
            required: false,
            mutability: Mutability::ReadOnly,
            description: field_description(property),
            default: None,
            auto_generated: false,
            marshal: None,
        });
    }
    fields
}

/// The array item schema of a query response, looking through `anyOf` wrappers.
fn listing_items(response: &PropertySchema) -> Option<&PropertySchema> {
    let array = match &response.shape {
        Shape::Array { .. } => response,
        Shape::AnyOf { variants, .. } => variants.iter().find(|v| v.is_array())?,
        Shape::Nullable(inner) if inner.is_array() => inner.as_ref(),
        _ => return None,
    };
    array.array_items()
}

fn is_string_schema(schema: &PropertySchema) -> bool {
    match &schema.shape {
        Shape::Primitive(PrimitiveKind::String)
        | Shape::Enumerated {
            kind: Some(PrimitiveKind::String),
            ..
        } => true,
        Shape::Nullable(inner) => is_string_schema(inner),
        _ => false,
    }
}

fn field_description(schema: &PropertySchema) -> String {
    schema
        .description()
        .map(|d| truncate(&d.replace('\n', " "), MAX_FIELD_DESCRIPTION))
        .unwrap_or_default()
}

/// First sentence of an action's description, newlines flattened.
fn action_summary(spec: &MethodSpec) -> Option<String> {
    let flat = spec.description.as_deref()?.replace('\n', " ");
    let sentence = flat.split('.').next().unwrap_or_default().trim();
    (!sentence.is_empty()).then(|| truncate_description(sentence))
}

fn truncate_description(text: &str) -> String {
    truncate(text, MAX_DESCRIPTION)
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
