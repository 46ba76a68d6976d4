//! Schema resolution - flattens a request schema into one property set.
//!
//! A single object schema resolves to its own properties and required names.
//! A polymorphic schema (`anyOf` / `oneOf` over objects) resolves to the union of
//! every variant's properties and the intersection of their required names: a
//! field is only unconditionally required if every variant demands it.
//!
//! On a name collision the later variant's definition wins while the property keeps
//! the position where it was first seen.

use indexmap::IndexSet;

use crate::mapper::attr_kind;
use crate::schema::{PropertyMap, PropertySchema, Shape};
use crate::types::{AttrKind, ID_FIELD};

/// Flattened attribute surface of a schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedProperties {
    pub properties: PropertyMap,
    pub required: IndexSet<String>,
    /// Number of object variants merged (1 for a plain object schema).
    pub variants: usize,
}

impl ResolvedProperties {
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    /// Attribute kind of a property, if present.
    pub fn kind(&self, name: &str) -> Option<AttrKind> {
        self.properties.get(name).map(attr_kind)
    }

    /// Drop the identifier property and its requiredness.
    pub fn without_identifier(mut self) -> Self {
        self.properties.shift_remove(ID_FIELD);
        self.required.shift_remove(ID_FIELD);
        self
    }

    /// Merge another property set over this one.
    ///
    /// Properties from `other` replace same-named ones in place and new ones are
    /// appended. Requiredness is left as it was.
    pub fn overlay(&mut self, other: &ResolvedProperties) {
        for (name, schema) in &other.properties {
            self.properties.insert(name.clone(), schema.clone());
        }
    }
}

/// Resolve a schema into its flattened property set.
///
/// Non-object schemas resolve to an empty set.
pub fn resolve(schema: &PropertySchema) -> ResolvedProperties {
    match &schema.shape {
        Shape::Object {
            properties,
            required,
        } => ResolvedProperties {
            properties: properties.clone(),
            required: required.iter().cloned().collect(),
            variants: 1,
        },
        Shape::AnyOf { variants, .. } | Shape::OneOf { variants, .. } => merge_variants(variants),
        Shape::Nullable(inner) => resolve(inner),
        _ => ResolvedProperties::default(),
    }
}

/// Resolve the first accepted parameter of a method, if it has one.
pub fn resolve_first_param(accepts: &[PropertySchema]) -> Option<ResolvedProperties> {
    accepts.first().map(resolve)
}

// --- Internal implementation ---

fn merge_variants(variants: &[PropertySchema]) -> ResolvedProperties {
    // Only object variants take part in the required intersection; a null
    // alternative makes the whole value optional, not its members.
    let objects: Vec<&PropertySchema> = variants.iter().filter(|v| v.is_object()).collect();

    let mut properties = PropertyMap::new();
    for variant in &objects {
        if let Some(props) = variant.properties() {
            for (name, schema) in props {
                properties.insert(name.clone(), schema.clone());
            }
        }
    }

    let required = match objects.split_first() {
        Some((first, rest)) => first
            .required()
            .iter()
            .filter(|name| rest.iter().all(|v| v.required().contains(*name)))
            .cloned()
            .collect(),
        None => IndexSet::new(),
    };

    ResolvedProperties {
        properties,
        required,
        variants: objects.len(),
    }
}
