//! Mutability analysis - compares create-time and update-time property sets.

use indexmap::IndexMap;

use crate::resolver::{resolve, ResolvedProperties};
use crate::schema::MethodSpec;
use crate::types::{Mutability, ID_FIELD, RENAMEABLE_FIELD};

/// Per-field mutability classes for one resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutabilityAnalysis {
    classes: IndexMap<String, Mutability>,
    has_update: bool,
}

impl MutabilityAnalysis {
    /// Class of a field; fields never seen are create-only.
    pub fn class(&self, name: &str) -> Mutability {
        self.classes
            .get(name)
            .copied()
            .unwrap_or(Mutability::CreateOnly)
    }

    pub fn has_update(&self) -> bool {
        self.has_update
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Mutability)> {
        self.classes.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Names of create-only fields, in declaration order.
    pub fn create_only(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, class)| *class == Mutability::CreateOnly)
            .map(|(name, _)| name)
    }
}

/// Resolve the data half of an `[identifier, data]` update call.
///
/// Returns `None` unless the method takes at least two parameters. The identifier
/// property is stripped from the result.
pub fn update_properties(update: &MethodSpec) -> Option<ResolvedProperties> {
    update
        .data_param()
        .map(|data| resolve(data).without_identifier())
}

/// Classify every field of a resource.
///
/// A create field absent from the update set is create-only, except `name`, which
/// remote systems commonly rename through an update that omits it from its schema.
/// Without an update set every field is create-only. Update-only fields are mutable.
/// The identifier is always [`Mutability::Identifier`].
pub fn analyze(
    create: &ResolvedProperties,
    update: Option<&ResolvedProperties>,
) -> MutabilityAnalysis {
    let mut classes = IndexMap::new();

    for name in create.properties.keys() {
        let class = if name == ID_FIELD {
            Mutability::Identifier
        } else {
            match update {
                None => Mutability::CreateOnly,
                Some(update) if update.contains(name) => Mutability::Mutable,
                Some(_) if name == RENAMEABLE_FIELD => Mutability::Mutable,
                Some(_) => Mutability::CreateOnly,
            }
        };
        classes.insert(name.clone(), class);
    }

    if let Some(update) = update {
        for name in update.properties.keys() {
            if name != ID_FIELD {
                classes.entry(name.clone()).or_insert(Mutability::Mutable);
            }
        }
    }

    MutabilityAnalysis {
        classes,
        has_update: update.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PropertySchema;
    use serde_json::{json, Value};

    fn props(value: Value) -> ResolvedProperties {
        resolve(&PropertySchema::from_value(&value))
    }

    fn create_set() -> ResolvedProperties {
        props(json!({
            "type": "object",
            "properties": {
                "id": { "type": "integer" },
                "name": { "type": "string" },
                "pool": { "type": "string" },
                "comment": { "type": "string" }
            }
        }))
    }

    #[test]
    fn absent_from_update_is_create_only() {
        let update = props(json!({
            "type": "object",
            "properties": { "comment": {} }
        }));
        let analysis = analyze(&create_set(), Some(&update));
        assert_eq!(analysis.class("pool"), Mutability::CreateOnly);
        assert_eq!(analysis.class("comment"), Mutability::Mutable);
        assert!(analysis.has_update());
    }

    #[test]
    fn name_survives_omission_from_update() {
        let update = props(json!({ "type": "object", "properties": { "comment": {} } }));
        let analysis = analyze(&create_set(), Some(&update));
        assert_eq!(analysis.class("name"), Mutability::Mutable);
    }

    #[test]
    fn no_update_makes_everything_create_only() {
        let analysis = analyze(&create_set(), None);
        for name in ["name", "pool", "comment"] {
            assert_eq!(analysis.class(name), Mutability::CreateOnly, "{}", name);
        }
        assert!(!analysis.has_update());
        assert_eq!(analysis.create_only().collect::<Vec<_>>(), vec!["name", "pool", "comment"]);
    }

    #[test]
    fn identifier_classified_separately() {
        let update = props(json!({ "type": "object", "properties": { "id": {}, "pool": {} } }));
        let analysis = analyze(&create_set(), Some(&update));
        assert_eq!(analysis.class("id"), Mutability::Identifier);
        assert_eq!(analysis.class("pool"), Mutability::Mutable);
    }

    #[test]
    fn update_only_fields_are_mutable() {
        let update = props(json!({ "type": "object", "properties": { "enabled": {} } }));
        let analysis = analyze(&create_set(), Some(&update));
        assert_eq!(analysis.class("enabled"), Mutability::Mutable);
    }

    #[test]
    fn update_properties_needs_two_params() {
        let single: MethodSpec = serde_json::from_value(json!({
            "accepts": [{ "type": "object", "properties": { "a": {} } }]
        }))
        .unwrap();
        assert!(update_properties(&single).is_none());

        let pair: MethodSpec = serde_json::from_value(json!({
            "accepts": [
                { "type": "integer" },
                { "type": "object", "properties": { "id": {}, "a": {} } }
            ]
        }))
        .unwrap();
        let resolved = update_properties(&pair).unwrap();
        assert!(resolved.contains("a"));
        assert!(!resolved.contains("id"));
    }
}
