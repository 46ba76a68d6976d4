//! Structural validation of a catalogue document.
//!
//! Checks only the envelope the assembler relies on: a `methods` object whose
//! entries are objects with well-typed `accepts`, `returns`, `job` and
//! `description` members. Parameter schemas themselves are not validated; the
//! schema model treats anything it does not recognise as untyped.

use serde_json::{json, Value};

use crate::error::CatalogError;

fn catalogue_shape() -> Value {
    json!({
        "type": "object",
        "required": ["methods"],
        "properties": {
            "methods": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "properties": {
                        "accepts": { "type": ["array", "object", "null"] },
                        "returns": { "type": ["array", "object", "null"] },
                        "job": { "type": ["boolean", "null"] },
                        "description": { "type": ["string", "null"] }
                    }
                }
            },
            "_metadata": { "type": "object" }
        }
    })
}

/// Validate a raw catalogue document.
///
/// # Errors
///
/// Returns `CatalogError::InvalidCatalogue` listing every violation as
/// `"{instance path}: {message}"`.
pub fn validate_catalogue(document: &Value) -> Result<(), CatalogError> {
    let validator = jsonschema::validator_for(&catalogue_shape()).map_err(|e| {
        CatalogError::InvalidCatalogue {
            errors: vec![e.to_string()],
        }
    })?;

    let errors: Vec<String> = validator
        .iter_errors(document)
        .map(|e| {
            let path = e.instance_path.to_string();
            if path.is_empty() {
                e.to_string()
            } else {
                format!("{}: {}", path, e)
            }
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CatalogError::InvalidCatalogue { errors })
    }
}
