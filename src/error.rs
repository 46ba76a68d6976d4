//! Error types for catalogue loading, marshalling and reconciliation.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::AttrKind;

/// Fatal errors while locating or loading a method catalogue.
#[derive(Debug, Error)]
pub enum CatalogError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("no catalogue matching {prefix}*.json in {dir}")]
    NoCatalogue { dir: PathBuf, prefix: String },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid catalogue: {}", errors.join("; "))]
    InvalidCatalogue { errors: Vec<String> },
}

impl CatalogError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            CatalogError::FileNotFound { .. }
            | CatalogError::NoCatalogue { .. }
            | CatalogError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            CatalogError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors loading an assembler configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read config {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfigError::InvalidJson { .. } => 2,
            _ => 3,
        }
    }
}

/// Errors turning locally held state into call parameters.
///
/// Any of these aborts the call before dispatch.
#[derive(Debug, Error)]
pub enum MarshalError {
    #[error("failed to parse {field}: {source}")]
    Decode {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("field {field}: expected {expected} value, got {actual}")]
    TypeMismatch {
        field: String,
        expected: AttrKind,
        actual: &'static str,
    },

    #[error("resource has no identifier in local state")]
    MissingIdentifier,

    #[error("cannot parse identifier \"{value}\": {source}")]
    InvalidIdentifier {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

impl MarshalError {
    /// Name of the offending field, when the error is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            MarshalError::Decode { field, .. } | MarshalError::TypeMismatch { field, .. } => {
                Some(field)
            }
            MarshalError::MissingIdentifier | MarshalError::InvalidIdentifier { .. } => None,
        }
    }
}

/// Errors merging a read response into local state.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("failed to parse API response: expected object, got {actual}")]
    NotAnObject { actual: &'static str },

    #[error("failed to parse API response: expected array of rows, got {actual}")]
    NotAnArray { actual: &'static str },
}
