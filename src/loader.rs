//! Catalogue loading from files, strings, HTTP URLs and directories.
//!
//! Every entry point validates the document envelope before building the
//! [`Catalogue`] model, so a malformed file fails at load time rather than
//! silently producing an empty plan.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::CatalogError;
use crate::schema::Catalogue;
use crate::validator::validate_catalogue;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default file name prefix of exported catalogues.
pub const DEFAULT_CATALOGUE_PREFIX: &str = "truenas-methods-";

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load a catalogue from a file path.
///
/// # Errors
///
/// Returns `CatalogError::FileNotFound` if the file doesn't exist,
/// `CatalogError::InvalidJson` if it isn't valid JSON, or
/// `CatalogError::InvalidCatalogue` if the envelope is malformed.
pub fn load_catalogue(path: &Path) -> Result<Catalogue, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), "loading catalogue");
    load_catalogue_str(&content)
}

/// Load a catalogue from a JSON string.
pub fn load_catalogue_str(content: &str) -> Result<Catalogue, CatalogError> {
    let document: Value =
        serde_json::from_str(content).map_err(|source| CatalogError::InvalidJson { source })?;
    catalogue_from_value(document)
}

/// Build a catalogue from an already-parsed document.
pub fn catalogue_from_value(document: Value) -> Result<Catalogue, CatalogError> {
    validate_catalogue(&document)?;
    let catalogue: Catalogue =
        serde_json::from_value(document).map_err(|source| CatalogError::InvalidJson { source })?;

    info!(
        version = catalogue.metadata.version.as_deref().unwrap_or("unknown"),
        methods = catalogue.len(),
        "catalogue loaded"
    );
    if let Some(count) = catalogue.metadata.count {
        if count != catalogue.len() {
            warn!(
                declared = count,
                actual = catalogue.len(),
                "catalogue method count does not match metadata"
            );
        }
    }
    Ok(catalogue)
}

/// Load a catalogue from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `CatalogError::NetworkError` if the request fails or the status is
/// not successful, otherwise the same errors as [`load_catalogue_str`].
#[cfg(feature = "remote")]
pub fn load_catalogue_url(url: &str) -> Result<Catalogue, CatalogError> {
    let network = |source: reqwest::Error| CatalogError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network)?;

    info!(url, "fetching catalogue");
    let response = client.get(url).send().map_err(network)?;

    // Check for HTTP errors before parsing
    let response = response.error_for_status().map_err(network)?;

    let document: Value = response.json().map_err(network)?;
    catalogue_from_value(document)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a catalogue from a file path or URL.
///
/// URL loading requires the `remote` feature.
pub fn load_catalogue_auto(source: &str) -> Result<Catalogue, CatalogError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_catalogue_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(CatalogError::FileNotFound {
                path: PathBuf::from(source),
            })
        }
    } else {
        load_catalogue(Path::new(source))
    }
}

/// Find the newest `{prefix}*.json` catalogue in a directory.
///
/// Newest means last in lexicographic file name order, which matches the
/// version-stamped names catalogues are exported under.
///
/// # Errors
///
/// Returns `CatalogError::NoCatalogue` when nothing matches, or
/// `CatalogError::ReadError` if the directory can't be listed.
pub fn find_latest_catalogue(dir: &Path, prefix: &str) -> Result<PathBuf, CatalogError> {
    let entries = std::fs::read_dir(dir).map_err(|source| CatalogError::ReadError {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(prefix) && name.ends_with(".json"))
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();
    debug!(dir = %dir.display(), candidates = candidates.len(), "catalogue candidates");

    candidates.pop().ok_or_else(|| CatalogError::NoCatalogue {
        dir: dir.to_path_buf(),
        prefix: prefix.to_string(),
    })
}
