//! Assembler configuration.
//!
//! Exclusion sets and naming policy passed into [`assemble`](crate::assemble).
//! Every field has a default, so an empty JSON object is a valid config file.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Verb substrings that mark a non-CRUD method as an action.
pub const DEFAULT_ACTION_KEYWORDS: &[&str] = &[
    "start", "stop", "restart", "run", "sync", "scrub", "backup", "restore", "rollback",
    "redeploy",
];

/// Property names never surfaced as fields.
pub const DEFAULT_RESERVED_NAMES: &[&str] = &["provider"];

/// Seconds to wait after the pre-delete stop call.
pub const DEFAULT_STOP_WAIT_SECS: u64 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssemblerConfig {
    /// Resource base names never turned into resources.
    pub skip_resources: BTreeSet<String>,
    /// Method names never turned into actions.
    pub skip_actions: BTreeSet<String>,
    /// Resource bases whose create call already starts them; no trigger field.
    pub start_suppressed: BTreeSet<String>,
    pub reserved_names: BTreeSet<String>,
    pub action_keywords: Vec<String>,
    /// Bases to emit data sources and listings for; `None` means every base that has them.
    pub data_sources: Option<BTreeSet<String>>,
    pub stop_wait_secs: u64,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            skip_resources: BTreeSet::new(),
            skip_actions: BTreeSet::new(),
            start_suppressed: BTreeSet::new(),
            reserved_names: DEFAULT_RESERVED_NAMES.iter().map(|s| s.to_string()).collect(),
            action_keywords: DEFAULT_ACTION_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            data_sources: None,
            stop_wait_secs: DEFAULT_STOP_WAIT_SECS,
        }
    }
}

impl AssemblerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidJson {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Exclude a resource base.
    pub fn skip_resource(mut self, base: impl Into<String>) -> Self {
        self.skip_resources.insert(base.into());
        self
    }

    /// Exclude an action method.
    pub fn skip_action(mut self, method: impl Into<String>) -> Self {
        self.skip_actions.insert(method.into());
        self
    }

    /// Mark a resource base whose create call already starts it.
    pub fn suppress_start(mut self, base: impl Into<String>) -> Self {
        self.start_suppressed.insert(base.into());
        self
    }

    /// Restrict data sources and listings to the given bases.
    pub fn data_sources<I, S>(mut self, bases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_sources = Some(bases.into_iter().map(Into::into).collect());
        self
    }

    pub fn stop_wait_secs(mut self, secs: u64) -> Self {
        self.stop_wait_secs = secs;
        self
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_names.contains(name)
    }

    /// True when the verb contains any action keyword.
    pub fn is_action_verb(&self, verb: &str) -> bool {
        self.action_keywords.iter().any(|k| verb.contains(k.as_str()))
    }

    pub fn wants_data_source(&self, base: &str) -> bool {
        self.data_sources
            .as_ref()
            .map(|allowed| allowed.contains(base))
            .unwrap_or(true)
    }
}
