//! Manager configuration.

use crate::error::SessionResult;
use rowcheck_codec::DEFAULT_NULL_MARKER;
use rowcheck_mapper::{DEFAULT_SNAPSHOT_LIMIT, DEFAULT_VAR_PREFIX};
use serde::Deserialize;

/// Settings shared by every table step of a manager.
///
/// Missing fields take their defaults, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Prefix marking a cell as a variable token.
    pub var_prefix: String,
    /// Cell text that stands for Null.
    pub null_marker: String,
    /// Rows fetched into a failure snapshot.
    pub snapshot_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            var_prefix: DEFAULT_VAR_PREFIX.to_string(),
            null_marker: DEFAULT_NULL_MARKER.to_string(),
            snapshot_limit: DEFAULT_SNAPSHOT_LIMIT,
        }
    }
}

impl Config {
    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> SessionResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
