//! Engine-wide settings.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Settings shared by every validation call.
///
/// ```rust
/// use dictize::EngineConfig;
///
/// let config = EngineConfig::from_json_str(r#"{"fix_partial_updates": false}"#).unwrap();
/// assert!(!config.fix_partial_updates);
///
/// assert!(EngineConfig::from_json_str("{}").unwrap().fix_partial_updates);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Restore top-level empty lists that validation removed.
    pub fix_partial_updates: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fix_partial_updates: true,
        }
    }
}

impl EngineConfig {
    /// Parses settings from a JSON document. Absent keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads settings from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }
}

/// Errors loading an [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
