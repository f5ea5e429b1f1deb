//! The `config.json` model.

use crate::validate::{ValidationError, ValidationResult};
use scrub_bundle::ExportOptions;
use scrub_redact::SanitizePolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// Top-level projscrub configuration.
///
/// Every section is optional in the file; missing sections take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjscrubConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Tree export behaviour.
    #[serde(default)]
    pub export: ExportOptions,

    /// Extra denylist keys for the sanitizer.
    #[serde(default)]
    pub sanitize: SanitizePolicy,
}

fn default_schema_version() -> String {
    CONFIG_SCHEMA_VERSION.to_string()
}

impl Default for ProjscrubConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            export: ExportOptions::default(),
            sanitize: SanitizePolicy::default(),
        }
    }
}

impl ProjscrubConfig {
    /// Parse a configuration from JSON text without validating it.
    pub fn from_json(json: &str) -> ValidationResult<Self> {
        serde_json::from_str(json).map_err(|e| ValidationError::ParseError(e.to_string()))
    }

    /// Read and parse a configuration file without validating it.
    pub fn from_file(path: &Path) -> ValidationResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ValidationError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }
}
