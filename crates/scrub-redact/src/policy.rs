//! Sanitize policy configuration.
//!
//! Defines which option keys count as identity-bearing. The built-in keys
//! are always enforced; a policy file can only extend them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Schema version for the policy file.
pub const POLICY_SCHEMA_VERSION: &str = "1.0.0";

/// `Program Information` keys that identify the creator or their machine.
pub const PROGRAM_INFO_IDENTITY_KEYS: [&str; 4] =
    ["Created By", "Creator Hostname", "Creator Tool", "Tool Name"];

/// `User Properties` keys that carry personal identity.
pub const USER_PROPERTY_IDENTITY_KEYS: [&str; 3] = ["User Name", "User Email", "User Organization"];

/// Sanitize policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizePolicy {
    /// Schema version.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Additional `Program Information` keys to remove.
    #[serde(default)]
    pub extra_program_info_keys: Vec<String>,

    /// Additional `User Properties` keys to remove.
    #[serde(default)]
    pub extra_user_property_keys: Vec<String>,
}

fn default_schema_version() -> String {
    POLICY_SCHEMA_VERSION.to_string()
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        Self {
            schema_version: POLICY_SCHEMA_VERSION.to_string(),
            extra_program_info_keys: Vec::new(),
            extra_user_property_keys: Vec::new(),
        }
    }
}

impl SanitizePolicy {
    /// Create a new policy with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load policy from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let policy: SanitizePolicy = serde_json::from_str(&content)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Check the schema version and extra keys.
    pub fn validate(&self) -> crate::Result<()> {
        if self.schema_version != POLICY_SCHEMA_VERSION {
            return Err(crate::RedactionError::PolicyError(format!(
                "unsupported schema version {} (expected {})",
                self.schema_version, POLICY_SCHEMA_VERSION
            )));
        }
        let extras = self
            .extra_program_info_keys
            .iter()
            .chain(self.extra_user_property_keys.iter());
        for key in extras {
            if key.trim().is_empty() {
                return Err(crate::RedactionError::PolicyError(
                    "extra denylist keys must be non-empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Add a `Program Information` key to the denylist.
    pub fn with_program_info_key(mut self, key: impl Into<String>) -> Self {
        self.extra_program_info_keys.push(key.into());
        self
    }

    /// Add a `User Properties` key to the denylist.
    pub fn with_user_property_key(mut self, key: impl Into<String>) -> Self {
        self.extra_user_property_keys.push(key.into());
        self
    }

    /// Effective `Program Information` denylist (built-in plus extras).
    pub fn program_info_denylist(&self) -> BTreeSet<&str> {
        PROGRAM_INFO_IDENTITY_KEYS
            .iter()
            .copied()
            .chain(self.extra_program_info_keys.iter().map(String::as_str))
            .collect()
    }

    /// Effective `User Properties` denylist (built-in plus extras).
    pub fn user_property_denylist(&self) -> BTreeSet<&str> {
        USER_PROPERTY_IDENTITY_KEYS
            .iter()
            .copied()
            .chain(self.extra_user_property_keys.iter().map(String::as_str))
            .collect()
    }
}
