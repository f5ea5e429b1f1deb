//! Export options.

use serde::{Deserialize, Serialize};

/// Suffix appended to the project name to form the destination directory.
pub const DEFAULT_SUFFIX: &str = "_sanitized";

/// What to do when the destination directory already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingPolicy {
    /// Refuse to export; existing content stays untouched.
    #[default]
    Fail,
    /// Replace the existing destination with the new export.
    Overwrite,
}

impl std::str::FromStr for ExistingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(ExistingPolicy::Fail),
            "overwrite" | "replace" => Ok(ExistingPolicy::Overwrite),
            _ => Err(format!("unknown existing-destination policy: {}", s)),
        }
    }
}

impl std::fmt::Display for ExistingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExistingPolicy::Fail => write!(f, "fail"),
            ExistingPolicy::Overwrite => write!(f, "overwrite"),
        }
    }
}

/// How symbolic links found in the project tree are exported.
///
/// Traversal never follows links, whatever the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymlinkPolicy {
    /// Leave links out of the export.
    #[default]
    Skip,
    /// Copy the content of links that point at regular files; skip the rest.
    Copy,
    /// Recreate the link verbatim (unix only; skipped elsewhere).
    Preserve,
}

impl std::str::FromStr for SymlinkPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(SymlinkPolicy::Skip),
            "copy" | "follow" => Ok(SymlinkPolicy::Copy),
            "preserve" | "link" => Ok(SymlinkPolicy::Preserve),
            _ => Err(format!("unknown symlink policy: {}", s)),
        }
    }
}

impl std::fmt::Display for SymlinkPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymlinkPolicy::Skip => write!(f, "skip"),
            SymlinkPolicy::Copy => write!(f, "copy"),
            SymlinkPolicy::Preserve => write!(f, "preserve"),
        }
    }
}

/// Options controlling a tree export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    #[serde(default)]
    pub on_existing: ExistingPolicy,

    #[serde(default)]
    pub symlinks: SymlinkPolicy,

    /// Carry permissions and timestamps over to copied entries.
    #[serde(default = "default_true")]
    pub preserve_metadata: bool,

    /// Appended to the project name to name the destination directory.
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

fn default_true() -> bool {
    true
}

fn default_suffix() -> String {
    DEFAULT_SUFFIX.to_string()
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            on_existing: ExistingPolicy::default(),
            symlinks: SymlinkPolicy::default(),
            preserve_metadata: true,
            suffix: default_suffix(),
        }
    }
}

impl ExportOptions {
    pub fn with_on_existing(mut self, policy: ExistingPolicy) -> Self {
        self.on_existing = policy;
        self
    }

    pub fn with_symlinks(mut self, policy: SymlinkPolicy) -> Self {
        self.symlinks = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExportOptions::default();
        assert_eq!(options.on_existing, ExistingPolicy::Fail);
        assert_eq!(options.symlinks, SymlinkPolicy::Skip);
        assert!(options.preserve_metadata);
        assert_eq!(options.suffix, "_sanitized");
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("overwrite".parse::<ExistingPolicy>(), Ok(ExistingPolicy::Overwrite));
        assert_eq!("FAIL".parse::<ExistingPolicy>(), Ok(ExistingPolicy::Fail));
        assert!("merge".parse::<ExistingPolicy>().is_err());
        assert_eq!("preserve".parse::<SymlinkPolicy>(), Ok(SymlinkPolicy::Preserve));
        assert_eq!("follow".parse::<SymlinkPolicy>(), Ok(SymlinkPolicy::Copy));
        assert!("hardlink".parse::<SymlinkPolicy>().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let options: ExportOptions = serde_json::from_str(r#"{"symlinks": "copy"}"#).unwrap();
        assert_eq!(options.symlinks, SymlinkPolicy::Copy);
        assert_eq!(options.on_existing, ExistingPolicy::Fail);
        assert!(options.preserve_metadata);
    }
}
