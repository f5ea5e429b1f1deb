//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variable → XDG path → defaults.
//!
//! A path named on the command line or in the environment is used even when
//! it does not exist, so a typo surfaces as an I/O error instead of silently
//! falling back to defaults. The XDG path is only used when present.

use crate::validate::{validate_config, ValidationResult};
use crate::ProjscrubConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the configuration came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in the XDG config directory.
    XdgConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable naming the config file.
pub const ENV_CONFIG_PATH: &str = "PROJSCRUB_CONFIG";

/// Standard config file name.
pub const CONFIG_FILENAME: &str = "config.json";

/// Application name for XDG directories.
const APP_NAME: &str = "projscrub";

/// A loaded, validated configuration and where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: ProjscrubConfig,
    pub source: ConfigSource,
    /// `None` when built-in defaults are in use.
    pub path: Option<PathBuf>,
}

/// Find the config file to load.
pub fn resolve_config_path(cli_path: Option<&Path>) -> (Option<PathBuf>, ConfigSource) {
    if let Some(path) = cli_path {
        return (Some(path.to_path_buf()), ConfigSource::CliArgument);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        if !env_path.trim().is_empty() {
            return (Some(PathBuf::from(env_path)), ConfigSource::Environment);
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(CONFIG_FILENAME);
        if path.is_file() {
            return (Some(path), ConfigSource::XdgConfig);
        }
    }

    (None, ConfigSource::BuiltinDefault)
}

/// Resolve, read and validate the configuration.
pub fn load_config(cli_path: Option<&Path>) -> ValidationResult<ResolvedConfig> {
    let (path, source) = resolve_config_path(cli_path);
    let config = match &path {
        Some(path) => ProjscrubConfig::from_file(path)?,
        None => ProjscrubConfig::default(),
    };
    validate_config(&config)?;
    debug!(
        source = %source,
        path = ?path.as_ref().map(|p| p.display().to_string()),
        "Configuration loaded"
    );
    Ok(ResolvedConfig {
        config,
        source,
        path,
    })
}

/// Get the XDG config directory for projscrub.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
