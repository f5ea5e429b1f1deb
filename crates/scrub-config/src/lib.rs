//! projscrub configuration loading and validation.
//!
//! This crate provides:
//! - The typed `config.json` model (export options plus sanitize policy)
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation with stable error codes

pub mod config;
pub mod resolve;
pub mod validate;

pub use config::{ProjscrubConfig, CONFIG_SCHEMA_VERSION};
pub use resolve::{load_config, resolve_config_path, ConfigSource, ResolvedConfig};
pub use validate::{validate_config, ValidationError, ValidationResult};
