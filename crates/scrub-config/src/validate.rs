//! Configuration validation errors and semantic validation.

use crate::{ProjscrubConfig, CONFIG_SCHEMA_VERSION};
use scrub_redact::POLICY_SCHEMA_VERSION;
use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate a configuration semantically.
pub fn validate_config(config: &ProjscrubConfig) -> ValidationResult<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }
    if config.sanitize.schema_version != POLICY_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: POLICY_SCHEMA_VERSION.to_string(),
            actual: config.sanitize.schema_version.clone(),
        });
    }

    validate_suffix(&config.export.suffix)?;
    validate_keys(
        "sanitize.extra_program_info_keys",
        &config.sanitize.extra_program_info_keys,
    )?;
    validate_keys(
        "sanitize.extra_user_property_keys",
        &config.sanitize.extra_user_property_keys,
    )?;
    Ok(())
}

fn validate_suffix(suffix: &str) -> ValidationResult<()> {
    let message = if suffix.is_empty() {
        Some("must not be empty")
    } else if suffix.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if suffix.contains('\0') {
        Some("must not contain NUL")
    } else {
        None
    };
    match message {
        Some(message) => Err(ValidationError::InvalidValue {
            field: "export.suffix".to_string(),
            message: message.to_string(),
        }),
        None => Ok(()),
    }
}

fn validate_keys(field: &str, keys: &[String]) -> ValidationResult<()> {
    for (idx, key) in keys.iter().enumerate() {
        if key.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("{}[{}]", field, idx),
                message: "Must be a non-empty key".to_string(),
            });
        }
    }
    Ok(())
}
