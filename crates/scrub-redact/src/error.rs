//! Error types for the sanitizer.

use thiserror::Error;

/// Result type for sanitizer operations.
pub type Result<T> = std::result::Result<T, RedactionError>;

/// Errors that can occur while loading or validating a sanitize policy.
///
/// Sanitizing itself never fails; per-step problems are recorded in the
/// `SanitizeReport` instead.
#[derive(Error, Debug)]
pub enum RedactionError {
    /// The policy is structurally valid but semantically wrong.
    #[error("policy error: {0}")]
    PolicyError(String),

    /// I/O error during policy file operations.
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}
