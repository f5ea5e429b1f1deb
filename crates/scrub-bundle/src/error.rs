//! Error types for export operations.

use scrub_common::HostError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during persist and export.
///
/// Only failures that prevent producing a destination are errors. Problems
/// with individual entries, optional artifacts or scripts are recorded in
/// the `ExportReport` instead.
#[derive(Error, Debug)]
pub enum BundleError {
    /// The destination (or its staging area) could not be created.
    #[error("cannot create destination {path}: {source}")]
    DestinationCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination already exists and the policy forbids replacing it.
    #[error("destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    /// The project has in-memory changes that were never persisted.
    #[error("project '{project}' has unpersisted changes; persist before export")]
    NotPersisted { project: String },

    /// The receipt was issued for another project.
    #[error("persist receipt is for '{receipt}', not '{project}'")]
    ReceiptMismatch { receipt: String, project: String },

    /// Writing the project to its backing store failed.
    #[error("persist failed: {0}")]
    Persist(#[from] HostError),

    /// The project name cannot be used as a directory name.
    #[error("invalid project name for export: '{0}'")]
    InvalidProjectName(String),

    /// The project's backing store has no readable containing directory.
    #[error("project directory not found: {path}")]
    SourceMissing { path: PathBuf },

    /// I/O error outside the per-entry copy loop.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, BundleError>;
