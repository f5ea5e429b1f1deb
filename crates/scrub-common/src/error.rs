//! Errors raised by a host environment implementation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for host operations.
pub type Result<T> = std::result::Result<T, HostError>;

/// Errors that can occur while talking to the host environment.
#[derive(Error, Debug)]
pub enum HostError {
    /// No project exists at the given location.
    #[error("no project found at {path}")]
    ProjectNotFound { path: PathBuf },

    /// I/O error while reading the backing store.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing store is not a valid project document.
    #[error("invalid project document {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The document was written by an incompatible version.
    #[error("unsupported project schema: expected {expected}, got {actual}")]
    UnsupportedSchema { expected: String, actual: String },

    /// An option namespace or the bookmark subsystem could not be reached.
    #[error("namespace unavailable: {0}")]
    NamespaceUnavailable(String),

    /// A bookmark disappeared between listing and removal.
    #[error("bookmark {id} not found in category '{category}'")]
    BookmarkNotFound { category: String, id: u64 },

    /// Writing the project back to its backing store failed.
    #[error("failed to persist project to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
