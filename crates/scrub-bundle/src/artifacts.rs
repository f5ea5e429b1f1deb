//! Repository artifacts re-copied after the generic tree copy.
//!
//! The `.rep` store and the `project.prp` descriptor are copied again over
//! whatever the tree copy produced, so they are complete in the export even
//! when the generic walk recorded per-entry failures. Both are optional.

use crate::copy::{copy_file, copy_tree, CopyOptions, PendingMetadata};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

/// Name of the project's internal data store directory.
pub const REPOSITORY_DIR_NAME: &str = ".rep";

/// Name of the project descriptor file.
pub const DESCRIPTOR_FILE_NAME: &str = "project.prp";

/// What happened to one optional artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtifactOutcome {
    Copied { files: usize, bytes: u64 },
    /// Not present at the source root.
    Absent,
    /// Present but could not be copied; the export continues.
    Failed { error: String },
}

impl ArtifactOutcome {
    pub fn is_copied(&self) -> bool {
        matches!(self, ArtifactOutcome::Copied { .. })
    }
}

/// Re-copy `<source_root>/.rep` into `<export_root>/.rep`, overwriting.
///
/// Directory metadata of the copy is added to `pending`.
pub fn recopy_repository(
    source_root: &Path,
    export_root: &Path,
    options: &CopyOptions,
    pending: &mut PendingMetadata,
) -> ArtifactOutcome {
    let src = source_root.join(REPOSITORY_DIR_NAME);
    match fs::symlink_metadata(&src) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return failed(REPOSITORY_DIR_NAME, "not a directory");
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(artifact = REPOSITORY_DIR_NAME, "Artifact absent");
            return ArtifactOutcome::Absent;
        }
        Err(e) => return failed(REPOSITORY_DIR_NAME, e),
    }

    let stats = match copy_tree(&src, &export_root.join(REPOSITORY_DIR_NAME), options) {
        Ok((stats, directories)) => {
            pending.merge(directories);
            stats
        }
        Err(e) => return failed(REPOSITORY_DIR_NAME, e),
    };
    if stats.failures.is_empty() {
        info!(
            artifact = REPOSITORY_DIR_NAME,
            files = stats.files,
            bytes = stats.bytes,
            "Artifact copied"
        );
        return ArtifactOutcome::Copied {
            files: stats.files,
            bytes: stats.bytes,
        };
    }
    let first = stats
        .failures
        .first()
        .map(|f| format!("{}: {}", f.path.display(), f.error))
        .unwrap_or_default();
    failed(
        REPOSITORY_DIR_NAME,
        format!("{} entries not copied (first: {})", stats.failures.len(), first),
    )
}

/// Re-copy `<source_root>/project.prp` into the export root, overwriting.
pub fn recopy_descriptor(
    source_root: &Path,
    export_root: &Path,
    preserve_metadata: bool,
) -> ArtifactOutcome {
    let src = source_root.join(DESCRIPTOR_FILE_NAME);
    match fs::symlink_metadata(&src) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return failed(DESCRIPTOR_FILE_NAME, "not a regular file"),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(artifact = DESCRIPTOR_FILE_NAME, "Artifact absent");
            return ArtifactOutcome::Absent;
        }
        Err(e) => return failed(DESCRIPTOR_FILE_NAME, e),
    }

    match copy_file(&src, &export_root.join(DESCRIPTOR_FILE_NAME), preserve_metadata) {
        Ok(bytes) => {
            info!(artifact = DESCRIPTOR_FILE_NAME, bytes, "Artifact copied");
            ArtifactOutcome::Copied { files: 1, bytes }
        }
        Err(e) => failed(DESCRIPTOR_FILE_NAME, e),
    }
}

fn failed(artifact: &str, error: impl std::fmt::Display) -> ArtifactOutcome {
    warn!(artifact, error = %error, "Artifact not copied");
    ArtifactOutcome::Failed {
        error: error.to_string(),
    }
}
