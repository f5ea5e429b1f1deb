//! Staging directory with rename-based publish.
//!
//! The export is assembled in `<base>/.<dest-name>.staging-<uuid>` and only
//! renamed onto the destination once complete. Dropping an unpublished
//! staging directory removes it.

use crate::copy::remove_tree;
use crate::{BundleError, ExistingPolicy, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
    published: bool,
}

impl StagingDir {
    /// Create a fresh staging directory next to `destination`.
    pub fn create(destination: &Path) -> Result<Self> {
        let path = sibling(destination, "staging")?;
        fs::create_dir(&path).map_err(|source| BundleError::DestinationCreation {
            path: path.clone(),
            source,
        })?;
        debug!(staging = %path.display(), "Staging directory created");
        Ok(Self {
            path,
            published: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move the staged tree onto `destination`.
    ///
    /// Returns whether an existing destination was replaced. With
    /// `ExistingPolicy::Overwrite` the old destination is moved aside first
    /// and restored if the final rename fails.
    pub fn publish(mut self, destination: &Path, policy: ExistingPolicy) -> Result<bool> {
        let exists = match fs::symlink_metadata(destination) {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(source) => {
                return Err(BundleError::Io {
                    path: destination.to_path_buf(),
                    source,
                })
            }
        };

        if !exists {
            self.rename_onto(destination)?;
            return Ok(false);
        }
        if policy == ExistingPolicy::Fail {
            return Err(BundleError::DestinationExists {
                path: destination.to_path_buf(),
            });
        }

        let backup = sibling(destination, "previous")?;
        fs::rename(destination, &backup).map_err(|source| BundleError::Io {
            path: destination.to_path_buf(),
            source,
        })?;
        if let Err(e) = self.rename_onto(destination) {
            if let Err(restore) = fs::rename(&backup, destination) {
                warn!(
                    backup = %backup.display(),
                    error = %restore,
                    "Previous destination could not be restored"
                );
            }
            return Err(e);
        }
        if let Err(e) = remove_entry(&backup) {
            warn!(backup = %backup.display(), error = %e, "Previous destination not removed");
        }
        Ok(true)
    }

    fn rename_onto(&mut self, destination: &Path) -> Result<()> {
        fs::rename(&self.path, destination).map_err(|source| BundleError::DestinationCreation {
            path: destination.to_path_buf(),
            source,
        })?;
        self.published = true;
        debug!(destination = %destination.display(), "Staging directory published");
        Ok(())
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if self.published {
            return;
        }
        if let Err(e) = remove_tree(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                warn!(staging = %self.path.display(), error = %e, "Staging directory not removed");
            }
        }
    }
}

fn sibling(destination: &Path, tag: &str) -> Result<PathBuf> {
    let (Some(parent), Some(name)) = (destination.parent(), destination.file_name()) else {
        return Err(BundleError::InvalidProjectName(
            destination.display().to_string(),
        ));
    };
    Ok(parent.join(format!(
        ".{}.{}-{}",
        name.to_string_lossy(),
        tag,
        Uuid::new_v4().simple()
    )))
}

fn remove_entry(path: &Path) -> std::io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        remove_tree(path)
    } else {
        fs::remove_file(path)
    }
}
