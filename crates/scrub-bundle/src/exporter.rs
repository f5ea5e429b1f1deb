//! Tree exporter.

use crate::artifacts::{recopy_descriptor, recopy_repository};
use crate::copy::{copy_tree, CopyOptions};
use crate::scripts::offer_scripts;
use crate::staging::StagingDir;
use crate::{BundleError, ExistingPolicy, ExportOptions, ExportReport, PersistReceipt, Result};
use chrono::Utc;
use scrub_common::{Project, Prompter};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Exports a persisted project directory to `<base>/<name><suffix>`.
#[derive(Debug, Clone, Default)]
pub struct TreeExporter {
    options: ExportOptions,
}

impl TreeExporter {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Destination directory for `project_name` under `base`.
    pub fn destination_for(&self, base: &Path, project_name: &str) -> Result<PathBuf> {
        validate_name(project_name)?;
        Ok(base.join(format!("{}{}", project_name, self.options.suffix)))
    }

    /// Export the project's directory tree.
    ///
    /// Requires a receipt for the current state of `project`. The tree is
    /// assembled in a staging directory beside the destination and renamed
    /// into place; on any error returned here the staging directory is gone
    /// and an existing destination is untouched.
    pub fn export<P: Project + ?Sized>(
        &self,
        project: &P,
        receipt: &PersistReceipt,
        base: &Path,
        prompter: &mut dyn Prompter,
    ) -> Result<ExportReport> {
        let started_at = Utc::now();
        receipt.verify(project)?;

        let name = project.name();
        validate_name(name)?;
        let source_root = resolve_source_root(project)?;

        fs::create_dir_all(base).map_err(|source| BundleError::DestinationCreation {
            path: base.to_path_buf(),
            source,
        })?;
        let base = base
            .canonicalize()
            .map_err(|source| BundleError::DestinationCreation {
                path: base.to_path_buf(),
                source,
            })?;
        let destination = self.destination_for(&base, name)?;

        // Checked again at publish; failing here avoids a pointless copy.
        if self.options.on_existing == ExistingPolicy::Fail && destination.exists() {
            return Err(BundleError::DestinationExists { path: destination });
        }

        info!(
            project = %name,
            source = %source_root.display(),
            destination = %destination.display(),
            "Exporting project tree"
        );

        let staging = StagingDir::create(&destination)?;
        let copy_options = CopyOptions {
            symlinks: self.options.symlinks,
            preserve_metadata: self.options.preserve_metadata,
            // The destination may live inside the project directory.
            exclude: vec![staging.path().to_path_buf(), destination.clone()],
        };

        let (mut copy, mut pending) = copy_tree(&source_root, staging.path(), &copy_options)?;
        let repository =
            recopy_repository(&source_root, staging.path(), &copy_options, &mut pending);
        let descriptor =
            recopy_descriptor(&source_root, staging.path(), self.options.preserve_metadata);
        let scripts = offer_scripts(prompter, staging.path(), self.options.preserve_metadata);
        // Nothing is written into the staged tree after this point.
        pending.apply(&mut copy);
        debug!(staging = %staging.path().display(), "Staged export complete");

        let replaced_existing = staging.publish(&destination, self.options.on_existing)?;

        let report = ExportReport {
            project: name.to_string(),
            source_root,
            destination,
            copy,
            repository,
            descriptor,
            scripts,
            replaced_existing,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            project = %report.project,
            destination = %report.destination.display(),
            files = report.copy.files,
            directories = report.copy.directories,
            bytes = report.copy.bytes,
            failures = report.failure_count(),
            replaced = report.replaced_existing,
            "Export finished"
        );
        Ok(report)
    }
}

fn validate_name(name: &str) -> Result<()> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0');
    if invalid {
        return Err(BundleError::InvalidProjectName(name.to_string()));
    }
    Ok(())
}

fn resolve_source_root<P: Project + ?Sized>(project: &P) -> Result<PathBuf> {
    let location = project.backing_location();
    let dir = match project.project_dir() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        Some(_) => PathBuf::from("."),
        None => {
            return Err(BundleError::SourceMissing {
                path: location.to_path_buf(),
            })
        }
    };
    match dir.canonicalize() {
        Ok(root) if root.is_dir() => Ok(root),
        _ => Err(BundleError::SourceMissing { path: dir }),
    }
}
