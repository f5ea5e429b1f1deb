//! Recursive tree replication.
//!
//! Walks the source with `walkdir`, sorted by file name and without
//! following links. Per-entry failures are collected in `CopyStats` rather
//! than aborting the walk. Directory permissions and timestamps are not
//! applied by the walk: they are returned as `PendingMetadata` so the caller
//! can finish writing into the tree first.

use crate::{BundleError, Result, SymlinkPolicy};
use filetime::FileTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

/// Options for a single tree copy.
#[derive(Debug, Clone, Default)]
pub struct CopyOptions {
    pub symlinks: SymlinkPolicy,
    pub preserve_metadata: bool,
    /// Source paths (and everything below them) to leave out.
    pub exclude: Vec<PathBuf>,
}

/// An entry that could not be copied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Counters for a tree copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyStats {
    pub directories: usize,
    pub files: usize,
    pub bytes: u64,
    pub symlinks_skipped: usize,
    pub symlinks_copied: usize,
    pub symlinks_preserved: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<CopyFailure>,
}

/// Directory permissions and timestamps still to be applied.
///
/// A copied directory may be read-only at the source; applying that mode
/// early would block later writes into the staged tree.
#[derive(Debug, Default)]
pub struct PendingMetadata {
    directories: Vec<(PathBuf, PathBuf)>,
}

impl PendingMetadata {
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    /// Take over the entries of `other`.
    pub fn merge(&mut self, other: PendingMetadata) {
        self.directories.extend(other.directories);
    }

    /// Apply every entry, deepest target first, recording failures in `stats`.
    pub fn apply(mut self, stats: &mut CopyStats) {
        self.directories.sort_by(|(_, a), (_, b)| {
            b.components()
                .count()
                .cmp(&a.components().count())
                .then_with(|| a.cmp(b))
        });
        self.directories.dedup_by(|a, b| a.1 == b.1);
        for (source_dir, target_dir) in &self.directories {
            if let Err(e) = apply_metadata(source_dir, target_dir) {
                stats.fail(source_dir, e);
            }
        }
        debug!(directories = self.directories.len(), "Directory metadata applied");
    }
}

impl CopyStats {
    fn fail(&mut self, path: &Path, error: impl std::fmt::Display) {
        warn!(path = %path.display(), error = %error, "Entry not copied");
        self.failures.push(CopyFailure {
            path: path.to_path_buf(),
            error: error.to_string(),
        });
    }
}

/// Replicate the contents of `src` into `dst`.
///
/// `dst` is created if missing; existing files at target paths are replaced.
/// Only a failure to create `dst` itself is returned as an error. With
/// `preserve_metadata` the directory metadata (including `dst`'s) is left
/// for the caller to apply.
pub fn copy_tree(
    src: &Path,
    dst: &Path,
    options: &CopyOptions,
) -> Result<(CopyStats, PendingMetadata)> {
    fs::create_dir_all(dst).map_err(|source| BundleError::DestinationCreation {
        path: dst.to_path_buf(),
        source,
    })?;

    let mut stats = CopyStats::default();
    let mut directories: Vec<(PathBuf, PathBuf)> = vec![(src.to_path_buf(), dst.to_path_buf())];

    let walker = WalkDir::new(src)
        .follow_links(false)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !options.exclude.iter().any(|ex| entry.path().starts_with(ex)));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| src.to_path_buf());
                stats.fail(&path, &e);
                continue;
            }
        };
        let Ok(relative) = entry.path().strip_prefix(src) else {
            stats.fail(entry.path(), "entry outside source root");
            continue;
        };
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            match fs::create_dir_all(&target) {
                Ok(()) => {
                    stats.directories += 1;
                    directories.push((entry.path().to_path_buf(), target));
                }
                Err(e) => stats.fail(entry.path(), e),
            }
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target, options, &mut stats);
        } else {
            match copy_file(entry.path(), &target, options.preserve_metadata) {
                Ok(bytes) => {
                    trace!(path = %relative.display(), bytes, "File copied");
                    stats.files += 1;
                    stats.bytes += bytes;
                }
                Err(e) => stats.fail(entry.path(), e),
            }
        }
    }

    let mut pending = PendingMetadata::default();
    if options.preserve_metadata {
        pending.directories = directories;
    }

    debug!(
        src = %src.display(),
        dst = %dst.display(),
        directories = stats.directories,
        files = stats.files,
        bytes = stats.bytes,
        failures = stats.failures.len(),
        "Tree copied"
    );
    Ok((stats, pending))
}

/// Copy one regular file, replacing whatever is at `dst`.
///
/// Permissions always travel with `fs::copy`; timestamps only when
/// `preserve_metadata` is set. Returns the number of bytes copied.
pub fn copy_file(src: &Path, dst: &Path, preserve_metadata: bool) -> std::io::Result<u64> {
    remove_existing(dst)?;
    let bytes = fs::copy(src, dst)?;
    if preserve_metadata {
        let meta = fs::metadata(src)?;
        filetime::set_file_times(
            dst,
            FileTime::from_last_access_time(&meta),
            FileTime::from_last_modification_time(&meta),
        )?;
    }
    Ok(bytes)
}

fn copy_symlink(src: &Path, dst: &Path, options: &CopyOptions, stats: &mut CopyStats) {
    match options.symlinks {
        SymlinkPolicy::Skip => {
            debug!(path = %src.display(), "Symlink skipped");
            stats.symlinks_skipped += 1;
        }
        SymlinkPolicy::Copy => match fs::metadata(src) {
            Ok(meta) if meta.is_file() => match copy_file(src, dst, options.preserve_metadata) {
                Ok(bytes) => {
                    stats.symlinks_copied += 1;
                    stats.files += 1;
                    stats.bytes += bytes;
                }
                Err(e) => stats.fail(src, e),
            },
            _ => {
                debug!(path = %src.display(), "Symlink target is not a regular file; skipped");
                stats.symlinks_skipped += 1;
            }
        },
        SymlinkPolicy::Preserve => match recreate_symlink(src, dst) {
            Ok(true) => stats.symlinks_preserved += 1,
            Ok(false) => stats.symlinks_skipped += 1,
            Err(e) => stats.fail(src, e),
        },
    }
}

#[cfg(unix)]
fn recreate_symlink(src: &Path, dst: &Path) -> std::io::Result<bool> {
    let target = fs::read_link(src)?;
    remove_existing(dst)?;
    std::os::unix::fs::symlink(target, dst)?;
    Ok(true)
}

#[cfg(not(unix))]
fn recreate_symlink(src: &Path, _dst: &Path) -> std::io::Result<bool> {
    debug!(path = %src.display(), "Symlinks cannot be preserved on this platform; skipped");
    Ok(false)
}

fn remove_existing(path: &Path) -> std::io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => remove_tree(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Remove a directory tree, making read-only directories writable first.
pub(crate) fn remove_tree(path: &Path) -> std::io::Result<()> {
    for entry in WalkDir::new(path).follow_links(false) {
        let Ok(entry) = entry else {
            continue;
        };
        if entry.file_type().is_dir() {
            if let Err(e) = make_owner_writable(entry.path()) {
                debug!(path = %entry.path().display(), error = %e, "Directory left read-only");
            }
        }
    }
    fs::remove_dir_all(path)
}

#[cfg(unix)]
fn make_owner_writable(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(dir)?.permissions();
    let mode = perms.mode();
    if mode & 0o700 != 0o700 {
        perms.set_mode(mode | 0o700);
        fs::set_permissions(dir, perms)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn make_owner_writable(dir: &Path) -> std::io::Result<()> {
    let mut perms = fs::metadata(dir)?.permissions();
    if perms.readonly() {
        perms.set_readonly(false);
        fs::set_permissions(dir, perms)?;
    }
    Ok(())
}

fn apply_metadata(src: &Path, dst: &Path) -> std::io::Result<()> {
    let meta = fs::metadata(src)?;
    fs::set_permissions(dst, meta.permissions())?;
    filetime::set_file_times(
        dst,
        FileTime::from_last_access_time(&meta),
        FileTime::from_last_modification_time(&meta),
    )
}
