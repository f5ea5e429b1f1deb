//! Optional script bundle merge.
//!
//! Only the direct files of the chosen directory are copied, flat, into
//! `scripts/`. Nothing here aborts an export: prompt or copy problems turn
//! into `ScriptOutcome::Skipped`.

use crate::copy::copy_file;
use scrub_common::Prompter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Subdirectory of the export that receives script files.
pub const SCRIPTS_DIR_NAME: &str = "scripts";

pub const INCLUDE_SCRIPTS_PROMPT: &str =
    "Do you want to include scripts in the sanitized project?";
pub const SCRIPT_DIRECTORY_PROMPT: &str = "Select Script Directory";

/// What happened to the script bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScriptOutcome {
    /// The user chose not to include scripts.
    Declined,
    /// Scripts were wanted but could not be merged.
    Skipped { reason: String },
    Copied {
        files: usize,
        /// Subdirectories of the bundle that were left out.
        skipped_dirs: usize,
    },
}

/// Ask whether to include scripts and, if so, merge the chosen directory.
pub fn offer_scripts(
    prompter: &mut dyn Prompter,
    export_root: &Path,
    preserve_metadata: bool,
) -> ScriptOutcome {
    match prompter.confirm(INCLUDE_SCRIPTS_PROMPT) {
        Ok(true) => {}
        Ok(false) => {
            debug!("Script transfer declined");
            return ScriptOutcome::Declined;
        }
        Err(e) => return skipped(e),
    }

    match prompter.choose_directory(SCRIPT_DIRECTORY_PROMPT) {
        Ok(Some(dir)) => merge_scripts(&dir, export_root, preserve_metadata),
        Ok(None) => skipped("no script directory selected"),
        Err(e) => skipped(e),
    }
}

/// Copy the direct files of `source` into `<export_root>/scripts`.
///
/// Links to regular files are copied by content; subdirectories and other
/// entries are counted and left out. The `scripts` directory is only
/// created once `source` has been read successfully.
pub fn merge_scripts(source: &Path, export_root: &Path, preserve_metadata: bool) -> ScriptOutcome {
    let entries = match fs::read_dir(source) {
        Ok(entries) => entries,
        Err(e) => return skipped(format!("cannot read {}: {}", source.display(), e)),
    };

    let mut files: Vec<PathBuf> = Vec::new();
    let mut skipped_dirs = 0;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => return skipped(format!("cannot read {}: {}", source.display(), e)),
        };
        let path = entry.path();
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => files.push(path),
            Ok(meta) if meta.is_dir() => skipped_dirs += 1,
            Ok(_) => debug!(path = %path.display(), "Non-file script entry ignored"),
            Err(e) => warn!(path = %path.display(), error = %e, "Script entry unreadable"),
        }
    }
    files.sort();

    let target_dir = export_root.join(SCRIPTS_DIR_NAME);
    if let Err(e) = fs::create_dir_all(&target_dir) {
        return skipped(format!("cannot create {}: {}", target_dir.display(), e));
    }

    let mut copied = 0;
    for file in &files {
        let Some(name) = file.file_name() else {
            continue;
        };
        match copy_file(file, &target_dir.join(name), preserve_metadata) {
            Ok(_) => copied += 1,
            Err(e) => warn!(path = %file.display(), error = %e, "Script not copied"),
        }
    }

    info!(files = copied, skipped_dirs, "Scripts merged");
    ScriptOutcome::Copied {
        files: copied,
        skipped_dirs,
    }
}

fn skipped(reason: impl std::fmt::Display) -> ScriptOutcome {
    warn!(reason = %reason, "Script transfer skipped");
    ScriptOutcome::Skipped {
        reason: reason.to_string(),
    }
}
