//! Sanitized project tree exporter for projscrub.
//!
//! This crate produces a standalone copy of a project directory after its
//! metadata has been sanitized and persisted.
//!
//! # Export Layout
//!
//! ```text
//! <base>/<name>_sanitized/
//!   <mirrored project directory tree>
//!   .rep/          (re-copied if present in the source)
//!   project.prp    (re-copied if present in the source)
//!   scripts/       (only when the user opts in)
//! ```
//!
//! # Guarantees
//!
//! - Export requires a `PersistReceipt` and refuses dirty projects, so the
//!   copied backing store always holds the sanitized state.
//! - The tree is assembled in a hidden staging directory and renamed into
//!   place; a fatal failure leaves no partial destination behind.
//! - Traversal is sorted by file name and never follows symlinks.
//!
//! # Example
//!
//! ```no_run
//! use scrub_bundle::{persist, ExportOptions, TreeExporter};
//! use scrub_common::{JsonProject, ScriptedPrompter};
//! use std::path::Path;
//!
//! let mut project = JsonProject::open("work/firmware/firmware.json").unwrap();
//! let receipt = persist(&mut project).unwrap();
//! let mut prompter = ScriptedPrompter::new().with_confirmation(false);
//! let report = TreeExporter::new(ExportOptions::default())
//!     .export(&project, &receipt, Path::new("/tmp/out"), &mut prompter)
//!     .unwrap();
//! println!("exported to {}", report.destination.display());
//! ```

pub mod artifacts;
pub mod copy;
pub mod error;
pub mod exporter;
pub mod options;
pub mod receipt;
pub mod report;
pub mod scripts;
pub mod staging;

pub use artifacts::{ArtifactOutcome, DESCRIPTOR_FILE_NAME, REPOSITORY_DIR_NAME};
pub use copy::{copy_tree, CopyFailure, CopyOptions, CopyStats, PendingMetadata};
pub use error::{BundleError, Result};
pub use exporter::TreeExporter;
pub use options::{ExistingPolicy, ExportOptions, SymlinkPolicy, DEFAULT_SUFFIX};
pub use receipt::{persist, PersistReceipt};
pub use report::ExportReport;
pub use scripts::{
    ScriptOutcome, INCLUDE_SCRIPTS_PROMPT, SCRIPTS_DIR_NAME, SCRIPT_DIRECTORY_PROMPT,
};
