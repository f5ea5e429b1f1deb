//! Identity metadata sanitizer for reverse-engineering projects.
//!
//! This crate removes the metadata that ties an analysis project to the
//! analyst who created it: executable location, creator/tool/host records,
//! bookmarks, analysis settings and personal user properties.
//!
//! # Key Features
//!
//! - **Fault isolation**: every sanitize step runs independently. A host
//!   namespace that cannot be reached turns its step into a recorded skip
//!   while the remaining steps still run.
//! - **Fixed denylists**: the built-in identity keys are always removed; a
//!   policy can only add keys, never drop them.
//! - **Idempotent**: sanitizing an already sanitized project changes nothing.
//! - **No disk I/O**: the sanitizer only mutates the live project object.
//!   Persisting the result is a separate, explicit step.
//!
//! # Example
//!
//! ```no_run
//! use scrub_common::{JsonProject, TracingMonitor};
//! use scrub_redact::{SanitizePolicy, Sanitizer};
//!
//! let mut project = JsonProject::open("firmware.json").unwrap();
//! let sanitizer = Sanitizer::new(SanitizePolicy::default());
//! let report = sanitizer.sanitize(&mut project, Some(&TracingMonitor));
//! assert!(report.is_complete());
//! ```

pub mod error;
pub mod policy;
pub mod report;
pub mod sanitizer;

pub use error::{RedactionError, Result};
pub use policy::{
    SanitizePolicy, POLICY_SCHEMA_VERSION, PROGRAM_INFO_IDENTITY_KEYS,
    USER_PROPERTY_IDENTITY_KEYS,
};
pub use report::{SanitizeReport, SanitizeStep, StepOutcome, StepResult};
pub use sanitizer::{sanitize, Sanitizer};
