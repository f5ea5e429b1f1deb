//! projscrub core library.
//!
//! Wires the sanitizer and tree exporter into one pipeline and provides the
//! pieces the `projscrub` binary is built from:
//! - `pipeline`: sanitize → persist → export, plus read-only inspection
//! - `prompt`: terminal and preset prompters
//! - `logging`: tracing subscriber setup, stages and event names
//! - `exit_codes`: the stable process exit codes

pub mod exit_codes;
pub mod logging;
pub mod pipeline;
pub mod prompt;

pub use exit_codes::ExitCode;
pub use pipeline::{
    inspect, open_project, InspectReport, Pipeline, PipelineError, RunOutcome, RunSummary,
    SanitizeSummary, DESTINATION_PROMPT,
};
pub use prompt::{require_terminal, PresetPrompter, TerminalPrompter};
