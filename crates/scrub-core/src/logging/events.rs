//! Pipeline stages and event names.
//!
//! Every pipeline event is emitted inside a `run` span carrying `run_id` and
//! a `stage` span, so events from the sanitizer and exporter crates are
//! correlated without those crates knowing about runs.

use serde::{Deserialize, Serialize};

/// Processing stages in the projscrub pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup, configuration and project loading.
    Init,
    /// In-memory metadata redaction.
    Sanitize,
    /// Writing the sanitized project to its backing store.
    Persist,
    /// Tree replication into the destination.
    Export,
    /// Optional script bundle merge.
    Scripts,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Sanitize => "sanitize",
            Stage::Persist => "persist",
            Stage::Export => "export",
            Stage::Scripts => "scripts",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names, logged in the `event` field.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_CANCELLED: &str = "run.cancelled";
    pub const RUN_FINISHED: &str = "run.finished";
    pub const RUN_FAILED: &str = "run.failed";

    // Config/init events
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_ERROR: &str = "config.error";
    pub const PROJECT_OPENED: &str = "project.opened";
    pub const DESTINATION_SELECTED: &str = "destination.selected";

    // Stage events
    pub const SANITIZE_FINISHED: &str = "sanitize.finished";
    pub const PERSIST_FINISHED: &str = "persist.finished";
    pub const EXPORT_FINISHED: &str = "export.finished";
    pub const SCRIPTS_RESULT: &str = "scripts.result";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_serialization() {
        assert_eq!(serde_json::to_string(&Stage::Init).unwrap(), "\"init\"");
        assert_eq!(
            serde_json::to_string(&Stage::Sanitize).unwrap(),
            "\"sanitize\""
        );
        assert_eq!(Stage::Scripts.to_string(), "scripts");
    }
}
