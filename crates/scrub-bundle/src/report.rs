//! Export report.

use crate::{ArtifactOutcome, CopyStats, ScriptOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Summary of a completed export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    /// Project name.
    pub project: String,

    /// Directory that was replicated.
    pub source_root: PathBuf,

    /// Final export location.
    pub destination: PathBuf,

    /// Generic tree copy counters.
    #[serde(flatten)]
    pub copy: CopyStats,

    /// `.rep` re-copy.
    pub repository: ArtifactOutcome,

    /// `project.prp` re-copy.
    pub descriptor: ArtifactOutcome,

    pub scripts: ScriptOutcome,

    /// Whether an existing destination was replaced.
    pub replaced_existing: bool,

    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,
}

impl ExportReport {
    /// Entries that could not be copied by the generic tree copy.
    pub fn failure_count(&self) -> usize {
        self.copy.failures.len()
    }

    /// Whether the export copied everything it attempted.
    pub fn is_clean(&self) -> bool {
        self.copy.failures.is_empty()
            && !matches!(self.repository, ArtifactOutcome::Failed { .. })
            && !matches!(self.descriptor, ArtifactOutcome::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_flat_counters() {
        let now = Utc::now();
        let report = ExportReport {
            project: "fw".to_string(),
            source_root: PathBuf::from("/work/fw"),
            destination: PathBuf::from("/tmp/out/fw_sanitized"),
            copy: CopyStats {
                files: 3,
                bytes: 42,
                ..CopyStats::default()
            },
            repository: ArtifactOutcome::Absent,
            descriptor: ArtifactOutcome::Copied { files: 1, bytes: 9 },
            scripts: ScriptOutcome::Declined,
            replaced_existing: false,
            started_at: now,
            finished_at: now,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["files"], 3);
        assert_eq!(json["bytes"], 42);
        assert_eq!(json["repository"]["status"], "absent");
        assert_eq!(json["scripts"]["status"], "declined");
        assert!(json.get("failures").is_none());
        assert!(report.is_clean());
    }
}
