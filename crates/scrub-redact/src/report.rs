//! Sanitize report types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The independent steps of a sanitize pass, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanitizeStep {
    /// Clear executable path and format.
    ExecutableInfo,
    /// Remove identity keys from `Program Information`.
    ProgramInformation,
    /// Remove every bookmark.
    Bookmarks,
    /// Wipe the `Analysis` namespace.
    Analysis,
    /// Remove personal keys from `User Properties`.
    UserProperties,
}

impl SanitizeStep {
    pub const ALL: [SanitizeStep; 5] = [
        SanitizeStep::ExecutableInfo,
        SanitizeStep::ProgramInformation,
        SanitizeStep::Bookmarks,
        SanitizeStep::Analysis,
        SanitizeStep::UserProperties,
    ];
}

impl std::fmt::Display for SanitizeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SanitizeStep::ExecutableInfo => "executable_info",
            SanitizeStep::ProgramInformation => "program_information",
            SanitizeStep::Bookmarks => "bookmarks",
            SanitizeStep::Analysis => "analysis",
            SanitizeStep::UserProperties => "user_properties",
        };
        write!(f, "{}", s)
    }
}

/// What happened to one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The step ran; `removed` records were cleared.
    Applied { removed: usize },
    /// The host subsystem was unavailable; nothing was touched.
    Skipped { reason: String },
    /// The step started but the host reported an error.
    Failed { removed: usize, error: String },
}

impl StepOutcome {
    /// Records removed by this step.
    pub fn removed(&self) -> usize {
        match self {
            StepOutcome::Applied { removed } | StepOutcome::Failed { removed, .. } => *removed,
            StepOutcome::Skipped { .. } => 0,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, StepOutcome::Applied { .. })
    }
}

/// Outcome of a single step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub step: SanitizeStep,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Result of a sanitize pass over one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizeReport {
    /// Project name.
    pub project: String,

    /// Per-step results in execution order.
    pub steps: Vec<StepResult>,

    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,
}

impl SanitizeReport {
    pub(crate) fn new(project: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            project: project.into(),
            steps: Vec::with_capacity(SanitizeStep::ALL.len()),
            started_at: now,
            finished_at: now,
        }
    }

    pub(crate) fn record(&mut self, step: SanitizeStep, outcome: StepOutcome) {
        self.steps.push(StepResult { step, outcome });
    }

    pub(crate) fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    /// Outcome of `step`, if it was recorded.
    pub fn outcome(&self, step: SanitizeStep) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|r| r.step == step)
            .map(|r| &r.outcome)
    }

    /// Total records removed across all steps.
    pub fn removed_total(&self) -> usize {
        self.steps.iter().map(|r| r.outcome.removed()).sum()
    }

    /// Steps that did not fully apply.
    pub fn incomplete_steps(&self) -> Vec<SanitizeStep> {
        self.steps
            .iter()
            .filter(|r| !r.outcome.is_applied())
            .map(|r| r.step)
            .collect()
    }

    /// Whether every step applied.
    pub fn is_complete(&self) -> bool {
        self.steps.len() == SanitizeStep::ALL.len() && self.incomplete_steps().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization() {
        let result = StepResult {
            step: SanitizeStep::Bookmarks,
            outcome: StepOutcome::Skipped {
                reason: "no monitor".to_string(),
            },
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["step"], "bookmarks");
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "no monitor");
    }

    #[test]
    fn test_report_totals() {
        let mut report = SanitizeReport::new("fw");
        report.record(SanitizeStep::ExecutableInfo, StepOutcome::Applied { removed: 2 });
        report.record(
            SanitizeStep::Analysis,
            StepOutcome::Failed {
                removed: 3,
                error: "boom".to_string(),
            },
        );
        let report = report.finish();

        assert_eq!(report.removed_total(), 5);
        assert_eq!(report.incomplete_steps(), vec![SanitizeStep::Analysis]);
        assert!(!report.is_complete());
        assert!(report.outcome(SanitizeStep::Bookmarks).is_none());
    }
}
