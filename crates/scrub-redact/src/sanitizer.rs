//! The metadata sanitizer.
//!
//! Applies the sanitize policy to a live project. Each step is attempted on
//! its own; a host error in one step is recorded and logged, and the next
//! step still runs. Option values are never logged, only keys and counts.

use crate::{SanitizePolicy, SanitizeReport, SanitizeStep, StepOutcome};
use scrub_common::{HostError, Namespace, Project, TaskMonitor};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Sanitize `project` with the default policy.
pub fn sanitize<P: Project + ?Sized>(
    project: &mut P,
    monitor: Option<&dyn TaskMonitor>,
) -> SanitizeReport {
    Sanitizer::default().sanitize(project, monitor)
}

/// Applies a `SanitizePolicy` to projects.
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    policy: SanitizePolicy,
}

impl Sanitizer {
    /// Create a sanitizer with the given policy.
    pub fn new(policy: SanitizePolicy) -> Self {
        Self { policy }
    }

    /// Run every sanitize step against `project`.
    ///
    /// Never fails. Steps that could not run are reported as skipped or
    /// failed in the returned report. The bookmark step needs `monitor`;
    /// without one it is skipped.
    pub fn sanitize<P: Project + ?Sized>(
        &self,
        project: &mut P,
        monitor: Option<&dyn TaskMonitor>,
    ) -> SanitizeReport {
        let mut report = SanitizeReport::new(project.name());
        info!(project = %project.name(), "Sanitizing project");

        let outcome = clear_executable_info(project);
        self.record(&mut report, SanitizeStep::ExecutableInfo, outcome);

        let denylist = self.policy.program_info_denylist();
        let outcome = remove_keys(project, Namespace::ProgramInformation, |key| {
            denylist.contains(key)
        });
        self.record(&mut report, SanitizeStep::ProgramInformation, outcome);

        let outcome = clear_bookmarks(project, monitor);
        self.record(&mut report, SanitizeStep::Bookmarks, outcome);

        let outcome = remove_keys(project, Namespace::Analysis, |_| true);
        self.record(&mut report, SanitizeStep::Analysis, outcome);

        let denylist: BTreeSet<&str> = self.policy.user_property_denylist();
        let outcome = remove_keys(project, Namespace::UserProperties, |key| {
            denylist.contains(key)
        });
        self.record(&mut report, SanitizeStep::UserProperties, outcome);

        let report = report.finish();
        info!(
            project = %report.project,
            removed = report.removed_total(),
            incomplete = report.incomplete_steps().len(),
            "Sanitization finished"
        );
        report
    }

    fn record(&self, report: &mut SanitizeReport, step: SanitizeStep, outcome: StepOutcome) {
        match &outcome {
            StepOutcome::Applied { removed } => {
                debug!(step = %step, removed, "Sanitize step applied");
            }
            StepOutcome::Skipped { reason } => {
                warn!(step = %step, reason = %reason, "Sanitize step skipped");
            }
            StepOutcome::Failed { removed, error } => {
                warn!(step = %step, removed, error = %error, "Sanitize step failed");
            }
        }
        report.record(step, outcome);
    }
}

fn clear_executable_info<P: Project + ?Sized>(project: &mut P) -> StepOutcome {
    let removed = [project.executable_path(), project.executable_format()]
        .iter()
        .filter(|value| !value.is_empty())
        .count();
    project.set_executable_path("");
    project.set_executable_format("");
    StepOutcome::Applied { removed }
}

/// Remove every key of `namespace` for which `selected` returns true.
fn remove_keys<P, F>(project: &mut P, namespace: Namespace, selected: F) -> StepOutcome
where
    P: Project + ?Sized,
    F: Fn(&str) -> bool,
{
    let mut options = match project.options(namespace) {
        Ok(options) => options,
        Err(e) => return unavailable(e),
    };

    let mut removed = 0;
    for key in options.list_keys() {
        if !selected(&key) {
            continue;
        }
        if let Err(e) = options.remove(&key) {
            return StepOutcome::Failed {
                removed,
                error: e.to_string(),
            };
        }
        debug!(namespace = %namespace, key = %key, "Option removed");
        removed += 1;
    }
    StepOutcome::Applied { removed }
}

fn clear_bookmarks<P: Project + ?Sized>(
    project: &mut P,
    monitor: Option<&dyn TaskMonitor>,
) -> StepOutcome {
    let Some(monitor) = monitor else {
        return StepOutcome::Skipped {
            reason: "task monitor unavailable".to_string(),
        };
    };
    let Some(mut manager) = project.bookmarks() else {
        return StepOutcome::Skipped {
            reason: "bookmark manager unavailable".to_string(),
        };
    };

    let categories = match manager.list_categories(monitor) {
        Ok(categories) => categories,
        Err(e) => return unavailable(e),
    };

    let mut removed = 0;
    for category in categories {
        let bookmarks = match manager.list_bookmarks(&category) {
            Ok(bookmarks) => bookmarks,
            Err(e) => {
                return StepOutcome::Failed {
                    removed,
                    error: e.to_string(),
                }
            }
        };
        for bookmark in &bookmarks {
            if let Err(e) = manager.remove(bookmark) {
                return StepOutcome::Failed {
                    removed,
                    error: e.to_string(),
                };
            }
            removed += 1;
        }
        debug!(category = %category, count = bookmarks.len(), "Bookmark category cleared");
    }
    StepOutcome::Applied { removed }
}

fn unavailable(error: HostError) -> StepOutcome {
    match error {
        HostError::NamespaceUnavailable(reason) => StepOutcome::Skipped { reason },
        other => StepOutcome::Failed {
            removed: 0,
            error: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrub_common::{
        BookmarkManager, BookmarkRecord, JsonProject, OptionNamespace, ProjectDocument,
        TracingMonitor,
    };
    use serde_json::json;
    use std::path::Path;

    fn sample_project() -> JsonProject {
        let mut doc = ProjectDocument::default();
        doc.executable_path = "/home/alice/fw.bin".to_string();
        doc.executable_format = "ELF".to_string();
        doc.set_option(Namespace::ProgramInformation, "Created By", json!("alice"));
        doc.set_option(Namespace::ProgramInformation, "Creator Hostname", json!("lab-7"));
        doc.set_option(Namespace::ProgramInformation, "Comment", json!("v2"));
        doc.set_option(Namespace::Analysis, "Decompiler Parameter ID", json!(true));
        doc.set_option(Namespace::Analysis, "Stack", json!({"depth": 3}));
        doc.set_option(Namespace::UserProperties, "User Email", json!("a@x.io"));
        doc.set_option(Namespace::UserProperties, "Favorite Color", json!("teal"));
        for (category, id) in [("Analysis", 1), ("Analysis", 2), ("Note", 7)] {
            doc.add_bookmark(
                category,
                BookmarkRecord {
                    id,
                    address: format!("0x{:x}", 0x401000 + id),
                    comment: String::new(),
                },
            );
        }
        JsonProject::with_document("/tmp/fw/fw.json", doc)
    }

    /// Wraps a project and hides selected host subsystems.
    struct DegradedProject {
        inner: JsonProject,
        missing: Vec<Namespace>,
        bookmarks: bool,
    }

    impl Project for DegradedProject {
        fn name(&self) -> &str {
            self.inner.name()
        }
        fn backing_location(&self) -> &Path {
            self.inner.backing_location()
        }
        fn executable_path(&self) -> &str {
            self.inner.executable_path()
        }
        fn executable_format(&self) -> &str {
            self.inner.executable_format()
        }
        fn set_executable_path(&mut self, path: &str) {
            self.inner.set_executable_path(path)
        }
        fn set_executable_format(&mut self, format: &str) {
            self.inner.set_executable_format(format)
        }
        fn options(
            &mut self,
            namespace: Namespace,
        ) -> scrub_common::Result<Box<dyn OptionNamespace + '_>> {
            if self.missing.contains(&namespace) {
                return Err(HostError::NamespaceUnavailable(namespace.to_string()));
            }
            self.inner.options(namespace)
        }
        fn bookmarks(&mut self) -> Option<Box<dyn BookmarkManager + '_>> {
            if self.bookmarks {
                self.inner.bookmarks()
            } else {
                None
            }
        }
        fn persist(&mut self) -> scrub_common::Result<()> {
            self.inner.persist()
        }
        fn is_dirty(&self) -> bool {
            self.inner.is_dirty()
        }
    }

    #[test]
    fn test_sanitize_clears_everything() {
        let mut project = sample_project();
        let report = sanitize(&mut project, Some(&TracingMonitor));

        assert!(report.is_complete());
        let doc = project.document();
        assert_eq!(doc.executable_path, "");
        assert_eq!(doc.executable_format, "");
        assert_eq!(
            doc.namespace(Namespace::ProgramInformation)
                .unwrap()
                .keys()
                .collect::<Vec<_>>(),
            vec!["Comment"]
        );
        assert!(doc.namespace(Namespace::Analysis).unwrap().is_empty());
        assert!(doc
            .option(Namespace::UserProperties, "Favorite Color")
            .is_some());
        assert!(doc.option(Namespace::UserProperties, "User Email").is_none());
        assert_eq!(doc.bookmark_count(), 0);
        assert!(project.is_dirty());
    }

    #[test]
    fn test_report_counts_per_step() {
        let mut project = sample_project();
        let report = sanitize(&mut project, Some(&TracingMonitor));

        let removed = |step| report.outcome(step).unwrap().removed();
        assert_eq!(removed(SanitizeStep::ExecutableInfo), 2);
        assert_eq!(removed(SanitizeStep::ProgramInformation), 2);
        assert_eq!(removed(SanitizeStep::Bookmarks), 3);
        assert_eq!(removed(SanitizeStep::Analysis), 2);
        assert_eq!(removed(SanitizeStep::UserProperties), 1);
        assert_eq!(report.removed_total(), 10);
    }

    #[test]
    fn test_missing_monitor_skips_bookmarks_only() {
        let mut project = sample_project();
        let report = sanitize(&mut project, None);

        assert!(matches!(
            report.outcome(SanitizeStep::Bookmarks),
            Some(StepOutcome::Skipped { .. })
        ));
        assert_eq!(report.incomplete_steps(), vec![SanitizeStep::Bookmarks]);
        assert_eq!(project.document().bookmark_count(), 3);
        assert!(project
            .document()
            .namespace(Namespace::Analysis)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_unavailable_namespace_does_not_block_others() {
        let mut project = DegradedProject {
            inner: sample_project(),
            missing: vec![Namespace::ProgramInformation],
            bookmarks: false,
        };
        let report = sanitize(&mut project, Some(&TracingMonitor));

        assert_eq!(
            report.incomplete_steps(),
            vec![SanitizeStep::ProgramInformation, SanitizeStep::Bookmarks]
        );
        let doc = project.inner.document();
        assert!(doc
            .option(Namespace::ProgramInformation, "Created By")
            .is_some());
        assert!(doc.namespace(Namespace::Analysis).unwrap().is_empty());
        assert!(doc.option(Namespace::UserProperties, "User Email").is_none());
        assert_eq!(doc.executable_path, "");
    }

    #[test]
    fn test_policy_extras_are_removed() {
        let mut project = sample_project();
        let policy = SanitizePolicy::new().with_user_property_key("Favorite Color");
        Sanitizer::new(policy).sanitize(&mut project, Some(&TracingMonitor));

        assert!(project
            .document()
            .namespace(Namespace::UserProperties)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_second_pass_removes_nothing() {
        let mut project = sample_project();
        sanitize(&mut project, Some(&TracingMonitor));
        let after_first = project.document().clone();

        let report = sanitize(&mut project, Some(&TracingMonitor));
        assert_eq!(report.removed_total(), 0);
        assert_eq!(project.document(), &after_first);
    }
}
