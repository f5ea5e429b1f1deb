//! The sanitize → persist → export pipeline.
//!
//! Every operation takes the project explicitly. The destination is chosen
//! before anything is mutated, so a cancelled or headless run leaves the
//! project untouched.

use crate::exit_codes::ExitCode;
use crate::logging::{event_names, Stage};
use scrub_bundle::{persist, BundleError, ExportOptions, ExportReport, PersistReceipt, TreeExporter};
use scrub_common::{HostError, JsonProject, Namespace, Project, PromptError, Prompter, TracingMonitor};
use scrub_config::{ProjscrubConfig, ValidationError};
use scrub_redact::{SanitizePolicy, SanitizeReport, Sanitizer};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, info_span, warn};

/// Prompt used to pick the export base directory.
pub const DESTINATION_PROMPT: &str = "Select Destination Directory";

/// Errors that end a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Interactive input was needed but no terminal is available.
    #[error("interactive mode unavailable: {0}")]
    EnvironmentUnavailable(String),

    /// The project could not be loaded.
    #[error("no active project: {0}")]
    NoActiveProject(#[source] HostError),

    #[error("configuration error: {0}")]
    Config(#[from] ValidationError),

    #[error(transparent)]
    Export(#[from] BundleError),

    #[error("prompt failed: {0}")]
    Prompt(String),
}

impl From<PromptError> for PipelineError {
    fn from(error: PromptError) -> Self {
        match error {
            PromptError::Unavailable(reason) => PipelineError::EnvironmentUnavailable(reason),
            PromptError::Interaction(reason) => PipelineError::Prompt(reason),
        }
    }
}

impl PipelineError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            PipelineError::EnvironmentUnavailable(_) => ExitCode::EnvironmentUnavailable,
            PipelineError::NoActiveProject(_) => ExitCode::NoActiveProject,
            PipelineError::Config(_) => ExitCode::ConfigError,
            PipelineError::Prompt(_) => ExitCode::IoError,
            PipelineError::Export(e) => match e {
                BundleError::DestinationCreation { .. }
                | BundleError::DestinationExists { .. }
                | BundleError::InvalidProjectName(_) => ExitCode::DestinationError,
                BundleError::SourceMissing { .. } => ExitCode::NoActiveProject,
                BundleError::Persist(_) | BundleError::Io { .. } => ExitCode::IoError,
                BundleError::NotPersisted { .. } | BundleError::ReceiptMismatch { .. } => {
                    ExitCode::InternalError
                }
            },
        }
    }
}

/// Open a JSON-backed project.
pub fn open_project(path: &Path) -> Result<JsonProject, PipelineError> {
    let project = JsonProject::open(path).map_err(PipelineError::NoActiveProject)?;
    info!(
        event = event_names::PROJECT_OPENED,
        project = %project.name(),
        location = %project.backing_location().display(),
        "Project opened"
    );
    Ok(project)
}

/// Everything a completed run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub project: String,
    pub sanitize: SanitizeReport,
    pub persist: PersistReceipt,
    pub export: ExportReport,
}

/// How a run ended without error.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(Box<RunSummary>),
    /// The user made no selection; nothing was changed.
    Cancelled { reason: String },
}

/// Sanitize and persist output of the `sanitize` command.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizeSummary {
    pub run_id: String,
    pub sanitize: SanitizeReport,
    pub persist: PersistReceipt,
}

/// Runs the pipeline with one sanitize policy and one set of export options.
#[derive(Debug, Clone)]
pub struct Pipeline {
    sanitizer: Sanitizer,
    exporter: TreeExporter,
    run_id: String,
}

impl Pipeline {
    pub fn new(policy: SanitizePolicy, options: ExportOptions, run_id: impl Into<String>) -> Self {
        Self {
            sanitizer: Sanitizer::new(policy),
            exporter: TreeExporter::new(options),
            run_id: run_id.into(),
        }
    }

    pub fn from_config(config: &ProjscrubConfig, run_id: impl Into<String>) -> Self {
        Self::new(config.sanitize.clone(), config.export.clone(), run_id)
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Run sanitize, persist and export against `project`.
    ///
    /// When `destination` is `None` the base directory is requested from
    /// `prompter` first; no selection ends the run as `Cancelled`.
    pub fn run<P: Project + ?Sized>(
        &self,
        project: &mut P,
        destination: Option<&Path>,
        prompter: &mut dyn Prompter,
    ) -> Result<RunOutcome, PipelineError> {
        let _run = info_span!("run", run_id = %self.run_id).entered();
        info!(
            event = event_names::RUN_STARTED,
            project = %project.name(),
            "Starting sanitize and export"
        );

        let base = match self.choose_destination(destination, prompter)? {
            Some(base) => base,
            None => {
                let reason = "no destination directory selected".to_string();
                info!(event = event_names::RUN_CANCELLED, reason = %reason, "Run cancelled");
                return Ok(RunOutcome::Cancelled { reason });
            }
        };

        let (sanitize, receipt) = self.sanitize_and_persist_in_span(project)?;

        let export = {
            let _stage = info_span!("stage", stage = %Stage::Export).entered();
            self.exporter.export(&*project, &receipt, &base, prompter)?
        };
        {
            let _stage = info_span!("stage", stage = %Stage::Scripts).entered();
            info!(event = event_names::SCRIPTS_RESULT, scripts = ?export.scripts, "Script transfer");
        }
        info!(
            event = event_names::EXPORT_FINISHED,
            destination = %export.destination.display(),
            files = export.copy.files,
            failures = export.failure_count(),
            "Export finished"
        );
        info!(event = event_names::RUN_FINISHED, "Run finished");

        Ok(RunOutcome::Completed(Box::new(RunSummary {
            run_id: self.run_id.clone(),
            project: project.name().to_string(),
            sanitize,
            persist: receipt,
            export,
        })))
    }

    /// Sanitize and persist without exporting.
    pub fn sanitize_and_persist<P: Project + ?Sized>(
        &self,
        project: &mut P,
    ) -> Result<SanitizeSummary, PipelineError> {
        let _run = info_span!("run", run_id = %self.run_id).entered();
        let (sanitize, persist) = self.sanitize_and_persist_in_span(project)?;
        Ok(SanitizeSummary {
            run_id: self.run_id.clone(),
            sanitize,
            persist,
        })
    }

    fn sanitize_and_persist_in_span<P: Project + ?Sized>(
        &self,
        project: &mut P,
    ) -> Result<(SanitizeReport, PersistReceipt), PipelineError> {
        let report = {
            let _stage = info_span!("stage", stage = %Stage::Sanitize).entered();
            let report = self.sanitizer.sanitize(project, Some(&TracingMonitor));
            if !report.is_complete() {
                warn!(
                    incomplete = ?report.incomplete_steps(),
                    "Some sanitize steps did not apply"
                );
            }
            info!(
                event = event_names::SANITIZE_FINISHED,
                removed = report.removed_total(),
                "Sanitize finished"
            );
            report
        };

        let _stage = info_span!("stage", stage = %Stage::Persist).entered();
        let receipt = persist(project)?;
        info!(event = event_names::PERSIST_FINISHED, "Persist finished");
        Ok((report, receipt))
    }

    fn choose_destination(
        &self,
        destination: Option<&Path>,
        prompter: &mut dyn Prompter,
    ) -> Result<Option<PathBuf>, PipelineError> {
        let _stage = info_span!("stage", stage = %Stage::Init).entered();
        let chosen = match destination {
            Some(path) => Some(path.to_path_buf()),
            None => prompter.choose_directory(DESTINATION_PROMPT)?,
        };
        if let Some(path) = &chosen {
            info!(
                event = event_names::DESTINATION_SELECTED,
                base = %path.display(),
                "Destination selected"
            );
        }
        Ok(chosen)
    }
}

/// Identity-bearing data still present in a project.
///
/// Names and counts only; values are never reported.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InspectReport {
    pub project: String,
    pub executable_path_set: bool,
    pub executable_format_set: bool,
    pub program_info_identity_keys: Vec<String>,
    pub user_property_identity_keys: Vec<String>,
    /// `None` when the namespace is unavailable.
    pub analysis_options: Option<usize>,
    /// `None` when the bookmark manager is unavailable.
    pub bookmarks: Option<usize>,
}

impl InspectReport {
    /// Whether a sanitize pass would find nothing to remove.
    pub fn is_clean(&self) -> bool {
        !self.executable_path_set
            && !self.executable_format_set
            && self.program_info_identity_keys.is_empty()
            && self.user_property_identity_keys.is_empty()
            && self.analysis_options.unwrap_or(0) == 0
            && self.bookmarks.unwrap_or(0) == 0
    }
}

/// Report what `policy` would remove from `project` without changing it.
pub fn inspect<P: Project + ?Sized>(project: &mut P, policy: &SanitizePolicy) -> InspectReport {
    let mut report = InspectReport {
        project: project.name().to_string(),
        executable_path_set: !project.executable_path().is_empty(),
        executable_format_set: !project.executable_format().is_empty(),
        ..InspectReport::default()
    };

    let program_denylist = policy.program_info_denylist();
    report.program_info_identity_keys =
        matching_keys(project, Namespace::ProgramInformation, |k| {
            program_denylist.contains(k)
        })
        .unwrap_or_default();

    let user_denylist = policy.user_property_denylist();
    report.user_property_identity_keys =
        matching_keys(project, Namespace::UserProperties, |k| user_denylist.contains(k))
            .unwrap_or_default();

    report.analysis_options = matching_keys(project, Namespace::Analysis, |_| true).map(|k| k.len());

    report.bookmarks = project.bookmarks().and_then(|manager| {
        let categories = manager.list_categories(&TracingMonitor).ok()?;
        let mut total = 0;
        for category in categories {
            total += manager.list_bookmarks(&category).ok()?.len();
        }
        Some(total)
    });

    report
}

fn matching_keys<P, F>(project: &mut P, namespace: Namespace, selected: F) -> Option<Vec<String>>
where
    P: Project + ?Sized,
    F: Fn(&str) -> bool,
{
    let options = project.options(namespace).ok()?;
    let mut keys: Vec<String> = options.list_keys().into_iter().filter(|k| selected(k)).collect();
    keys.sort();
    Some(keys)
}
