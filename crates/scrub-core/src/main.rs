//! projscrub - sanitize analysis project metadata and export a shareable copy
//!
//! The main entry point, handling:
//! - The interactive sanitize → persist → export run
//! - Stand-alone sanitize and read-only inspection
//! - Configuration display and validation

use clap::{Args, Parser, Subcommand};
use scrub_bundle::{ArtifactOutcome, ExistingPolicy, ScriptOutcome, SymlinkPolicy};
use scrub_common::OutputFormat;
use scrub_config::{load_config, ResolvedConfig, ValidationError, CONFIG_SCHEMA_VERSION};
use scrub_core::logging::{event_names, generate_run_id, init_logging, LogConfig, LogLevel};
use scrub_core::{
    inspect, open_project, require_terminal, ExitCode, InspectReport, Pipeline, PipelineError,
    PresetPrompter, RunOutcome, RunSummary, SanitizeSummary, TerminalPrompter,
};
use serde::Serialize;
use std::path::PathBuf;

/// projscrub - redact identity metadata from an analysis project and export it
#[derive(Parser)]
#[command(name = "projscrub")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to config.json (defaults to $PROJSCRUB_CONFIG, then the XDG config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sanitize, persist and export a project
    Run(RunArgs),

    /// Sanitize and persist a project in place, without exporting
    Sanitize(ProjectArgs),

    /// List identity-bearing metadata still present (read-only)
    Inspect(ProjectArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Project backing file
    project: PathBuf,

    /// Export base directory (skips the destination prompt)
    #[arg(long)]
    dest: Option<PathBuf>,

    /// Include the direct files of this directory under scripts/
    #[arg(long, conflicts_with = "no_scripts")]
    scripts: Option<PathBuf>,

    /// Do not include scripts
    #[arg(long)]
    no_scripts: bool,

    /// Replace an existing destination
    #[arg(long)]
    overwrite: bool,

    /// Symlink handling: skip, copy or preserve
    #[arg(long)]
    symlinks: Option<SymlinkPolicy>,

    /// Never prompt (requires --dest)
    #[arg(long, short = 'y')]
    yes: bool,
}

#[derive(Args, Debug)]
struct ProjectArgs {
    /// Project backing file
    project: PathBuf,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the resolved configuration
    Show,

    /// Validate a configuration file (defaults to the resolved one)
    Validate {
        /// Path to config.json
        path: Option<PathBuf>,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            let _ = e.print();
            std::process::exit(code.as_i32());
        }
    };

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        match cli.global.verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    };
    init_logging(&LogConfig::from_env(cli_level, None));

    let exit_code = match &cli.command {
        Commands::Run(args) => run_pipeline(&cli.global, args),
        Commands::Sanitize(args) => run_sanitize(&cli.global, args),
        Commands::Inspect(args) => run_inspect(&cli.global, args),
        Commands::Config(args) => run_config(&cli.global, args),
        Commands::Version => {
            print_version(&cli.global);
            ExitCode::Clean
        }
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_pipeline(global: &GlobalOpts, args: &RunArgs) -> ExitCode {
    if args.yes && args.dest.is_none() {
        return output_usage_error(global, "--yes requires --dest");
    }
    // Checked before anything is loaded or mutated.
    if args.dest.is_none() {
        if let Err(e) = require_terminal() {
            return output_error(global, &PipelineError::from(e));
        }
    }

    let resolved = match resolve_config(global) {
        Ok(resolved) => resolved,
        Err(code) => return code,
    };
    let mut config = resolved.config;
    if args.overwrite {
        config.export.on_existing = ExistingPolicy::Overwrite;
    }
    if let Some(policy) = args.symlinks {
        config.export.symlinks = policy;
    }

    let mut project = match open_project(&args.project) {
        Ok(project) => project,
        Err(e) => return output_error(global, &e),
    };

    let mut prompter = PresetPrompter::new();
    if let Some(dir) = &args.scripts {
        prompter = prompter.with_scripts(Some(dir.clone()));
    } else if args.no_scripts || args.yes {
        prompter = prompter.with_scripts(None);
    }
    if !args.yes {
        if let Ok(terminal) = TerminalPrompter::new() {
            prompter = prompter.with_fallback(Box::new(terminal));
        }
    }

    let pipeline = Pipeline::from_config(&config, generate_run_id());
    match pipeline.run(&mut project, args.dest.as_deref(), &mut prompter) {
        Ok(RunOutcome::Completed(summary)) => output_run(global, &summary),
        Ok(RunOutcome::Cancelled { reason }) => output_cancelled(global, pipeline.run_id(), &reason),
        Err(e) => {
            tracing::error!(event = event_names::RUN_FAILED, error = %e, "Run failed");
            output_error(global, &e)
        }
    }
}

fn run_sanitize(global: &GlobalOpts, args: &ProjectArgs) -> ExitCode {
    let resolved = match resolve_config(global) {
        Ok(resolved) => resolved,
        Err(code) => return code,
    };
    let mut project = match open_project(&args.project) {
        Ok(project) => project,
        Err(e) => return output_error(global, &e),
    };

    let pipeline = Pipeline::from_config(&resolved.config, generate_run_id());
    match pipeline.sanitize_and_persist(&mut project) {
        Ok(summary) => output_sanitize(global, &summary),
        Err(e) => output_error(global, &e),
    }
}

fn run_inspect(global: &GlobalOpts, args: &ProjectArgs) -> ExitCode {
    let resolved = match resolve_config(global) {
        Ok(resolved) => resolved,
        Err(code) => return code,
    };
    let mut project = match open_project(&args.project) {
        Ok(project) => project,
        Err(e) => return output_error(global, &e),
    };

    let report = inspect(&mut project, &resolved.config.sanitize);
    match global.format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Human => {
            print_inspect_human(&report);
            ExitCode::Clean
        }
    }
}

fn run_config(global: &GlobalOpts, args: &ConfigArgs) -> ExitCode {
    match &args.command {
        ConfigCommands::Show => {
            let resolved = match resolve_config(global) {
                Ok(resolved) => resolved,
                Err(code) => return code,
            };
            let response = serde_json::json!({
                "source": resolved.source.to_string(),
                "path": resolved.path.as_ref().map(|p| p.display().to_string()),
                "config": &resolved.config,
            });
            match global.format {
                OutputFormat::Json => print_json(&response),
                OutputFormat::Human => {
                    println!("source: {}", resolved.source);
                    if let Some(path) = &resolved.path {
                        println!("path: {}", path.display());
                    }
                    println!("on_existing: {}", resolved.config.export.on_existing);
                    println!("symlinks: {}", resolved.config.export.symlinks);
                    println!(
                        "preserve_metadata: {}",
                        resolved.config.export.preserve_metadata
                    );
                    println!("suffix: {}", resolved.config.export.suffix);
                    ExitCode::Clean
                }
            }
        }
        ConfigCommands::Validate { path } => {
            let path = path.as_deref().or(global.config.as_deref());
            match load_config(path) {
                Ok(resolved) => {
                    let response = serde_json::json!({
                        "valid": true,
                        "source": resolved.source.to_string(),
                        "path": resolved.path.as_ref().map(|p| p.display().to_string()),
                    });
                    match global.format {
                        OutputFormat::Json => print_json(&response),
                        OutputFormat::Human => {
                            println!("configuration valid ({})", resolved.source);
                            ExitCode::Clean
                        }
                    }
                }
                Err(e) => output_config_error(global, &e),
            }
        }
    }
}

fn resolve_config(global: &GlobalOpts) -> Result<ResolvedConfig, ExitCode> {
    match load_config(global.config.as_deref()) {
        Ok(resolved) => {
            tracing::debug!(
                event = event_names::CONFIG_LOADED,
                source = %resolved.source,
                "Configuration resolved"
            );
            Ok(resolved)
        }
        Err(e) => Err(output_config_error(global, &e)),
    }
}

fn print_version(global: &GlobalOpts) {
    let version_info = serde_json::json!({
        "projscrub_version": env!("CARGO_PKG_VERSION"),
        "config_schema_version": CONFIG_SCHEMA_VERSION,
        "rust_version": env!("CARGO_PKG_RUST_VERSION"),
    });

    match global.format {
        OutputFormat::Json => {
            print_json(&version_info);
        }
        OutputFormat::Human => {
            println!("projscrub {}", env!("CARGO_PKG_VERSION"));
            println!("config schema version: {}", CONFIG_SCHEMA_VERSION);
        }
    }
}

// ============================================================================
// Output helpers
// ============================================================================

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::Clean
        }
        Err(e) => {
            eprintln!("projscrub: failed to serialize output: {}", e);
            ExitCode::InternalError
        }
    }
}

fn output_run(global: &GlobalOpts, summary: &RunSummary) -> ExitCode {
    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "status": "completed",
                "result": summary,
            });
            print_json(&response)
        }
        OutputFormat::Human => {
            let export = &summary.export;
            println!(
                "Sanitized {}: {} records removed",
                summary.project,
                summary.sanitize.removed_total()
            );
            for step in summary.sanitize.incomplete_steps() {
                println!("  step not applied: {}", step);
            }
            println!("Exported to {}", export.destination.display());
            println!(
                "  {} files, {} directories, {} bytes",
                export.copy.files, export.copy.directories, export.copy.bytes
            );
            if export.failure_count() > 0 {
                println!("  {} entries could not be copied", export.failure_count());
            }
            println!("  .rep: {}", artifact_label(&export.repository));
            println!("  project.prp: {}", artifact_label(&export.descriptor));
            println!("  scripts: {}", script_label(&export.scripts));
            ExitCode::Clean
        }
    }
}

fn output_sanitize(global: &GlobalOpts, summary: &SanitizeSummary) -> ExitCode {
    match global.format {
        OutputFormat::Json => print_json(summary),
        OutputFormat::Human => {
            println!(
                "Sanitized {}: {} records removed",
                summary.sanitize.project,
                summary.sanitize.removed_total()
            );
            for result in &summary.sanitize.steps {
                println!("  {}: {} removed", result.step, result.outcome.removed());
            }
            ExitCode::Clean
        }
    }
}

fn output_cancelled(global: &GlobalOpts, run_id: &str, reason: &str) -> ExitCode {
    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "status": "cancelled",
                "run_id": run_id,
                "reason": reason,
            });
            print_json(&response);
        }
        OutputFormat::Human => println!("Cancelled: {}", reason),
    }
    ExitCode::Cancelled
}

fn print_inspect_human(report: &InspectReport) {
    println!("Project {}", report.project);
    println!("  executable path set: {}", report.executable_path_set);
    println!("  executable format set: {}", report.executable_format_set);
    println!(
        "  program information identity keys: {}",
        list_or_none(&report.program_info_identity_keys)
    );
    println!(
        "  user property identity keys: {}",
        list_or_none(&report.user_property_identity_keys)
    );
    println!("  analysis options: {}", count_label(report.analysis_options));
    println!("  bookmarks: {}", count_label(report.bookmarks));
    if report.is_clean() {
        println!("  clean");
    }
}

fn output_error(global: &GlobalOpts, error: &PipelineError) -> ExitCode {
    emit_error(global, error.exit_code(), &error.to_string())
}

fn output_config_error(global: &GlobalOpts, error: &ValidationError) -> ExitCode {
    tracing::error!(
        event = event_names::CONFIG_ERROR,
        code = error.code(),
        error = %error,
        "Configuration error"
    );
    emit_error(
        global,
        ExitCode::ConfigError,
        &format!("configuration error: {}", error),
    )
}

fn output_usage_error(global: &GlobalOpts, message: &str) -> ExitCode {
    emit_error(global, ExitCode::ArgsError, message)
}

fn emit_error(global: &GlobalOpts, code: ExitCode, message: &str) -> ExitCode {
    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "status": "error",
                "error": {
                    "code": code.code_name(),
                    "exit_code": code.as_i32(),
                    "message": message,
                },
            });
            print_json(&response);
        }
        OutputFormat::Human => eprintln!("projscrub: {}", message),
    }
    code
}

fn artifact_label(outcome: &ArtifactOutcome) -> String {
    match outcome {
        ArtifactOutcome::Copied { files, bytes } => {
            format!("copied ({} files, {} bytes)", files, bytes)
        }
        ArtifactOutcome::Absent => "absent".to_string(),
        ArtifactOutcome::Failed { error } => format!("failed ({})", error),
    }
}

fn script_label(outcome: &ScriptOutcome) -> String {
    match outcome {
        ScriptOutcome::Declined => "declined".to_string(),
        ScriptOutcome::Skipped { reason } => format!("skipped ({})", reason),
        ScriptOutcome::Copied {
            files,
            skipped_dirs,
        } => format!("{} files ({} subdirectories left out)", files, skipped_dirs),
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn count_label(count: Option<usize>) -> String {
    match count {
        Some(n) => n.to_string(),
        None => "unavailable".to_string(),
    }
}
