//! End-to-end CLI tests for projscrub.
//!
//! Each test runs the real binary against a temporary project directory with
//! configuration lookup pinned to an empty XDG directory.

use assert_cmd::Command;
use predicates::prelude::*;
use scrub_common::{Namespace, ProjectDocument};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    project_dir: TempDir,
    out_dir: TempDir,
    xdg_dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let project_dir = TempDir::new().unwrap();
        let root = project_dir.path();
        fs::write(root.join("program.db"), b"database").unwrap();
        fs::create_dir_all(root.join(".rep/idata")).unwrap();
        fs::write(root.join(".rep/idata/~index.dat"), b"index").unwrap();
        fs::write(root.join("project.prp"), b"OWNER=alice\n").unwrap();

        let mut doc = ProjectDocument::default();
        doc.executable_path = "/home/alice/fw.bin".to_string();
        doc.executable_format = "Raw Binary".to_string();
        doc.set_option(Namespace::ProgramInformation, "Created By", json!("alice"));
        doc.set_option(Namespace::ProgramInformation, "Comment", json!("keep"));
        doc.set_option(Namespace::UserProperties, "User Name", json!("alice"));
        fs::write(root.join("fw.json"), doc.to_json().unwrap()).unwrap();

        Self {
            project_dir,
            out_dir: TempDir::new().unwrap(),
            xdg_dir: TempDir::new().unwrap(),
        }
    }

    fn project(&self) -> PathBuf {
        self.project_dir.path().join("fw.json")
    }

    fn out(&self) -> &Path {
        self.out_dir.path()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("projscrub").expect("projscrub binary should exist");
        cmd.env_remove("PROJSCRUB_CONFIG")
            .env_remove("PROJSCRUB_LOG")
            .env_remove("RUST_LOG")
            .env("XDG_CONFIG_HOME", self.xdg_dir.path())
            .write_stdin("");
        cmd
    }
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ============================================================================
// Basic commands
// ============================================================================

#[test]
fn version_reports_package_version() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_exits_clean() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("--help")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("run"));
}

#[test]
fn unknown_command_is_args_error() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("nonexistent-command")
        .assert()
        .code(10)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn scripts_and_no_scripts_conflict() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["run", "--no-scripts", "--scripts", "/tmp"])
        .arg(fx.project())
        .assert()
        .code(10);
}

// ============================================================================
// run
// ============================================================================

#[test]
fn run_exports_sanitized_tree() {
    let fx = Fixture::new();
    let output = fx
        .cmd()
        .arg("run")
        .arg(fx.project())
        .arg("--dest")
        .arg(fx.out())
        .args(["--no-scripts", "--yes"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let json = stdout_json(&output);
    assert_eq!(json["status"], "completed");
    assert_eq!(json["result"]["project"], "fw");
    assert_eq!(json["result"]["export"]["scripts"]["status"], "declined");
    assert_eq!(json["result"]["export"]["repository"]["status"], "copied");

    let dest = fx.out().join("fw_sanitized");
    assert!(dest.join("program.db").is_file());
    assert!(dest.join(".rep/idata/~index.dat").is_file());
    assert_eq!(fs::read(dest.join("project.prp")).unwrap(), b"OWNER=alice\n");
    assert!(!dest.join("scripts").exists());

    let exported = fs::read_to_string(dest.join("fw.json")).unwrap();
    assert!(!exported.contains("alice"));
    assert!(exported.contains("keep"));

    // The source store was persisted sanitized as well.
    let source = fs::read_to_string(fx.project()).unwrap();
    assert!(!source.contains("alice"));
}

#[test]
fn run_with_scripts_merges_flat() {
    let fx = Fixture::new();
    let scripts = TempDir::new().unwrap();
    fs::write(scripts.path().join("a.py"), b"print(1)").unwrap();
    fs::create_dir_all(scripts.path().join("lib")).unwrap();
    fs::write(scripts.path().join("lib/b.py"), b"pass").unwrap();

    let output = fx
        .cmd()
        .arg("run")
        .arg(fx.project())
        .arg("--dest")
        .arg(fx.out())
        .arg("--scripts")
        .arg(scripts.path())
        .arg("--yes")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let json = stdout_json(&output);
    assert_eq!(json["result"]["export"]["scripts"]["status"], "copied");
    assert_eq!(json["result"]["export"]["scripts"]["files"], 1);
    assert_eq!(json["result"]["export"]["scripts"]["skipped_dirs"], 1);
    let dest = fx.out().join("fw_sanitized/scripts");
    assert!(dest.join("a.py").is_file());
    assert!(!dest.join("lib").exists());
}

#[test]
fn run_missing_project_is_no_project_error() {
    let fx = Fixture::new();
    let output = fx
        .cmd()
        .arg("run")
        .arg(fx.project_dir.path().join("missing.json"))
        .arg("--dest")
        .arg(fx.out())
        .arg("--yes")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(12));
    let json = stdout_json(&output);
    assert_eq!(json["error"]["code"], "ERR_NO_PROJECT");
    assert_eq!(fs::read_dir(fx.out()).unwrap().count(), 0);
}

#[test]
fn run_yes_without_dest_is_args_error() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("run")
        .arg(fx.project())
        .arg("--yes")
        .assert()
        .code(10)
        .stdout(predicate::str::contains("ERR_ARGS"));
}

#[test]
fn run_without_terminal_or_dest_is_environment_error() {
    let fx = Fixture::new();
    let before = fs::read(fx.project()).unwrap();

    fx.cmd()
        .arg("run")
        .arg(fx.project())
        .assert()
        .code(11)
        .stdout(predicate::str::contains("ERR_ENVIRONMENT"));

    assert_eq!(fs::read(fx.project()).unwrap(), before);
}

#[test]
fn run_existing_destination_fails_then_overwrite_replaces() {
    let fx = Fixture::new();
    let existing = fx.out().join("fw_sanitized");
    fs::create_dir_all(&existing).unwrap();
    fs::write(existing.join("stale.txt"), b"old").unwrap();

    fx.cmd()
        .arg("run")
        .arg(fx.project())
        .arg("--dest")
        .arg(fx.out())
        .args(["--no-scripts", "--yes"])
        .assert()
        .code(13)
        .stdout(predicate::str::contains("ERR_DESTINATION"));
    assert!(existing.join("stale.txt").exists());

    fx.cmd()
        .arg("run")
        .arg(fx.project())
        .arg("--dest")
        .arg(fx.out())
        .args(["--no-scripts", "--yes", "--overwrite"])
        .assert()
        .success();
    assert!(!existing.join("stale.txt").exists());
    assert!(existing.join("program.db").is_file());
}

#[test]
fn run_human_format_prints_summary() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["--format", "human", "run"])
        .arg(fx.project())
        .arg("--dest")
        .arg(fx.out())
        .args(["--no-scripts", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported to"))
        .stdout(predicate::str::contains("scripts: declined"));
}

// ============================================================================
// sanitize / inspect
// ============================================================================

#[test]
fn inspect_lists_identity_keys_without_values() {
    let fx = Fixture::new();
    let output = fx.cmd().arg("inspect").arg(fx.project()).output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    let json = stdout_json(&output);
    assert_eq!(json["executable_path_set"], true);
    assert_eq!(json["program_info_identity_keys"], json!(["Created By"]));
    assert_eq!(json["user_property_identity_keys"], json!(["User Name"]));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("alice"));
}

#[test]
fn sanitize_then_inspect_is_clean() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("sanitize")
        .arg(fx.project())
        .assert()
        .success()
        .stdout(predicate::str::contains("removed"));

    let output = fx.cmd().arg("inspect").arg(fx.project()).output().unwrap();
    let json = stdout_json(&output);
    assert_eq!(json["executable_path_set"], false);
    assert_eq!(json["program_info_identity_keys"], json!([]));
    assert_eq!(fs::read_dir(fx.out()).unwrap().count(), 0);
}

// ============================================================================
// config
// ============================================================================

#[test]
fn config_show_reports_builtin_defaults() {
    let fx = Fixture::new();
    let output = fx.cmd().args(["config", "show"]).output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    let json = stdout_json(&output);
    assert_eq!(json["source"], "builtin default");
    assert_eq!(json["config"]["export"]["suffix"], "_sanitized");
}

#[test]
fn config_validate_rejects_bad_file() {
    let fx = Fixture::new();
    let bad = fx.xdg_dir.path().join("bad.json");
    fs::write(&bad, "{ not json").unwrap();

    fx.cmd()
        .args(["config", "validate"])
        .arg(&bad)
        .assert()
        .code(14)
        .stdout(predicate::str::contains("ERR_CONFIG"));
}

#[test]
fn config_suffix_applies_to_run() {
    let fx = Fixture::new();
    let config = fx.xdg_dir.path().join("custom.json");
    fs::write(&config, r#"{"export": {"suffix": "_clean"}}"#).unwrap();

    fx.cmd()
        .arg("--config")
        .arg(&config)
        .arg("run")
        .arg(fx.project())
        .arg("--dest")
        .arg(fx.out())
        .args(["--no-scripts", "--yes"])
        .assert()
        .success();

    assert!(fx.out().join("fw_clean/program.db").is_file());
}

#[test]
fn config_env_path_missing_is_config_error() {
    let fx = Fixture::new();
    fx.cmd()
        .env("PROJSCRUB_CONFIG", fx.xdg_dir.path().join("absent.json"))
        .args(["config", "show"])
        .assert()
        .code(14);
}
