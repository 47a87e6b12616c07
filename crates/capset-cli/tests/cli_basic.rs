//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a temporary definitions file and
//! config, and verify outputs.

use indoc::indoc;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

const DEFINITIONS: &str = indoc! {r#"
    [[activity]]
    id = "a"
    name = "Activity A"
    default_enabled = true

    [[activity]]
    id = "b"
    name = "Activity B"
    default_enabled = false

    [[activity]]
    id = "c"
    name = "Activity C"
    default_enabled = true
    forced = true

    [[category]]
    id = "x"
    name = "Category X"
    activities = ["a", "b"]

    [[category]]
    id = "y"
    name = "Category Y"
    activities = ["c"]

    [[category]]
    id = "hidden"
    name = "Empty"
    activities = []
"#};

struct Fixture {
    _dir: TempDir,
    defs: PathBuf,
    config: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let defs = dir.path().join("defs.toml");
    std::fs::write(&defs, DEFINITIONS).unwrap();
    let config = dir.path().join("config.toml");
    Fixture {
        _dir: dir,
        defs,
        config,
    }
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(fx: &Fixture, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_capset-cli"))
        .arg("--config")
        .arg(&fx.config)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn defs_arg(fx: &Fixture) -> String {
    fx.defs.display().to_string()
}

#[test]
fn test_categories_hide_empty_and_mark_locks() {
    let fx = fixture();
    let defs = defs_arg(&fx);
    let (stdout, _, code) = run_cli(&fx, &["categories", "--defs", &defs]);
    assert_eq!(code, 0);
    assert!(stdout.contains("[ ] x - Category X"));
    assert!(stdout.contains("[x] y - Category Y (locked)"));
    assert!(!stdout.contains("hidden"));
}

#[test]
fn test_categories_json() {
    let fx = fixture();
    let defs = defs_arg(&fx);
    let (stdout, _, code) = run_cli(&fx, &["categories", "--defs", &defs, "--json"]);
    assert_eq!(code, 0);
    let rows: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["id"], "y");
    assert_eq!(rows[1]["locked"], true);
}

#[test]
fn test_apply_vetoes_locked_uncheck_and_commits() {
    let fx = fixture();
    let defs = defs_arg(&fx);
    let (stdout, _, code) = run_cli(
        &fx,
        &[
            "apply",
            "disable-all",
            "check:x",
            "uncheck:y",
            "--defs",
            &defs,
            "--enabled",
            "",
            "--json",
        ],
    );
    assert_eq!(code, 0);
    let out: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(out["vetoes"][0]["category"], "y");
    assert_eq!(out["enabled"], serde_json::json!(["a", "b"]));
    assert_eq!(out["event"]["old"], serde_json::json!([]));
}

#[test]
fn test_apply_without_changes() {
    let fx = fixture();
    let defs = defs_arg(&fx);
    let (stdout, _, code) = run_cli(&fx, &["apply", "reset", "--defs", &defs]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No changes to commit"));
    assert!(stdout.contains("Enabled: a, c"));

    let (stdout, _, code) = run_cli(&fx, &["apply", "reset", "--defs", &defs, "--json"]);
    assert_eq!(code, 0);
    let out: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(out["changed"], false);
    assert_eq!(out["event"]["old"], out["event"]["new"]);
}

#[test]
fn test_advanced_ops_require_config_flag() {
    let fx = fixture();
    let defs = defs_arg(&fx);
    let (_, stderr, code) = run_cli(&fx, &["apply", "on:b", "--defs", &defs]);
    assert_ne!(code, 0);
    assert!(stderr.contains("page.allow_advanced"));

    let (_, _, code) = run_cli(&fx, &["config", "set", "page.allow_advanced", "true"]);
    assert_eq!(code, 0);
    let (stdout, _, code) = run_cli(&fx, &["apply", "on:b", "--defs", &defs]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Enabled: a, b, c"));
}

#[test]
fn test_related_reports_unknown_category() {
    let fx = fixture();
    let defs = defs_arg(&fx);
    let (_, stderr, code) = run_cli(&fx, &["related", "nope", "--defs", &defs]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown category: nope"));
}

#[test]
fn test_config_get_set_roundtrip() {
    let fx = fixture();
    let (stdout, _, code) = run_cli(&fx, &["config", "get", "enablement.category_policy"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "all");

    let (_, _, code) = run_cli(&fx, &["config", "set", "enablement.category_policy", "any"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(&fx, &["config", "get", "enablement.category_policy"]);
    assert_eq!(stdout.trim(), "any");

    let (_, _, code) = run_cli(&fx, &["config", "set", "page.nope", "1"]);
    assert_ne!(code, 0);
}
