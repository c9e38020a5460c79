//! CLI Contract Tests
//!
//! Drive the built binary: usage, exit codes and the JSON report on stdout.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{json, Value};

const MINIMAL: &str = r#"{"openapi":"3.0.0","info":{"title":"T"},"paths":{}}"#;

fn preflight(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_openapi-preflight"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Config whose engine is a shell script standing in for Spectral.
fn write_config(dir: &Path, script: &str) -> PathBuf {
    let path = dir.join("preflight.json");
    let config = json!({"engineCommand": ["sh", "-c", script]});
    fs::write(&path, config.to_string()).unwrap();
    path
}

#[test]
fn bare_invocation_prints_usage() {
    let output = preflight(&[]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("Usage:"));
}

#[test]
fn help_flag_exits_zero() {
    let output = preflight(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("--json"));
}

#[test]
fn flags_without_path_exit_two() {
    let output = preflight(&["--json"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("Error: No spec file provided"));
    assert!(stdout_of(&output).is_empty());
}

#[test]
fn missing_file_reports_fatal_json() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    let output = preflight(&[missing.to_str().unwrap(), "--json"]);

    assert_eq!(output.status.code(), Some(2));
    let report: Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(report["success"], false);
    assert!(report["fatal"].as_str().unwrap().starts_with("File not found"));
    assert!(report.get("sizeKB").is_none());
}

#[test]
fn unreadable_config_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("spec.json");
    fs::write(&doc, MINIMAL).unwrap();
    let config = dir.path().join("nope.json");
    let output = preflight(&[doc.to_str().unwrap(), "--config", config.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("Failed to read config"));
}

#[cfg(unix)]
mod with_engine {
    use super::*;

    #[test]
    fn json_report_has_documented_shape() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("spec.json");
        fs::write(&doc, MINIMAL).unwrap();
        let config = write_config(
            dir.path(),
            r#"echo '[{"severity": 1, "path": ["info"], "message": "add contact", "code": "info-contact"}]'"#,
        );

        let output = preflight(&[doc.to_str().unwrap(), "--json", "--config", config.to_str().unwrap()]);

        assert_eq!(output.status.code(), Some(0));
        let report: Value = serde_json::from_str(&stdout_of(&output)).unwrap();
        assert_eq!(report["success"], true);
        assert!(report["sizeKB"].is_number());
        assert!(report.get("fatal").is_none());
        assert_eq!(report["errors"], json!([]));
        assert_eq!(report["warnings"][0]["path"], "info");
        assert_eq!(report["warnings"][0]["severity"], "warning");
        assert_eq!(report["warnings"][0]["code"], "info-contact");
    }

    #[test]
    fn engine_errors_exit_one() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("spec.json");
        fs::write(&doc, MINIMAL).unwrap();
        let config = write_config(
            dir.path(),
            r#"echo '[{"severity": 0, "path": ["paths"], "message": "real"}, {"severity": 1, "path": null, "message": "w"}]'; exit 1"#,
        );

        let output = preflight(&[doc.to_str().unwrap(), "--config", config.to_str().unwrap()]);

        assert_eq!(output.status.code(), Some(1));
        let text = stdout_of(&output);
        assert!(text.contains("✗ FAILED - 1 error must be fixed"));
        assert!(text.contains("✗ real"));
    }

    #[test]
    fn failed_engine_run_is_fatal_not_a_pass() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("spec.json");
        fs::write(&doc, MINIMAL).unwrap();
        let config = write_config(dir.path(), "echo 'Could not read ruleset' >&2; exit 2");

        let output = preflight(&[doc.to_str().unwrap(), "--config", config.to_str().unwrap()]);

        assert_eq!(output.status.code(), Some(2));
        let text = stdout_of(&output);
        assert!(text.contains("FATAL: Spectral failed (exit status 2): Could not read ruleset"));
        assert!(!text.contains("PASSED"));
    }

    #[test]
    fn bundled_ruleset_is_found_from_any_directory() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("spec.json");
        fs::write(&doc, MINIMAL).unwrap();
        // `sh -c script lint <doc> --ruleset <file> ...` puts the ruleset in $3.
        let config = write_config(
            dir.path(),
            r#"test -r "$3" || { echo "missing ruleset $3" >&2; exit 2; }; echo '[]'"#,
        );
        let elsewhere = tempfile::tempdir().unwrap();

        let output = Command::new(env!("CARGO_BIN_EXE_openapi-preflight"))
            .args([doc.to_str().unwrap(), "--config", config.to_str().unwrap()])
            .current_dir(elsewhere.path())
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr_of(&output));
        assert!(stdout_of(&output).contains("✓ PASSED"));
    }
}
