//! Rule Engine Adapter - schema and style rules from an external linter
//!
//! The engine is a collaborator behind `RuleEngine`. The shipped
//! implementation shells out to a Spectral-compatible CLI.

use serde::Deserialize;
use serde_json::Value;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::Command;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::validation::{Finding, ValidationResult};

/// Shell and `npx` status for "command not found".
const EXIT_COMMAND_NOT_FOUND: i32 = 127;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Spectral not installed. Run: npm install -g @stoplight/spectral-cli")]
    NotInstalled,

    #[error("Failed to run Spectral: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Spectral failed (exit status {}): {detail}", .status.map_or("unknown".to_string(), |c| c.to_string()))]
    Failed { status: Option<i32>, detail: String },

    #[error("Failed to prepare bundled ruleset: {0}")]
    Ruleset(#[source] std::io::Error),
}

/// Findings reported by the engine, already split by severity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineReport {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl EngineReport {
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

impl From<EngineReport> for ValidationResult {
    fn from(report: EngineReport) -> Self {
        ValidationResult {
            success: report.success(),
            fatal: None,
            size_kb: None,
            errors: report.errors,
            warnings: report.warnings,
        }
    }
}

/// Lints a document on disk against a rule-definition file.
pub trait RuleEngine {
    fn lint(&self, document: &Path, ruleset: &Path) -> Result<EngineReport, EngineError>;
}

/// One result object in the engine's JSON output.
#[derive(Debug, Deserialize)]
struct EngineResult {
    severity: i64,
    #[serde(default)]
    path: Option<Vec<Value>>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    range: Option<EngineRange>,
}

#[derive(Debug, Deserialize)]
struct EngineRange {
    #[serde(default)]
    start: Option<EnginePosition>,
}

#[derive(Debug, Deserialize)]
struct EnginePosition {
    #[serde(default)]
    line: Option<u64>,
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl EngineResult {
    fn into_finding(self) -> Option<Finding> {
        let path = self
            .path
            .unwrap_or_default()
            .iter()
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join(".");
        let message = self.message.unwrap_or_default();
        let finding = match self.severity {
            0 => Finding::error(path, message),
            1 => Finding::warning(path, message),
            _ => return None,
        };
        let finding = match self.code.as_ref() {
            Some(code) if !code.is_null() => finding.with_code(scalar_text(code)),
            _ => finding,
        };
        let line = self.range.and_then(|r| r.start).and_then(|start| start.line);
        Some(finding.with_line(line))
    }
}

/// Parse the engine's JSON array. Empty output means no findings.
///
/// Elements are decoded one at a time; a malformed element is skipped
/// without discarding the rest.
pub fn parse_engine_output(stdout: &str) -> Result<EngineReport, serde_json::Error> {
    let mut report = EngineReport::default();
    if stdout.trim().is_empty() {
        return Ok(report);
    }

    let results: Vec<Value> = serde_json::from_str(stdout)?;
    for (index, raw) in results.into_iter().enumerate() {
        let result = match serde_json::from_value::<EngineResult>(raw) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed rule engine result");
                continue;
            }
        };
        let Some(finding) = result.into_finding() else { continue };
        if finding.is_error() {
            report.errors.push(finding);
        } else {
            report.warnings.push(finding);
        }
    }
    Ok(report)
}

/// Rule definitions compiled into the binary, used when no ruleset is configured.
pub const BUNDLED_RULESET: &str = include_str!("../rulesets/preflight.spectral.yaml");

/// Write the bundled ruleset to a temp file that lives as long as the handle.
pub fn write_bundled_ruleset() -> Result<NamedTempFile, EngineError> {
    let mut file = tempfile::Builder::new()
        .prefix("preflight-ruleset-")
        .suffix(".yaml")
        .tempfile()
        .map_err(EngineError::Ruleset)?;
    file.write_all(BUNDLED_RULESET.as_bytes()).map_err(EngineError::Ruleset)?;
    file.flush().map_err(EngineError::Ruleset)?;
    Ok(file)
}

/// Spawns a Spectral-compatible CLI and waits for it.
pub struct SpectralEngine {
    program: String,
    base_args: Vec<String>,
}

impl SpectralEngine {
    /// `command` is the program followed by any leading arguments.
    pub fn new(command: &[String]) -> Self {
        let (program, base_args) = match command.split_first() {
            Some((program, rest)) => (program.clone(), rest.to_vec()),
            None => ("spectral".to_string(), vec![]),
        };
        Self { program, base_args }
    }
}

/// 0 = clean, 1 = findings at fail severity. Anything else is a failed run.
fn is_lint_status(code: Option<i32>) -> bool {
    matches!(code, Some(0) | Some(1))
}

fn excerpt(stderr: &str) -> String {
    let trimmed = stderr.trim();
    match trimmed.lines().next() {
        Some(first) => first.to_string(),
        None => "no output".to_string(),
    }
}

impl RuleEngine for SpectralEngine {
    fn lint(&self, document: &Path, ruleset: &Path) -> Result<EngineReport, EngineError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.base_args)
            .arg("lint")
            .arg(document)
            .arg("--ruleset")
            .arg(ruleset)
            .args(["--format", "json"]);

        tracing::debug!(program = %self.program, args = ?self.base_args, "spawning rule engine");

        let output = cmd.output().map_err(|e| match e.kind() {
            ErrorKind::NotFound => EngineError::NotInstalled,
            _ => EngineError::Spawn(e),
        })?;

        let status = output.status.code();
        if status == Some(EXIT_COMMAND_NOT_FOUND) {
            return Err(EngineError::NotInstalled);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if stdout.trim().is_empty() && !is_lint_status(status) {
            tracing::warn!(?status, stderr = %stderr.trim(), "rule engine failed without output");
            return Err(EngineError::Failed { status, detail: excerpt(&stderr) });
        }

        match parse_engine_output(&stdout) {
            Ok(report) => {
                tracing::debug!(
                    errors = report.errors.len(),
                    warnings = report.warnings.len(),
                    ?status,
                    "rule engine finished"
                );
                Ok(report)
            }
            Err(e) if !is_lint_status(status) => {
                tracing::warn!(?status, error = %e, stderr = %stderr.trim(), "rule engine failed");
                Err(EngineError::Failed { status, detail: excerpt(&stderr) })
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    stderr = %stderr.trim(),
                    "rule engine output was not JSON; treating as no findings"
                );
                Ok(EngineReport::default())
            }
        }
    }
}
