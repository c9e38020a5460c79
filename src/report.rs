//! Report Rendering - text and JSON output, exit codes

use std::path::Path;

use crate::validation::ValidationResult;
use crate::MAX_WARNINGS_SHOWN;

/// How a run ended. Maps one-to-one to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
    Fatal,
}

impl Outcome {
    pub fn of(result: &ValidationResult) -> Self {
        if result.is_fatal() {
            Self::Fatal
        } else if result.success {
            Self::Passed
        } else {
            Self::Failed
        }
    }

    pub fn exit_code(self) -> u8 {
        match self {
            Self::Passed => 0,
            Self::Failed => 1,
            Self::Fatal => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

pub fn render(
    result: &ValidationResult,
    document: &Path,
    max_size_kb: f64,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Json => render_json(result),
        ReportFormat::Text => Ok(render_text(result, document, max_size_kb)),
    }
}

pub fn render_json(result: &ValidationResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

pub fn render_text(result: &ValidationResult, document: &Path, max_size_kb: f64) -> String {
    let mut lines = vec![];
    let filename = document
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| document.display().to_string());

    lines.push(String::new());
    lines.push(format!("OpenAPI Preflight - {}", filename));
    lines.push("=".repeat(50));

    if let Some(size_kb) = result.size_kb {
        lines.push(format!("Size: {} KB (limit: ~{} KB)", size_kb, max_size_kb));
    }
    lines.push(String::new());

    if let Some(fatal) = &result.fatal {
        lines.push(format!("FATAL: {}", fatal));
        return lines.join("\n");
    }

    let error_count = result.errors.len();
    let warning_count = result.warnings.len();

    if error_count == 0 {
        lines.push("✓ PASSED - Ready for upload".to_string());
        if warning_count > 0 {
            lines.push(format!(
                "  ({} warning{} - optional to fix)",
                warning_count,
                plural(warning_count)
            ));
        }
    } else {
        lines.push(format!(
            "✗ FAILED - {} error{} must be fixed",
            error_count,
            plural(error_count)
        ));
    }
    lines.push(String::new());

    if error_count > 0 {
        lines.push("Errors:".to_string());
        lines.push("-".repeat(40));
        for err in &result.errors {
            lines.push(format!("✗ {}", err.message));
            if !err.path.is_empty() {
                lines.push(format!("  at: {}", err.path));
            }
            if let Some(code) = &err.code {
                lines.push(format!("  rule: {}", code));
            }
            lines.push(String::new());
        }
    }

    if warning_count > 0 {
        lines.push("Warnings (optional):".to_string());
        lines.push("-".repeat(40));
        for warn in result.warnings.iter().take(MAX_WARNINGS_SHOWN) {
            lines.push(format!("⚠ {}", warn.message));
            if !warn.path.is_empty() {
                lines.push(format!("  at: {}", warn.path));
            }
            lines.push(String::new());
        }
        if warning_count > MAX_WARNINGS_SHOWN {
            lines.push(format!(
                "  ... and {} more warnings",
                warning_count - MAX_WARNINGS_SHOWN
            ));
            lines.push(String::new());
        }
    }

    lines.join("\n")
}
