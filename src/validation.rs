//! Validation System - Findings and Document Rules
//!
//! Rules produce findings.
//! The pipeline decides what blocks.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One reported issue. Built through the constructors; read through the fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Finding {
    pub path: String,
    pub message: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
}

impl Finding {
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, path, message)
    }

    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, path, message)
    }

    fn new(severity: Severity, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity,
            code: None,
            line: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_line(mut self, line: Option<u64>) -> Self {
        self.line = line;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Outcome of one stage, or of the whole run once merged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fatal: Option<String>,
    #[serde(rename = "sizeKB", default, skip_serializing_if = "Option::is_none")]
    pub size_kb: Option<f64>,
    #[serde(default)]
    pub errors: Vec<Finding>,
    #[serde(default)]
    pub warnings: Vec<Finding>,
}

impl ValidationResult {
    /// Split findings by severity. Success means no errors.
    pub fn from_findings(findings: Vec<Finding>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            findings.into_iter().partition(Finding::is_error);
        Self {
            success: errors.is_empty(),
            fatal: None,
            size_kb: None,
            errors,
            warnings,
        }
    }

    /// A fatal result never carries findings.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            success: false,
            fatal: Some(message.into()),
            size_kb: None,
            errors: vec![],
            warnings: vec![],
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal.is_some()
    }

    /// Append another stage. Success survives only if both stages succeeded.
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.success = self.success && other.success;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self
    }
}

/// A check that runs against the parsed document.
pub trait DocumentRule {
    fn name(&self) -> &'static str;
    fn check(&self, document: &Value) -> Vec<Finding>;
}

/// Loose presence test: null, false, 0 and "" count as absent.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

// --- Structural Rules ---

pub struct OpenApiFieldRule;

impl DocumentRule for OpenApiFieldRule {
    fn name(&self) -> &'static str { "openapi-field-required" }

    fn check(&self, document: &Value) -> Vec<Finding> {
        if is_truthy(document.get("openapi")) {
            return vec![];
        }
        vec![Finding::error(
            "$.openapi",
            "The OpenAPI document must have an openapi field.",
        )
        .with_code(self.name())]
    }
}

pub struct InfoTitleRule;

impl DocumentRule for InfoTitleRule {
    fn name(&self) -> &'static str { "info-title-required" }

    fn check(&self, document: &Value) -> Vec<Finding> {
        let title = document.get("info").and_then(|info| info.get("title"));
        if is_truthy(title) {
            return vec![];
        }
        vec![Finding::error(
            "$.info.title",
            "The OpenAPI document must have a title under info -> title.",
        )
        .with_code(self.name())]
    }
}

/// Validator runs an ordered set of rules as one stage
pub struct Validator {
    rules: Vec<Box<dyn DocumentRule>>,
}

impl Validator {
    pub fn new(rules: Vec<Box<dyn DocumentRule>>) -> Self {
        Self { rules }
    }

    /// Required top-level fields.
    pub fn structural() -> Self {
        Self::new(vec![
            Box::new(OpenApiFieldRule),
            Box::new(InfoTitleRule),
        ])
    }

    pub fn validate(&self, document: &Value) -> ValidationResult {
        let mut all_findings = vec![];

        for rule in &self.rules {
            let findings = rule.check(document);
            tracing::trace!(rule = rule.name(), count = findings.len(), "rule checked");
            all_findings.extend(findings);
        }

        ValidationResult::from_findings(all_findings)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::structural()
    }
}
