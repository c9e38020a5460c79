//! OpenAPI Preflight - pre-upload linter for API descriptions
//!
//! # Stages
//! 1. Load: file exists, size within limit, valid JSON
//! 2. Structural: required top-level fields
//! 3. Compatibility: constructs the platform drops (warnings only)
//! 4. Rule engine: external Spectral-compatible linter
//! 5. Report: merged findings, pass/fail, exit code

pub mod validation;
pub mod compat;
pub mod config;
pub mod loader;
pub mod engine;
pub mod pipeline;
pub mod report;

pub use validation::{DocumentRule, Finding, Severity, ValidationResult, Validator};
pub use config::{ConfigError, LintConfig};
pub use loader::{load_document, LoadError, LoadedDocument};
pub use engine::{EngineError, EngineReport, RuleEngine, SpectralEngine};
pub use pipeline::{LintPipeline, PipelineError};
pub use report::{render, Outcome, ReportFormat};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DEFAULT_MAX_SIZE_KB: f64 = 500.0;
pub const MAX_WARNINGS_SHOWN: usize = 5;
