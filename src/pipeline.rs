//! Lint Pipeline - Single Entry Point
//!
//! load -> structural checks -> compatibility checks -> rule engine -> merge.
//! A fatal condition at any step ends the run with no partial findings.

use std::path::Path;
use thiserror::Error;

use crate::config::LintConfig;
use crate::engine::{write_bundled_ruleset, EngineError, RuleEngine, SpectralEngine};
use crate::loader::{load_document, LoadError};
use crate::validation::{ValidationResult, Validator};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// The lint pipeline - one run per document
pub struct LintPipeline {
    config: LintConfig,
    structural: Validator,
    compatibility: Validator,
    engine: Box<dyn RuleEngine>,
}

impl LintPipeline {
    pub fn new(config: LintConfig, engine: Box<dyn RuleEngine>) -> Self {
        Self {
            config,
            structural: Validator::structural(),
            compatibility: Validator::compatibility(),
            engine,
        }
    }

    /// Pipeline backed by the configured Spectral command.
    pub fn from_config(config: LintConfig) -> Self {
        let engine = SpectralEngine::new(&config.engine_command);
        Self::new(config, Box::new(engine))
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    /// Run every stage. Fatal conditions come back as a fatal result.
    pub fn run(&self, path: &Path) -> ValidationResult {
        match self.try_run(path) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(error = %e, "lint aborted");
                ValidationResult::fatal(e.to_string())
            }
        }
    }

    pub fn try_run(&self, path: &Path) -> Result<ValidationResult, PipelineError> {
        let loaded = load_document(path, self.config.max_size_kb)?;
        tracing::debug!(path = %path.display(), size_kb = loaded.size_kb, "document loaded");

        // Size limit errors lead the pre-check stage.
        let pre_check = ValidationResult::from_findings(loaded.findings)
            .merge(self.structural.validate(&loaded.document));
        let compat = self.compatibility.validate(&loaded.document);
        drop(loaded.document);

        // The bundled ruleset's temp file must outlive the engine run.
        let bundled;
        let ruleset = match &self.config.ruleset {
            Some(ruleset) => ruleset.as_path(),
            None => {
                bundled = write_bundled_ruleset()?;
                bundled.path()
            }
        };
        let engine: ValidationResult = self.engine.lint(path, ruleset)?.into();

        // Compatibility warnings trail the engine's; they never affect success.
        let mut combined = pre_check.merge(engine);
        combined.warnings.extend(compat.warnings);
        combined.size_kb = Some(loaded.size_kb);

        tracing::debug!(
            success = combined.success,
            errors = combined.errors.len(),
            warnings = combined.warnings.len(),
            "lint finished"
        );
        Ok(combined)
    }
}
