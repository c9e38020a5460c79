//! Lint Configuration - limits, ruleset and engine command

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::DEFAULT_MAX_SIZE_KB;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config {0}: engineCommand must name a program")]
    EmptyEngineCommand(PathBuf),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LintConfig {
    #[serde(default = "default_max_size_kb")]
    pub max_size_kb: f64,
    /// Rule-definition file. `None` uses the ruleset compiled into the binary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ruleset: Option<PathBuf>,
    #[serde(default = "default_engine_command")]
    pub engine_command: Vec<String>,
}

fn default_max_size_kb() -> f64 { DEFAULT_MAX_SIZE_KB }

fn default_engine_command() -> Vec<String> {
    vec!["npx".to_string(), "@stoplight/spectral-cli".to_string()]
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            max_size_kb: default_max_size_kb(),
            ruleset: None,
            engine_command: default_engine_command(),
        }
    }
}

impl LintConfig {
    /// Load from a JSON file. A relative ruleset resolves against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: LintConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if config.engine_command.is_empty() {
            return Err(ConfigError::EmptyEngineCommand(path.to_path_buf()));
        }

        if let (Some(ruleset), Some(dir)) = (config.ruleset.as_mut(), path.parent()) {
            if ruleset.is_relative() {
                *ruleset = dir.join(&*ruleset);
            }
        }

        Ok(config)
    }

    pub fn with_ruleset(mut self, ruleset: impl Into<PathBuf>) -> Self {
        self.ruleset = Some(ruleset.into());
        self
    }
}
