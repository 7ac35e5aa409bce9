//! Configuration types for idiom-lint.

use crate::score::ScoreWeights;
use crate::types::{PatternId, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration for idiom-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use ("recommended", "strict", "minimal").
    #[serde(default)]
    pub preset: Option<String>,

    /// Severity at or above which the CLI exits non-zero (default: "error").
    #[serde(default)]
    pub fail_on: Option<String>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Score weights.
    #[serde(default)]
    pub score: ScoreWeights,

    /// Per-pattern configurations, keyed by pattern name or code.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    fn rule(&self, pattern: PatternId) -> Option<&RuleConfig> {
        self.rules
            .get(pattern.name())
            .or_else(|| self.rules.get(pattern.code()))
    }

    /// Checks if a pattern is enabled.
    #[must_use]
    pub fn is_pattern_enabled(&self, pattern: PatternId) -> bool {
        self.rule(pattern)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a pattern.
    #[must_use]
    pub fn pattern_severity(&self, pattern: PatternId) -> Option<Severity> {
        self.rule(pattern).and_then(|c| c.severity)
    }

    /// Severity threshold for a failing run; unknown names fall back to error.
    #[must_use]
    pub fn fail_on_severity(&self) -> Severity {
        self.fail_on
            .as_deref()
            .and_then(Severity::from_name)
            .unwrap_or(Severity::Error)
    }

    /// Rule keys that name no known pattern.
    #[must_use]
    pub fn unknown_rules(&self) -> Vec<&str> {
        let mut unknown: Vec<&str> = self
            .rules
            .keys()
            .map(String::as_str)
            .filter(|key| PatternId::lookup(key).is_none())
            .collect();
        unknown.sort_unstable();
        unknown
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Glob patterns to exclude from analysis.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Glob patterns to include (if empty, all *.rs files).
    #[serde(default)]
    pub include: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Number of worker threads for batch runs.
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            exclude: vec!["**/target/**".to_string(), "**/vendor/**".to_string()],
            include: Vec::new(),
            respect_gitignore: true,
            parallelism: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Per-pattern configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this pattern is reported.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this pattern.
    #[serde(default)]
    pub severity: Option<Severity>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
