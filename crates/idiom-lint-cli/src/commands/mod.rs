//! Subcommand implementations.

pub mod check;
pub mod init;
pub mod list_rules;
pub mod manifest;
pub mod output;

use anyhow::{Context, Result};
use idiom_lint_core::Config;
use idiom_lint_rules::Preset;
use std::path::Path;

use crate::config_resolver::{self, Origin};

/// Resolves and loads the configuration for `target`.
pub fn load_config(target: &Path, explicit: Option<&Path>) -> Result<Config> {
    let Some((path, origin)) = config_resolver::find(target, explicit) else {
        tracing::debug!("No config found, using defaults");
        return Ok(Config::default());
    };
    match origin {
        Origin::User => tracing::info!("Using user config: {}", path.display()),
        Origin::Project => tracing::debug!("Using project config: {}", path.display()),
        Origin::Flag => {}
    }
    Config::from_file(&path).with_context(|| format!("Failed to load config: {}", path.display()))
}

/// Preset named in `config`, falling back to recommended.
pub fn preset(config: &Config) -> Preset {
    match config.preset.as_deref() {
        None => Preset::default(),
        Some(name) => Preset::from_name(name).unwrap_or_else(|| {
            tracing::warn!("Unknown preset '{name}', using recommended");
            Preset::default()
        }),
    }
}

/// Exits with status 1 when the report crosses the failure threshold.
pub fn exit_on(report: &idiom_lint_core::Report, threshold: idiom_lint_core::Severity) {
    if report.has_findings_at(threshold) {
        std::process::exit(1);
    }
}
