//! Manifest command implementation.

use anyhow::{Context, Result};
use idiom_lint_core::{Analyzer, Severity};
use idiom_lint_rules::project_rules;
use std::path::Path;

use crate::OutputFormat;

/// Runs the manifest command.
pub fn run(
    path: &Path,
    format: OutputFormat,
    fail_on: Option<Severity>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = super::load_config(path, config_path)?;
    let threshold = fail_on.unwrap_or_else(|| config.fail_on_severity());

    let mut builder = Analyzer::builder().config(config);
    for rule in project_rules() {
        builder = builder.project_rule_box(rule);
    }
    let analyzer = builder.build().context("Failed to build analyzer")?;

    let report = analyzer
        .analyze_project(path)
        .with_context(|| format!("Manifest analysis of {} failed", path.display()))?;

    super::output::print(&report, format)?;
    super::exit_on(&report, threshold);

    Ok(())
}
