//! Check command implementation.

use anyhow::{Context, Result};
use idiom_lint_core::{Analyzer, Category, PatternId, Severity};
use std::path::Path;

use crate::OutputFormat;

/// Command-line filters for the check command.
#[derive(Debug, Default)]
pub struct Filters {
    /// Comma-separated category names.
    pub categories: Option<String>,
    /// Comma-separated pattern names or codes.
    pub rules: Option<String>,
    /// Extra exclude globs.
    pub exclude: Vec<String>,
}

/// Runs the check command.
pub fn run(
    path: &Path,
    format: OutputFormat,
    filters: &Filters,
    fail_on: Option<Severity>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = super::load_config(path, config_path)?;
    let preset = super::preset(&config);
    let threshold = fail_on.unwrap_or_else(|| config.fail_on_severity());

    let mut builder = Analyzer::builder().config(config);
    for detector in preset.detectors().context("Failed to load detectors")? {
        builder = builder.detector_box(detector);
    }
    builder = builder.excludes(filters.exclude.iter().cloned());

    if let Some(list) = &filters.rules {
        builder = builder.only_patterns(parse_patterns(list));
    }
    if let Some(list) = &filters.categories {
        builder = builder.only_categories(parse_categories(list));
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {} with {} detectors ({} preset)",
        path.display(),
        analyzer.rule_count(),
        preset.name()
    );

    let report = analyzer
        .analyze_path(path)
        .with_context(|| format!("Analysis of {} failed", path.display()))?;

    super::output::print(&report, format)?;
    super::exit_on(&report, threshold);

    Ok(())
}

fn parse_patterns(list: &str) -> Vec<PatternId> {
    split(list)
        .filter_map(|name| {
            let pattern = PatternId::lookup(name);
            if pattern.is_none() {
                tracing::warn!("Unknown rule: {name}");
            }
            pattern
        })
        .collect()
}

fn parse_categories(list: &str) -> Vec<Category> {
    split(list)
        .filter_map(|name| {
            let category = Category::from_name(name);
            if category.is_none() {
                tracing::warn!("Unknown category: {name}");
            }
            category
        })
        .collect()
}

fn split(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}
