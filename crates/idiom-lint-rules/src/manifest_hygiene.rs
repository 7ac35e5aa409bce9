//! Manifest idioms over a decoded `Cargo.toml`.
//!
//! Every finding is file-level (line 0). Fields inherited from the
//! workspace count as set, and inherited dependencies are not inspected
//! for features.

use crate::catalogue::describe;
use idiom_lint_core::{Finding, Manifest, PatternId, ProjectContext, ProjectRule, Severity};

/// Oldest edition that is not reported as outdated.
pub const CURRENT_EDITION: u32 = 2021;

const PATTERNS: &[PatternId] = &[
    PatternId::OutdatedEdition,
    PatternId::MissingDescription,
    PatternId::MissingLicense,
    PatternId::MissingRepository,
    PatternId::NoErrorCrate,
    PatternId::SerdeWithoutDerive,
    PatternId::TokioWithoutFeatures,
    PatternId::NoReleaseProfile,
    PatternId::NoBenchmarkHarness,
];

/// Checks package metadata, dependencies and profiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestHygiene;

impl ManifestHygiene {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Checks a manifest directly.
    #[must_use]
    pub fn check_manifest(&self, manifest: &Manifest) -> Vec<Finding> {
        let package = &manifest.package;
        let mut findings = Vec::new();
        let mut report = |pattern: PatternId, severity: Severity, message: String| {
            findings.push(
                Finding::new(pattern, severity, 0, message).with_snippet(describe(pattern)),
            );
        };

        if let Ok(edition) = package.edition.parse::<u32>() {
            if edition < CURRENT_EDITION {
                report(
                    PatternId::OutdatedEdition,
                    Severity::Warning,
                    format!(
                        "Consider upgrading to edition {CURRENT_EDITION} (current: {})",
                        package.edition
                    ),
                );
            }
        }

        if package.description.is_none() {
            report(
                PatternId::MissingDescription,
                Severity::Info,
                "Add 'description' to [package] for crates.io".to_string(),
            );
        }

        if package.license.is_none() {
            report(
                PatternId::MissingLicense,
                Severity::Warning,
                "Add 'license' to [package] (e.g., 'MIT' or 'Apache-2.0')".to_string(),
            );
        }

        if package.repository.is_none() {
            report(
                PatternId::MissingRepository,
                Severity::Info,
                "Add 'repository' URL to [package]".to_string(),
            );
        }

        if !manifest.has_dependency("thiserror") && !manifest.has_dependency("anyhow") {
            report(
                PatternId::NoErrorCrate,
                Severity::Info,
                "Consider adding 'thiserror' or 'anyhow' for error handling".to_string(),
            );
        }

        if let Some(serde) = manifest.dependency("serde") {
            if !serde.inherited && !serde.features.iter().any(|f| f == "derive") {
                report(
                    PatternId::SerdeWithoutDerive,
                    Severity::Info,
                    "Consider enabling 'derive' feature for serde".to_string(),
                );
            }
        }

        if let Some(tokio) = manifest.dependency("tokio") {
            if !tokio.inherited && tokio.features.is_empty() {
                report(
                    PatternId::TokioWithoutFeatures,
                    Severity::Warning,
                    "Specify tokio features (e.g., 'full', 'rt-multi-thread', 'macros')"
                        .to_string(),
                );
            }
        }

        if !manifest.profiles.contains("release") {
            report(
                PatternId::NoReleaseProfile,
                Severity::Info,
                "Consider adding [profile.release] with lto = true for smaller binaries"
                    .to_string(),
            );
        }

        if !manifest.has_dev_dependency("criterion") && !manifest.has_dev_dependency("divan") {
            report(
                PatternId::NoBenchmarkHarness,
                Severity::Info,
                "Consider adding 'criterion' or 'divan' for benchmarking".to_string(),
            );
        }

        findings
    }
}

impl ProjectRule for ManifestHygiene {
    fn name(&self) -> &'static str {
        "manifest-hygiene"
    }

    fn description(&self) -> &'static str {
        "Package metadata, dependency and profile conventions"
    }

    fn patterns(&self) -> &'static [PatternId] {
        PATTERNS
    }

    fn check_project(&self, ctx: &ProjectContext<'_>) -> Vec<Finding> {
        ctx.manifest
            .map(|m| self.check_manifest(m))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE: &str = r#"
[package]
name = "tidy"
version = "1.0.0"
edition = "2021"
description = "A tidy crate"
license = "MIT"
repository = "https://example.com/tidy"

[dependencies]
serde = { version = "1", features = ["derive"] }
thiserror = "2"
tokio = { version = "1", features = ["rt", "macros"] }

[dev-dependencies]
criterion = "0.5"

[profile.release]
lto = true
"#;

    fn check(content: &str) -> Vec<Finding> {
        ManifestHygiene::new().check_manifest(&Manifest::parse(content).unwrap())
    }

    #[test]
    fn test_complete_manifest_is_clean() {
        assert!(check(COMPLETE).is_empty());
    }

    #[test]
    fn test_missing_license_and_description() {
        let content = COMPLETE
            .replace("description = \"A tidy crate\"\n", "")
            .replace("license = \"MIT\"\n", "");
        let findings = check(&content);
        let summary: Vec<(PatternId, Severity)> =
            findings.iter().map(|f| (f.pattern, f.severity)).collect();
        assert_eq!(
            summary,
            vec![
                (PatternId::MissingDescription, Severity::Info),
                (PatternId::MissingLicense, Severity::Warning),
            ]
        );
        assert!(findings.iter().all(|f| f.line == 0));
    }

    #[test]
    fn test_dependency_checks() {
        let content = r#"
[package]
name = "loose"
edition = "2018"
description = "d"
license = "MIT"
repository = "r"

[dependencies]
serde = "1"
tokio = "1"

[profile.release]
lto = true
"#;
        let patterns: Vec<PatternId> = check(content).iter().map(|f| f.pattern).collect();
        assert_eq!(
            patterns,
            vec![
                PatternId::OutdatedEdition,
                PatternId::NoErrorCrate,
                PatternId::SerdeWithoutDerive,
                PatternId::TokioWithoutFeatures,
                PatternId::NoBenchmarkHarness,
            ]
        );
    }

    #[test]
    fn test_inherited_dependencies_are_not_inspected() {
        let content = COMPLETE.replace(
            "tokio = { version = \"1\", features = [\"rt\", \"macros\"] }",
            "tokio = { workspace = true }",
        );
        assert!(check(&content).is_empty());
    }

    #[test]
    fn test_edition_message_snapshot() {
        let content = COMPLETE.replace("edition = \"2021\"", "edition = \"2015\"");
        let findings = check(&content);
        insta::assert_snapshot!(findings[0].message, @"Consider upgrading to edition 2021 (current: 2015)");
    }
}
