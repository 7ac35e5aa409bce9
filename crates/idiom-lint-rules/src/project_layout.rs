//! Project directory conventions.

use crate::catalogue::describe;
use idiom_lint_core::{Finding, PatternId, ProjectContext, ProjectRule, Severity};

const PATTERNS: &[PatternId] = &[
    PatternId::MissingSrcDir,
    PatternId::MissingTestsDir,
    PatternId::MissingReadme,
    PatternId::MissingGitignore,
    PatternId::MissingLicenseFile,
];

/// Expected entry: pattern, severity, accepted paths, message.
type Expectation = (PatternId, Severity, &'static [&'static str], &'static str);

const EXPECTED: &[Expectation] = &[
    (
        PatternId::MissingSrcDir,
        Severity::Error,
        &["src"],
        "Missing 'src' directory",
    ),
    (
        PatternId::MissingTestsDir,
        Severity::Info,
        &["tests"],
        "Consider adding 'tests' directory for integration tests",
    ),
    (
        PatternId::MissingReadme,
        Severity::Warning,
        &["README.md"],
        "Add README.md for project documentation",
    ),
    (
        PatternId::MissingGitignore,
        Severity::Warning,
        &[".gitignore"],
        "Add .gitignore (should include /target)",
    ),
    (
        PatternId::MissingLicenseFile,
        Severity::Warning,
        &["LICENSE", "LICENSE.md"],
        "Add LICENSE file",
    ),
];

/// Checks for the files and directories a crate is expected to ship.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectLayout;

impl ProjectLayout {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProjectRule for ProjectLayout {
    fn name(&self) -> &'static str {
        "project-layout"
    }

    fn description(&self) -> &'static str {
        "Conventional project files and directories"
    }

    fn patterns(&self) -> &'static [PatternId] {
        PATTERNS
    }

    fn check_project(&self, ctx: &ProjectContext<'_>) -> Vec<Finding> {
        EXPECTED
            .iter()
            .filter(|(_, _, paths, _)| !paths.iter().any(|p| ctx.exists(p)))
            .map(|(pattern, severity, _, message)| {
                Finding::new(*pattern, *severity, 0, *message).with_snippet(describe(*pattern))
            })
            .collect()
    }
}
