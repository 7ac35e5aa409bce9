//! Context types for detector and project rule execution.

use crate::manifest::Manifest;
use crate::source::{SourceLine, SourceLines};
use crate::tracker::{Construct, ContextSnapshot};
use crate::types::{Finding, PatternId, Severity};
use std::path::Path;

/// Upper bound on how far a detector may look around its line.
pub const MAX_WINDOW: usize = 10;

/// Context provided to line detectors.
///
/// Carries the current line, the construct flags that apply to it and
/// bounded access to neighbouring lines.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    /// The line being checked.
    pub line: &'a SourceLine,
    /// Construct flags for this line.
    pub snapshot: ContextSnapshot,
    lines: &'a SourceLines,
}

impl<'a> LineContext<'a> {
    /// Creates a line context.
    #[must_use]
    pub fn new(line: &'a SourceLine, snapshot: ContextSnapshot, lines: &'a SourceLines) -> Self {
        Self {
            line,
            snapshot,
            lines,
        }
    }

    /// Whether `construct` is active on this line.
    #[must_use]
    pub fn is_active(&self, construct: Construct) -> bool {
        self.snapshot.is_active(construct)
    }

    /// Neighbouring lines, current line included.
    ///
    /// Each side is clamped to [`MAX_WINDOW`] and to the input bounds.
    #[must_use]
    pub fn window(&self, before: usize, after: usize) -> &'a [SourceLine] {
        self.lines.window(
            self.line.number,
            before.min(MAX_WINDOW),
            after.min(MAX_WINDOW),
        )
    }

    /// Builds a finding on this line with the trimmed text as snippet.
    #[must_use]
    pub fn finding(
        &self,
        pattern: PatternId,
        severity: Severity,
        message: impl Into<String>,
    ) -> Finding {
        Finding::new(pattern, severity, self.line.number, message).with_snippet(&self.line.trimmed)
    }
}

/// Context provided to project-wide rules.
#[derive(Debug, Clone, Copy)]
pub struct ProjectContext<'a> {
    /// Root directory of the project.
    pub root: &'a Path,
    /// Decoded `Cargo.toml` of the project, when one was read.
    pub manifest: Option<&'a Manifest>,
}

impl<'a> ProjectContext<'a> {
    /// Creates a project context without a manifest.
    #[must_use]
    pub fn new(root: &'a Path) -> Self {
        Self {
            root,
            manifest: None,
        }
    }

    /// Attaches the decoded manifest.
    #[must_use]
    pub fn with_manifest(mut self, manifest: &'a Manifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    /// Whether `relative` exists under the project root.
    #[must_use]
    pub fn exists(&self, relative: &str) -> bool {
        self.root.join(relative).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_clamped_to_max() {
        let text: String = (1..=40).map(|i| format!("line {i}\n")).collect();
        let lines = SourceLines::parse(&text);
        let line = lines.get(20).unwrap();
        let ctx = LineContext::new(line, ContextSnapshot::default(), &lines);

        let window = ctx.window(100, 100);
        assert_eq!(window.first().map(|l| l.number), Some(10));
        assert_eq!(window.last().map(|l| l.number), Some(30));
    }

    #[test]
    fn finding_uses_trimmed_line() {
        let lines = SourceLines::parse("    let x = y.unwrap();");
        let line = lines.get(1).unwrap();
        let ctx = LineContext::new(line, ContextSnapshot::default(), &lines);

        let finding = ctx.finding(PatternId::Unwrap, Severity::Warning, "unwrap");
        assert_eq!(finding.line, 1);
        assert_eq!(finding.snippet, "let x = y.unwrap();");
    }

    #[test]
    fn project_context_checks_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "# demo").unwrap();
        let ctx = ProjectContext::new(dir.path());
        assert!(ctx.exists("README.md"));
        assert!(!ctx.exists("LICENSE"));
        assert!(ctx.manifest.is_none());
    }
}
