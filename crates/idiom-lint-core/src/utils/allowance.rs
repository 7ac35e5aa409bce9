//! Comment-based allowance directives.
//!
//! Supports directives like:
//! ```text
//! // idiom-lint: allow(unwrap) reason="value checked above"
//! ```
//!
//! A directive applies to its own line and to the line below it. Patterns
//! may be named by kebab-case name or code; `all` matches every pattern.

use crate::source::SourceLines;
use crate::types::{Finding, PatternId, Severity};
use std::collections::HashSet;

const DIRECTIVE: &str = "idiom-lint:";

/// Result of checking for allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Pattern is not allowed.
    Denied,
    /// Pattern is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed allowance directive.
#[derive(Debug, Clone)]
pub struct AllowDirective {
    /// Pattern names or codes that are allowed.
    pub patterns: HashSet<String>,
    /// Optional reason for the allowance.
    pub reason: Option<String>,
}

impl AllowDirective {
    fn covers(&self, pattern: PatternId) -> bool {
        self.patterns.contains("all")
            || self.patterns.contains(pattern.name())
            || self.patterns.contains(pattern.code())
    }
}

/// Checks whether `pattern` is allowed on `line` (1-indexed).
///
/// Looks at the line itself and the line before it.
#[must_use]
pub fn check_allow_with_reason(lines: &SourceLines, line: usize, pattern: PatternId) -> AllowCheck {
    for check_line in [line.saturating_sub(1), line] {
        let Some(source) = lines.get(check_line) else {
            continue;
        };
        if let Some(directive) = parse_allow_directive(&source.trimmed) {
            if directive.covers(pattern) {
                return AllowCheck::Allowed {
                    reason: directive.reason,
                };
            }
        }
    }

    AllowCheck::Denied
}

/// Drops findings covered by an allow directive.
///
/// Allowing an error-severity finding without a reason does not hide it:
/// the finding is replaced by an `allow-without-reason` warning on the
/// same line. File-level findings (line 0) are never suppressed.
#[must_use]
pub fn apply_allow_directives(findings: Vec<Finding>, lines: &SourceLines) -> Vec<Finding> {
    findings
        .into_iter()
        .filter_map(|finding| {
            if finding.line == 0 {
                return Some(finding);
            }
            match check_allow_with_reason(lines, finding.line, finding.pattern) {
                AllowCheck::Denied => Some(finding),
                AllowCheck::Allowed { reason: Some(_) } => None,
                AllowCheck::Allowed { reason: None } if finding.severity == Severity::Error => {
                    let message = format!(
                        "allow({}) on an error-severity pattern requires reason=\"...\"",
                        finding.pattern
                    );
                    let mut replaced = Finding::new(
                        PatternId::AllowWithoutReason,
                        Severity::Warning,
                        finding.line,
                        message,
                    )
                    .with_suggestion("Explain why the pattern is acceptable here");
                    replaced.snippet = finding.snippet;
                    replaced.file = finding.file;
                    Some(replaced)
                }
                AllowCheck::Allowed { reason: None } => None,
            }
        })
        .collect()
}

/// Parses an allowance directive from a line.
///
/// The directive may fill a whole comment line or trail code after `//`.
fn parse_allow_directive(line: &str) -> Option<AllowDirective> {
    let start = line.find(DIRECTIVE)?;
    if !line[..start].trim_end().ends_with("//") {
        return None;
    }

    let directive = line[start + DIRECTIVE.len()..].trim();
    let allow_content = directive.strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let patterns: HashSet<String> = allow_content[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if patterns.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest
        .strip_prefix("reason=")
        .map(str::trim)
        .and_then(|r| r.strip_prefix('"'))
        .and_then(|r| r.find('"').map(|end| r[..end].to_string()))
        .filter(|r| !r.trim().is_empty());

    Some(AllowDirective { patterns, reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allow_directive() {
        let directive = parse_allow_directive("// idiom-lint: allow(unwrap)").unwrap();
        assert!(directive.patterns.contains("unwrap"));
        assert!(directive.reason.is_none());
    }

    #[test]
    fn test_parse_allow_directive_with_reason() {
        let directive =
            parse_allow_directive("// idiom-lint: allow(panic) reason=\"startup only\"").unwrap();
        assert!(directive.patterns.contains("panic"));
        assert_eq!(directive.reason.as_deref(), Some("startup only"));
    }

    #[test]
    fn test_parse_multiple_patterns_and_trailing_form() {
        let directive =
            parse_allow_directive("x.unwrap(); // idiom-lint: allow(unwrap, IL202)").unwrap();
        assert!(directive.covers(PatternId::Unwrap));
        assert!(directive.covers(PatternId::Expect));
        assert!(!directive.covers(PatternId::Panic));
    }

    #[test]
    fn test_directive_outside_comment_is_ignored() {
        assert!(parse_allow_directive("let s = \"idiom-lint: allow(unwrap)\";").is_none());
        assert!(parse_allow_directive("// idiom-lint: allow()").is_none());
    }

    #[test]
    fn test_empty_reason_counts_as_missing() {
        let directive = parse_allow_directive("// idiom-lint: allow(panic) reason=\"  \"").unwrap();
        assert!(directive.reason.is_none());
    }

    #[test]
    fn test_check_allow_on_previous_line() {
        let lines = SourceLines::parse(
            "fn foo() {\n    // idiom-lint: allow(unwrap) reason=\"checked\"\n    value.unwrap();\n}",
        );
        let result = check_allow_with_reason(&lines, 3, PatternId::Unwrap);
        assert!(result.is_allowed());
        assert_eq!(result.reason(), Some("checked"));
        assert!(!check_allow_with_reason(&lines, 3, PatternId::Panic).is_allowed());
        assert!(!check_allow_with_reason(&lines, 4, PatternId::Unwrap).is_allowed());
    }

    #[test]
    fn test_apply_drops_and_replaces() {
        let lines = SourceLines::parse(
            "// idiom-lint: allow(unwrap)\nx.unwrap();\n// idiom-lint: allow(panic)\npanic!();\npanic!(); // idiom-lint: allow(all) reason=\"test helper\"",
        );
        let findings = vec![
            Finding::new(PatternId::Unwrap, Severity::Warning, 2, "unwrap"),
            Finding::new(PatternId::Panic, Severity::Error, 4, "panic").with_snippet("panic!();"),
            Finding::new(PatternId::Panic, Severity::Error, 5, "panic"),
            Finding::new(PatternId::MissingLicense, Severity::Warning, 0, "license"),
        ];

        let kept = apply_allow_directives(findings, &lines);
        let summary: Vec<(PatternId, Severity, usize)> =
            kept.iter().map(|f| (f.pattern, f.severity, f.line)).collect();
        assert_eq!(
            summary,
            vec![
                (PatternId::AllowWithoutReason, Severity::Warning, 4),
                (PatternId::MissingLicense, Severity::Warning, 0),
            ]
        );
        assert_eq!(kept[0].snippet, "panic!();");
    }
}
