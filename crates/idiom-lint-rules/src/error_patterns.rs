//! Error handling idioms.
//!
//! `.unwrap()` and `panic!` are reported as problems; `.expect()`, `?`,
//! `map_err` and `ok_or` are reported as good patterns and earn a score
//! bonus.

use crate::pattern_detector::PatternDetector;
use idiom_lint_core::{DetectorBox, PatternId, RuleError, Severity};

/// Regex for `.expect(` with optional whitespace.
pub const EXPECT_CALL: &str = r"\.expect\s*\(";

/// Regex for `?` followed by a statement or expression end.
pub const QUESTION_MARK: &str = r"\?\s*[;})]";

/// Returns the error handling detectors in code order.
///
/// `unwrap_severity` lets presets raise `.unwrap()` above the default
/// warning.
///
/// # Errors
///
/// Returns [`RuleError::InvalidPattern`] if a regex fails to compile.
pub fn error_detectors(unwrap_severity: Severity) -> Result<Vec<DetectorBox>, RuleError> {
    Ok(vec![
        Box::new(
            PatternDetector::contains(PatternId::Unwrap, unwrap_severity, &[".unwrap()"])
                .message("Call to .unwrap() panics on failure")
                .suggestion(
                    "Consider using `?` operator or `unwrap_or_default()` for safer error handling",
                ),
        ),
        Box::new(
            PatternDetector::regex(PatternId::Expect, Severity::Info, EXPECT_CALL)?
                .message("expect() provides context. Ensure message is descriptive."),
        ),
        Box::new(
            PatternDetector::regex(PatternId::QuestionMark, Severity::Info, QUESTION_MARK)?
                .message("Using ? operator for error propagation"),
        ),
        Box::new(
            PatternDetector::contains(PatternId::Panic, Severity::Error, &["panic!"])
                .message("panic! aborts the caller")
                .suggestion("Consider returning Result<T, E> instead of panicking"),
        ),
        Box::new(
            PatternDetector::contains(PatternId::MapErr, Severity::Info, &[".map_err("])
                .message("Converting error types with map_err"),
        ),
        Box::new(
            PatternDetector::contains(PatternId::OkOr, Severity::Info, &[".ok_or(", ".ok_or_else("])
                .message("Converting Option to Result"),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use idiom_lint_core::{Detector, DetectorRegistry, Finding, SourceLines};

    fn check_code(code: &str) -> Vec<Finding> {
        let mut registry = DetectorRegistry::new();
        for detector in error_detectors(Severity::Warning).unwrap() {
            registry.push(detector);
        }
        registry.scan(&SourceLines::parse(code))
    }

    fn summary(findings: &[Finding]) -> Vec<(PatternId, usize)> {
        findings.iter().map(|f| (f.pattern, f.line)).collect()
    }

    #[test]
    fn test_detects_unwrap_and_panic() {
        let findings = check_code("let v = parse(s).unwrap();\nif bad { panic!(\"boom\"); }");
        assert_eq!(
            summary(&findings),
            vec![(PatternId::Unwrap, 1), (PatternId::Panic, 2)]
        );
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[1].severity, Severity::Error);
    }

    #[test]
    fn test_commented_out_code_is_ignored() {
        let findings = check_code("// let v = parse(s).unwrap();\n// panic!()");
        assert!(findings.is_empty());
    }

    #[test]
    fn test_good_patterns() {
        let findings = check_code(
            r#"
let cfg = read(path).map_err(Error::Io)?;
let v = map.get(k).ok_or_else(|| missing(k))?;
let n = s.parse::<u32>().expect ("digits only");
"#,
        );
        assert_eq!(
            summary(&findings),
            vec![
                (PatternId::Expect, 4),
                (PatternId::QuestionMark, 2),
                (PatternId::QuestionMark, 3),
                (PatternId::MapErr, 2),
                (PatternId::OkOr, 3),
            ]
        );
        assert!(findings.iter().all(Finding::is_positive));
    }

    #[test]
    fn test_question_mark_needs_terminator() {
        let findings = check_code("let x = y?.z;\nlet re = \"a?b\";");
        assert!(findings.is_empty());
    }

    #[test]
    fn test_unwrap_severity_is_configurable() {
        let detectors = error_detectors(Severity::Error).unwrap();
        assert_eq!(detectors[0].severity(), Severity::Error);
    }
}
