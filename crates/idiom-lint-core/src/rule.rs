//! Detector traits for defining idiom checks.

use crate::context::{LineContext, ProjectContext};
use crate::types::{Category, Finding, PatternId, Severity};
use regex::Regex;
use thiserror::Error;

/// A per-line idiom detector.
///
/// Detectors are independent of each other: each one sees every line once,
/// in order, together with the construct flags that apply to it.
///
/// # Example
///
/// ```ignore
/// use idiom_lint_core::{Detector, Finding, LineContext, PatternId, Severity};
///
/// pub struct NoPanic;
///
/// impl Detector for NoPanic {
///     fn pattern(&self) -> PatternId { PatternId::Panic }
///
///     fn check(&self, ctx: &LineContext<'_>) -> Vec<Finding> {
///         if ctx.line.trimmed.contains("panic!") {
///             vec![ctx.finding(self.pattern(), self.severity(), "panic")]
///         } else {
///             vec![]
///         }
///     }
/// }
/// ```
pub trait Detector: Send + Sync {
    /// Returns the pattern this detector reports.
    fn pattern(&self) -> PatternId;

    /// Returns the kebab-case name of this detector.
    fn name(&self) -> &'static str {
        self.pattern().name()
    }

    /// Returns the rule code (e.g., "IL101").
    fn code(&self) -> &'static str {
        self.pattern().code()
    }

    /// Returns the idiom family.
    fn category(&self) -> Category {
        self.pattern().category()
    }

    /// Returns a brief description of what this detector checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity of findings from this detector.
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    /// Checks one line and returns any findings.
    fn check(&self, ctx: &LineContext<'_>) -> Vec<Finding>;
}

/// Type alias for boxed `Detector` trait objects.
pub type DetectorBox = Box<dyn Detector>;

/// A project-wide rule over the manifest and directory layout.
pub trait ProjectRule: Send + Sync {
    /// Returns the kebab-case name of this rule.
    fn name(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Patterns this rule can report.
    fn patterns(&self) -> &'static [PatternId];

    /// Checks the project and returns file-level findings (line 0).
    fn check_project(&self, ctx: &ProjectContext<'_>) -> Vec<Finding>;
}

/// Type alias for boxed `ProjectRule` trait objects.
pub type ProjectRuleBox = Box<dyn ProjectRule>;

/// Errors raised while constructing detectors.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A detector pattern failed to compile.
    #[error("invalid pattern for '{rule}': {pattern}")]
    InvalidPattern {
        /// Name of the detector.
        rule: &'static str,
        /// Offending pattern text.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

/// Compiles `pattern` for the detector named `rule`.
///
/// # Errors
///
/// Returns [`RuleError::InvalidPattern`] if the regex does not compile.
pub fn compile(rule: &'static str, pattern: &str) -> Result<Regex, RuleError> {
    Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
        rule,
        pattern: pattern.to_string(),
        source,
    })
}
