//! Builder for table-style line detectors.
//!
//! Most detectors are "this text on a line, optionally only inside some
//! construct". [`PatternDetector`] covers that shape so each detector is a
//! short builder chain.
//!
//! # Example
//!
//! ```ignore
//! use idiom_lint_core::{Construct, PatternId, Severity};
//! use idiom_lint_rules::PatternDetector;
//!
//! let detector = PatternDetector::contains(PatternId::NestedRuntime, Severity::Error, &["block_on"])
//!     .within(Construct::Async)
//!     .message("Avoid block_on inside async context");
//! ```

use crate::catalogue::describe;
use idiom_lint_core::{
    compile, Construct, Detector, Finding, LineContext, PatternId, RuleError, Severity,
};
use regex::Regex;

#[derive(Debug, Clone)]
enum Trigger {
    /// Any of these substrings.
    Contains(Vec<&'static str>),
    /// A compiled pattern; group 1 may be referenced as `{1}` in messages.
    Regex(Regex),
}

/// A detector that fires once per matching line.
///
/// Full-line comments never match.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    pattern: PatternId,
    severity: Severity,
    trigger: Trigger,
    excluding: Vec<&'static str>,
    within: Option<Construct>,
    message: String,
    suggestion: Option<String>,
}

impl PatternDetector {
    /// Fires on lines containing any of `needles`.
    #[must_use]
    pub fn contains(pattern: PatternId, severity: Severity, needles: &[&'static str]) -> Self {
        Self::with_trigger(pattern, severity, Trigger::Contains(needles.to_vec()))
    }

    /// Fires on lines matching `regex`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidPattern`] if `regex` does not compile.
    pub fn regex(pattern: PatternId, severity: Severity, regex: &str) -> Result<Self, RuleError> {
        let compiled = compile(pattern.name(), regex)?;
        Ok(Self::with_trigger(pattern, severity, Trigger::Regex(compiled)))
    }

    fn with_trigger(pattern: PatternId, severity: Severity, trigger: Trigger) -> Self {
        Self {
            pattern,
            severity,
            trigger,
            excluding: Vec::new(),
            within: None,
            message: describe(pattern).to_string(),
            suggestion: None,
        }
    }

    /// Skips lines that also contain any of `needles`.
    #[must_use]
    pub fn excluding(mut self, needles: &[&'static str]) -> Self {
        self.excluding.extend_from_slice(needles);
        self
    }

    /// Only fires while `construct` is active.
    #[must_use]
    pub fn within(mut self, construct: Construct) -> Self {
        self.within = Some(construct);
        self
    }

    /// Sets the finding message. `{1}` is replaced by the first regex group.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Sets remediation advice.
    #[must_use]
    pub fn suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Returns the message for `text`, or `None` if the line does not match.
    fn matches(&self, text: &str) -> Option<String> {
        match &self.trigger {
            Trigger::Contains(needles) => needles
                .iter()
                .any(|n| text.contains(n))
                .then(|| self.message.clone()),
            Trigger::Regex(regex) => {
                let caps = regex.captures(text)?;
                let group = caps.get(1).map_or("", |m| m.as_str());
                Some(self.message.replace("{1}", group))
            }
        }
    }
}

impl Detector for PatternDetector {
    fn pattern(&self) -> PatternId {
        self.pattern
    }

    fn description(&self) -> &'static str {
        describe(self.pattern)
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LineContext<'_>) -> Vec<Finding> {
        let line = ctx.line;
        if line.is_comment() {
            return Vec::new();
        }
        if self.within.is_some_and(|c| !ctx.is_active(c)) {
            return Vec::new();
        }
        if self.excluding.iter().any(|n| line.raw.contains(n)) {
            return Vec::new();
        }

        let Some(message) = self.matches(&line.raw) else {
            return Vec::new();
        };

        let finding = ctx.finding(self.pattern, self.severity, message);
        vec![match &self.suggestion {
            Some(s) => finding.with_suggestion(s.clone()),
            None => finding,
        }]
    }
}
