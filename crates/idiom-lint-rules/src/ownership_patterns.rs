//! Ownership and borrowing idioms.

use crate::catalogue::describe;
use crate::pattern_detector::PatternDetector;
use idiom_lint_core::{
    compile, is_ident_char, Construct, Detector, DetectorBox, Finding, LineContext, PatternId,
    RuleError, Severity,
};
use regex::Regex;

/// Regex for a clone passed straight into a call.
pub const CLONE_INTO_CALL: &str = r"\.clone\(\)\s*\)";

/// Regex for a `.into()` move; group 1 is the moved binding.
pub const INTO_MOVE: &str = r"(\w+)\.into\(\)";

/// Regex for a reference to a value constructed in place.
pub const TEMP_REFERENCE: &str = r"&\s*\w+\s*::\s*new\s*\(";

/// Regex for a mutable borrow; group 1 is the borrowed binding.
pub const MUT_BORROW: &str = r"&mut\s+(\w+)";

/// Lines inspected on each side of a mutable borrow.
pub const BORROW_WINDOW: usize = 3;

/// Returns the ownership detectors in code order.
///
/// # Errors
///
/// Returns [`RuleError::InvalidPattern`] if a regex fails to compile.
pub fn ownership_detectors() -> Result<Vec<DetectorBox>, RuleError> {
    Ok(vec![
        Box::new(
            PatternDetector::regex(PatternId::UnnecessaryClone, Severity::Warning, CLONE_INTO_CALL)?
                .message("Possible unnecessary clone")
                .suggestion("Consider passing a reference (&) instead of cloning"),
        ),
        Box::new(
            PatternDetector::regex(PatternId::MoveInLoop, Severity::Warning, INTO_MOVE)?
                .within(Construct::Loop)
                .message("Potential move in loop: {1}")
                .suggestion("Clone the value or use a reference"),
        ),
        Box::new(
            PatternDetector::regex(PatternId::TempReference, Severity::Warning, TEMP_REFERENCE)?
                .message("Reference to temporary value")
                .suggestion("Store the value in a variable first"),
        ),
        Box::new(BorrowConflict::new()?),
    ])
}

/// `&mut x` with a shared `&x` nearby.
///
/// A shared borrow on the same line is an error; one within
/// [`BORROW_WINDOW`] lines is a warning. Neighbouring lines that take any
/// `&mut` are not counted as shared borrows.
#[derive(Debug, Clone)]
pub struct BorrowConflict {
    mut_borrow: Regex,
}

impl BorrowConflict {
    /// Compiles the detector.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidPattern`] if the regex fails to compile.
    pub fn new() -> Result<Self, RuleError> {
        Ok(Self {
            mut_borrow: compile(PatternId::BorrowConflict.name(), MUT_BORROW)?,
        })
    }

    fn classify(&self, ctx: &LineContext<'_>, var: &str) -> Option<Severity> {
        let without_mut = self.mut_borrow.replace_all(&ctx.line.raw, "");
        if has_shared_borrow(&without_mut, var) {
            return Some(Severity::Error);
        }

        ctx.window(BORROW_WINDOW, BORROW_WINDOW)
            .iter()
            .filter(|l| l.number != ctx.line.number && !l.is_comment())
            .any(|l| !l.raw.contains("&mut") && has_shared_borrow(&l.raw, var))
            .then_some(Severity::Warning)
    }
}

/// Whether `text` takes `&var` (not `&var_longer`).
fn has_shared_borrow(text: &str, var: &str) -> bool {
    let needle = format!("&{var}");
    text.match_indices(&needle).any(|(start, _)| {
        let rest = &text[start + needle.len()..];
        rest.chars().next().map_or(true, |c| !is_ident_char(c))
    })
}

impl Detector for BorrowConflict {
    fn pattern(&self) -> PatternId {
        PatternId::BorrowConflict
    }

    fn description(&self) -> &'static str {
        describe(PatternId::BorrowConflict)
    }

    fn check(&self, ctx: &LineContext<'_>) -> Vec<Finding> {
        if ctx.line.is_comment() {
            return Vec::new();
        }
        let Some(caps) = self.mut_borrow.captures(&ctx.line.raw) else {
            return Vec::new();
        };
        let Some(var) = caps.get(1).map(|m| m.as_str()) else {
            return Vec::new();
        };

        match self.classify(ctx, var) {
            Some(severity) => vec![ctx
                .finding(
                    self.pattern(),
                    severity,
                    format!("Potential borrow conflict with {var}"),
                )
                .with_suggestion("Ensure immutable borrows are done before mutable borrow")],
            None => Vec::new(),
        }
    }
}
