//! Table-driven capability advisories over bound declarations.

use crate::binder::{last_segment, AttributeBindings, CapabilityImpl, Declaration};
use crate::types::{Finding, PatternId, Severity};
use std::collections::BTreeSet;

/// What a [`CapabilityRule`] requires of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityCheck {
    /// The capability must be derived or explicitly implemented.
    Baseline(&'static str),
    /// Deriving `base` suggests deriving `pair` as well. Derives only.
    Paired {
        /// Capability that triggers the rule.
        base: &'static str,
        /// Conventional companion.
        pair: &'static str,
    },
    /// Deriving `capability` requires every one of `requires` to be derived.
    Requires {
        /// Capability that triggers the rule.
        capability: &'static str,
        /// Capabilities that must accompany it.
        requires: &'static [&'static str],
    },
}

/// One row of the synthesizer table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityRule {
    /// Pattern reported when the check fails.
    pub pattern: PatternId,
    /// The check itself.
    pub check: CapabilityCheck,
    /// Severity of the finding.
    pub severity: Severity,
    /// Remediation advice.
    pub advice: &'static str,
}

impl CapabilityRule {
    /// The built-in table: `Debug` baseline, `PartialEq`/`PartialOrd` pairs,
    /// and `Hash` needing `PartialEq + Eq`.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                pattern: PatternId::MissingDebug,
                check: CapabilityCheck::Baseline("Debug"),
                severity: Severity::Error,
                advice: "All types should implement Debug for debugging",
            },
            Self {
                pattern: PatternId::MissingPairedCapability,
                check: CapabilityCheck::Paired {
                    base: "PartialEq",
                    pair: "Eq",
                },
                severity: Severity::Info,
                advice: "If PartialEq is derived, consider deriving Eq too",
            },
            Self {
                pattern: PatternId::MissingPairedCapability,
                check: CapabilityCheck::Paired {
                    base: "PartialOrd",
                    pair: "Ord",
                },
                severity: Severity::Info,
                advice: "If PartialOrd is derived, consider deriving Ord too",
            },
            Self {
                pattern: PatternId::HashWithoutEq,
                check: CapabilityCheck::Requires {
                    capability: "Hash",
                    requires: &["PartialEq", "Eq"],
                },
                severity: Severity::Error,
                advice: "Hash keys (HashMap/HashSet) also need PartialEq + Eq",
            },
        ]
    }

    fn evaluate(
        &self,
        decl: &Declaration,
        derived: &BTreeSet<&str>,
        implemented: &BTreeSet<&str>,
    ) -> Option<Finding> {
        let message = match &self.check {
            CapabilityCheck::Baseline(cap) => {
                if derived.contains(cap) || implemented.contains(cap) {
                    return None;
                }
                format!("Missing {cap} - add #[derive({cap})] to {}", decl.name)
            }
            CapabilityCheck::Paired { base, pair } => {
                if !derived.contains(base) || derived.contains(pair) {
                    return None;
                }
                format!("{}: derives {base} without {pair}", decl.name)
            }
            CapabilityCheck::Requires {
                capability,
                requires,
            } => {
                let missing: Vec<&str> = requires
                    .iter()
                    .copied()
                    .filter(|r| !derived.contains(r))
                    .collect();
                if !derived.contains(capability) || missing.is_empty() {
                    return None;
                }
                format!(
                    "{}: derives {capability} without {}",
                    decl.name,
                    missing.join(" + ")
                )
            }
        };

        Some(
            Finding::new(self.pattern, self.severity, decl.line, message)
                .with_snippet(&format!("{} {}", decl.kind, decl.name))
                .with_suggestion(self.advice),
        )
    }
}

/// Produces derived findings from declarations, bindings and impls.
#[derive(Debug, Clone)]
pub struct SuggestionSynthesizer {
    rules: Vec<CapabilityRule>,
}

impl Default for SuggestionSynthesizer {
    fn default() -> Self {
        Self::new(CapabilityRule::defaults())
    }
}

impl SuggestionSynthesizer {
    /// Creates a synthesizer over `rules`.
    #[must_use]
    pub fn new(rules: Vec<CapabilityRule>) -> Self {
        Self { rules }
    }

    /// The rule table.
    #[must_use]
    pub fn rules(&self) -> &[CapabilityRule] {
        &self.rules
    }

    /// Evaluates every rule against every declaration.
    ///
    /// Findings follow declaration order, then table order.
    #[must_use]
    pub fn synthesize(
        &self,
        declarations: &[Declaration],
        bindings: &AttributeBindings,
        implementations: &[CapabilityImpl],
    ) -> Vec<Finding> {
        let mut findings = Vec::new();

        for decl in declarations {
            let derived: BTreeSet<&str> = bindings
                .get(&decl.name)
                .into_iter()
                .flatten()
                .map(|d| last_segment(d))
                .collect();
            let implemented: BTreeSet<&str> = implementations
                .iter()
                .filter(|i| i.declaration == decl.name)
                .map(|i| i.capability.as_str())
                .collect();

            findings.extend(
                self.rules
                    .iter()
                    .filter_map(|rule| rule.evaluate(decl, &derived, &implemented)),
            );
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::AttributeBinder;
    use crate::source::SourceLines;

    fn run(text: &str) -> Vec<Finding> {
        let scan = AttributeBinder::new().unwrap().scan(&SourceLines::parse(text));
        SuggestionSynthesizer::default().synthesize(
            &scan.declarations,
            &scan.bindings,
            &scan.implementations,
        )
    }

    #[test]
    fn partial_eq_without_eq_is_reported_once() {
        let findings = run("#[derive(Debug, PartialEq)]\nstruct Point;");
        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.pattern, PatternId::MissingPairedCapability);
        assert_eq!(finding.severity, Severity::Info);
        assert!(finding.message.contains("PartialEq"));
        assert!(finding.message.contains("Eq"));
        assert_eq!(finding.snippet, "struct Point");
    }

    #[test]
    fn adding_the_pair_clears_the_advisory() {
        assert!(run("#[derive(Debug, PartialEq, Eq)]\nstruct Point;").is_empty());
    }

    #[test]
    fn missing_debug_considers_explicit_impls() {
        let findings = run("struct Plain;");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].pattern, PatternId::MissingDebug);
        assert_eq!(findings[0].severity, Severity::Error);

        assert!(run("struct Plain;\nimpl std::fmt::Debug for Plain {}").is_empty());
    }

    #[test]
    fn pairing_is_derive_only() {
        let text = "#[derive(Debug, PartialOrd)]\nstruct Rank;\nimpl Ord for Rank {}";
        let findings = run(text);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("PartialOrd"));
    }

    #[test]
    fn hash_requires_partial_eq_and_eq() {
        let findings = run("#[derive(Debug, Hash, PartialEq)]\nenum Key { A }");
        let hash: Vec<&Finding> = findings
            .iter()
            .filter(|f| f.pattern == PatternId::HashWithoutEq)
            .collect();
        assert_eq!(hash.len(), 1);
        assert_eq!(hash[0].severity, Severity::Error);
        assert!(hash[0].message.ends_with("without Eq"));
    }

    #[test]
    fn custom_table_is_used() {
        let synthesizer = SuggestionSynthesizer::new(vec![CapabilityRule {
            pattern: PatternId::MissingPairedCapability,
            check: CapabilityCheck::Paired {
                base: "Serialize",
                pair: "Deserialize",
            },
            severity: Severity::Warning,
            advice: "Derive both directions",
        }]);
        let scan = AttributeBinder::new()
            .unwrap()
            .scan(&SourceLines::parse("#[derive(serde::Serialize)]\nstruct Wire;"));
        let findings =
            synthesizer.synthesize(&scan.declarations, &scan.bindings, &scan.implementations);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
    }
}
