//! Severity tallies and the bounded idiom score.

use crate::types::{Finding, Severity};
use serde::{Deserialize, Serialize};

/// Findings tallied by severity.
///
/// Positive findings are counted in `positives` only, so the four counts
/// are disjoint and sum to the number of findings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    /// Error findings.
    pub errors: usize,
    /// Warning findings.
    pub warnings: usize,
    /// Negative informational findings.
    pub infos: usize,
    /// Good-pattern findings.
    pub positives: usize,
}

impl SeverityCounts {
    /// Counts `findings`.
    #[must_use]
    pub fn tally(findings: &[Finding]) -> Self {
        let mut counts = Self::default();
        for finding in findings {
            if finding.is_positive() {
                counts.positives += 1;
                continue;
            }
            match finding.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Info => counts.infos += 1,
            }
        }
        counts
    }

    /// Total number of findings.
    #[must_use]
    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.infos + self.positives
    }
}

/// Score weights. Configurable under `[score]`; identical input and weights
/// always produce the same score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Starting score.
    pub baseline: u32,
    /// Penalty per error finding.
    pub error: u32,
    /// Penalty per warning finding.
    pub warning: u32,
    /// Penalty per negative info finding.
    pub info: u32,
    /// Bonus per positive finding.
    pub positive_bonus: u32,
    /// Cap on the total bonus.
    pub max_bonus: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            baseline: 100,
            error: 15,
            warning: 5,
            info: 2,
            positive_bonus: 2,
            max_bonus: 20,
        }
    }
}

impl ScoreWeights {
    /// Computes the score for `counts`, clamped to `0..=100`.
    #[must_use]
    pub fn score(&self, counts: &SeverityCounts) -> u8 {
        let penalty = weighted(counts.errors, self.error)
            .saturating_add(weighted(counts.warnings, self.warning))
            .saturating_add(weighted(counts.infos, self.info));
        let bonus = weighted(counts.positives, self.positive_bonus).min(u64::from(self.max_bonus));

        let raw = i128::from(self.baseline) - i128::from(penalty) + i128::from(bonus);
        let clamped = raw.clamp(0, 100);
        u8::try_from(clamped).unwrap_or(100)
    }
}

fn weighted(count: usize, weight: u32) -> u64 {
    u64::try_from(count)
        .unwrap_or(u64::MAX)
        .saturating_mul(u64::from(weight))
}

/// Scores `findings` with `weights`.
#[must_use]
pub fn score(findings: &[Finding], weights: &ScoreWeights) -> u8 {
    weights.score(&SeverityCounts::tally(findings))
}
