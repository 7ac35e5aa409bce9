//! Detector presets for common configurations.

use crate::{async_detectors, error_detectors, ownership_detectors, ManifestHygiene, ProjectLayout};
use idiom_lint_core::{Detector, DetectorBox, ProjectRuleBox, RuleError, Severity};

/// Preset configurations for idiom-lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Every detector with its default severity.
    #[default]
    Recommended,
    /// Every detector, with `.unwrap()` raised to an error.
    Strict,
    /// Error handling plus the async detectors that report errors.
    Minimal,
}

impl Preset {
    /// Every preset, in listing order.
    pub const ALL: &'static [Self] = &[Self::Recommended, Self::Strict, Self::Minimal];

    /// Parses a preset name as written in configuration files.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "recommended" => Some(Self::Recommended),
            "strict" => Some(Self::Strict),
            "minimal" => Some(Self::Minimal),
            _ => None,
        }
    }

    /// Returns the lowercase name of this preset.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::Strict => "strict",
            Self::Minimal => "minimal",
        }
    }

    /// Returns the detectors for this preset.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidPattern`] if a detector regex fails to
    /// compile.
    pub fn detectors(self) -> Result<Vec<DetectorBox>, RuleError> {
        let detectors = match self {
            Self::Recommended => all_detectors()?,
            Self::Strict => strict_detectors()?,
            Self::Minimal => minimal_detectors()?,
        };
        tracing::debug!(preset = self.name(), count = detectors.len(), "Loaded preset");
        Ok(detectors)
    }
}

/// Returns every detector with default severities, in code order.
///
/// # Errors
///
/// Returns [`RuleError::InvalidPattern`] if a detector regex fails to
/// compile.
pub fn all_detectors() -> Result<Vec<DetectorBox>, RuleError> {
    let mut detectors = async_detectors();
    detectors.extend(error_detectors(Severity::Warning)?);
    detectors.extend(ownership_detectors()?);
    Ok(detectors)
}

fn strict_detectors() -> Result<Vec<DetectorBox>, RuleError> {
    let mut detectors = async_detectors();
    detectors.extend(error_detectors(Severity::Error)?);
    detectors.extend(ownership_detectors()?);
    Ok(detectors)
}

fn minimal_detectors() -> Result<Vec<DetectorBox>, RuleError> {
    let mut detectors: Vec<DetectorBox> = async_detectors()
        .into_iter()
        .filter(|d| d.severity() == Severity::Error)
        .collect();
    detectors.extend(error_detectors(Severity::Warning)?);
    Ok(detectors)
}

/// Returns the project-wide rules.
#[must_use]
pub fn project_rules() -> Vec<ProjectRuleBox> {
    vec![Box::new(ManifestHygiene::new()), Box::new(ProjectLayout::new())]
}
