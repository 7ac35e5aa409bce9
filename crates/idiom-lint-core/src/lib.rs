//! # idiom-lint-core
//!
//! Heuristic engine for spotting language idioms in source text.
//!
//! The engine is a single forward line scan: a [`ContextTracker`] keeps
//! brace-counted "inside construct" flags while every registered
//! [`Detector`] inspects each line. An [`AttributeBinder`] ties derive
//! annotations to the declarations that follow them, and the
//! [`SuggestionSynthesizer`] turns those bindings into advisories. All
//! findings end up in a scored [`Report`].
//!
//! ## Example
//!
//! ```ignore
//! use idiom_lint_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .detector(MyDetector::new())
//!     .build()?;
//!
//! let report = analyzer.analyze_path(Path::new("src"))?;
//! println!("{}", report.summary());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod binder;
mod config;
mod context;
mod manifest;
mod registry;
mod rule;
mod score;
mod source;
mod synthesizer;
mod tracker;
mod types;

/// Utility modules for detector implementations.
pub mod utils;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use binder::{
    last_segment, AttributeBinder, AttributeBindings, CapabilityImpl, Declaration,
    DeclarationKind, TypeScan,
};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use context::{LineContext, ProjectContext, MAX_WINDOW};
pub use manifest::{Dependency, Manifest, ManifestError, PackageInfo};
pub use registry::DetectorRegistry;
pub use rule::{compile, Detector, DetectorBox, ProjectRule, ProjectRuleBox, RuleError};
pub use score::{score, ScoreWeights, SeverityCounts};
pub use source::{SourceLine, SourceLines};
pub use synthesizer::{CapabilityCheck, CapabilityRule, SuggestionSynthesizer};
pub use tracker::{contains_word, is_ident_char, Construct, ContextSnapshot, ContextTracker};
pub use types::{
    Category, DependencySummary, Finding, FindingDiagnostic, PatternId, ProjectSummary, Report,
    Severity, TypeSummary, UnitFailure, MAX_SNIPPET_CHARS,
};
pub use utils::allowance::{AllowCheck, AllowDirective};
