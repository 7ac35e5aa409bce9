//! # idiom-lint-rules
//!
//! Built-in detectors and project rules for idiom-lint.
//!
//! ## Available Patterns
//!
//! | Codes | Family | Source |
//! |-------|--------|--------|
//! | IL101-IL110 | `async` | [`async_detectors`] |
//! | IL201-IL206 | `errors` | [`error_detectors`] |
//! | IL301-IL304 | `ownership` | [`ownership_detectors`] |
//! | IL401-IL403 | `traits` | derive analysis in the core analyzer |
//! | IL501-IL509 | `manifest` | [`ManifestHygiene`] |
//! | IL601-IL605 | `layout` | [`ProjectLayout`] |
//!
//! ## Usage
//!
//! ```ignore
//! use idiom_lint_core::Analyzer;
//! use idiom_lint_rules::Preset;
//!
//! let mut builder = Analyzer::builder();
//! for detector in Preset::Recommended.detectors()? {
//!     builder = builder.detector_box(detector);
//! }
//! let report = builder.build()?.analyze_source(text);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod async_patterns;
mod catalogue;
mod error_patterns;
mod manifest_hygiene;
mod ownership_patterns;
mod pattern_detector;
mod presets;
mod project_layout;

pub use async_patterns::{async_detectors, SyncMutex};
pub use catalogue::describe;
pub use error_patterns::{error_detectors, EXPECT_CALL, QUESTION_MARK};
pub use manifest_hygiene::{ManifestHygiene, CURRENT_EDITION};
pub use ownership_patterns::{
    ownership_detectors, BorrowConflict, BORROW_WINDOW, CLONE_INTO_CALL, INTO_MOVE, MUT_BORROW,
    TEMP_REFERENCE,
};
pub use pattern_detector::PatternDetector;
pub use presets::{all_detectors, project_rules, Preset};
pub use project_layout::ProjectLayout;

/// Re-export core types for convenience.
pub use idiom_lint_core::{Detector, Finding, PatternId, ProjectRule, Severity};
