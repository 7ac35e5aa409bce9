//! One-line descriptions of every pattern, shown by `list-rules`.

use idiom_lint_core::PatternId;

/// Returns the description of `pattern`.
#[must_use]
pub fn describe(pattern: PatternId) -> &'static str {
    match pattern {
        PatternId::BlockingSleep => "std::thread::sleep inside async code blocks the runtime",
        PatternId::AwaitPoint => "Await point (good pattern)",
        PatternId::SpawnTask => "tokio::spawn task creation (good pattern)",
        PatternId::SpawnBlocking => "spawn_blocking for blocking work (good pattern)",
        PatternId::SyncMutex => "Lock on a possibly synchronous mutex inside async code",
        PatternId::ConcurrentJoin => "join! for concurrent execution (good pattern)",
        PatternId::SelectMacro => "select! for racing futures (good pattern)",
        PatternId::Timeout => "Timeout around async operations (good pattern)",
        PatternId::UnboundedChannel => "Unbounded channel without back-pressure",
        PatternId::NestedRuntime => "block_on inside async code",
        PatternId::Unwrap => ".unwrap() panics on failure",
        PatternId::Expect => ".expect() with context (good pattern)",
        PatternId::QuestionMark => "? error propagation (good pattern)",
        PatternId::Panic => "panic! instead of returning an error",
        PatternId::MapErr => "map_err error conversion (good pattern)",
        PatternId::OkOr => "ok_or / ok_or_else Option-to-Result conversion (good pattern)",
        PatternId::UnnecessaryClone => "Clone passed straight into a call",
        PatternId::MoveInLoop => "Value moved with .into() inside a loop",
        PatternId::TempReference => "Reference to a temporary constructed in place",
        PatternId::BorrowConflict => "Shared and mutable borrows of one binding close together",
        PatternId::MissingDebug => "Type neither derives nor implements Debug",
        PatternId::MissingPairedCapability => "PartialEq/PartialOrd derived without Eq/Ord",
        PatternId::HashWithoutEq => "Hash derived without PartialEq + Eq",
        PatternId::OutdatedEdition => "Edition older than 2021",
        PatternId::MissingDescription => "Package has no description",
        PatternId::MissingLicense => "Package has no license",
        PatternId::MissingRepository => "Package has no repository URL",
        PatternId::NoErrorCrate => "Neither thiserror nor anyhow is a dependency",
        PatternId::SerdeWithoutDerive => "serde without the derive feature",
        PatternId::TokioWithoutFeatures => "tokio without explicit features",
        PatternId::NoReleaseProfile => "No [profile.release] table",
        PatternId::NoBenchmarkHarness => "No criterion or divan dev-dependency",
        PatternId::MissingSrcDir => "Project has no src directory",
        PatternId::MissingTestsDir => "Project has no tests directory",
        PatternId::MissingReadme => "Project has no README.md",
        PatternId::MissingGitignore => "Project has no .gitignore",
        PatternId::MissingLicenseFile => "Project has no LICENSE file",
        PatternId::AllowWithoutReason => "Allow directive on an error pattern without reason",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pattern_is_described() {
        for pattern in PatternId::ALL {
            assert!(!describe(*pattern).is_empty(), "{pattern} has no description");
        }
    }
}
