//! Core types for findings and reports.

use crate::score::{ScoreWeights, SeverityCounts};
use miette::{Diagnostic, LabeledSpan, SourceSpan};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Maximum number of characters kept in a finding snippet.
pub const MAX_SNIPPET_CHARS: usize = 80;

/// Severity level for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, or a positive pattern.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl Severity {
    /// Parses a severity from its lowercase name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Idiom family a pattern belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Concurrency and async runtime idioms.
    Async,
    /// Resource-safety and error propagation idioms.
    ErrorHandling,
    /// Ownership and borrowing idioms.
    Ownership,
    /// Trait derivation idioms.
    Traits,
    /// Dependency manifest idioms.
    Manifest,
    /// Project layout conventions.
    Layout,
    /// Inline suppression directives.
    Suppression,
}

impl Category {
    /// All categories in display order.
    pub const ALL: &'static [Self] = &[
        Self::Async,
        Self::ErrorHandling,
        Self::Ownership,
        Self::Traits,
        Self::Manifest,
        Self::Layout,
        Self::Suppression,
    ];

    /// Returns the short name used on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Async => "async",
            Self::ErrorHandling => "errors",
            Self::Ownership => "ownership",
            Self::Traits => "traits",
            Self::Manifest => "manifest",
            Self::Layout => "layout",
            Self::Suppression => "suppression",
        }
    }

    /// Parses a category from its short name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier of every pattern the analyzer can report.
///
/// Adding a detector means adding a variant here; rendering and scoring
/// match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternId {
    /// `std::thread::sleep` inside async code.
    BlockingSleep,
    /// An `.await` point.
    AwaitPoint,
    /// `tokio::spawn` task creation.
    SpawnTask,
    /// `spawn_blocking` offloading.
    SpawnBlocking,
    /// A synchronous mutex locked inside async code.
    SyncMutex,
    /// `join!` concurrent execution.
    ConcurrentJoin,
    /// `select!` racing futures.
    SelectMacro,
    /// Timeout around an async operation.
    Timeout,
    /// Unbounded channel creation.
    UnboundedChannel,
    /// `block_on` inside async code.
    NestedRuntime,
    /// `.unwrap()` call.
    Unwrap,
    /// `.expect(..)` call.
    Expect,
    /// `?` propagation.
    QuestionMark,
    /// `panic!` invocation.
    Panic,
    /// `.map_err(..)` conversion.
    MapErr,
    /// `.ok_or(..)` / `.ok_or_else(..)` conversion.
    OkOr,
    /// `.clone()` passed straight into a call.
    UnnecessaryClone,
    /// `.into()` move inside a loop body.
    MoveInLoop,
    /// Reference taken to a freshly constructed temporary.
    TempReference,
    /// Shared and mutable borrows of the same binding close together.
    BorrowConflict,
    /// Declaration without the baseline `Debug` capability.
    MissingDebug,
    /// Capability derived without its conventional companion.
    MissingPairedCapability,
    /// `Hash` derived without `PartialEq` + `Eq`.
    HashWithoutEq,
    /// Edition older than 2021.
    OutdatedEdition,
    /// Package without `description`.
    MissingDescription,
    /// Package without `license`.
    MissingLicense,
    /// Package without `repository`.
    MissingRepository,
    /// Neither `thiserror` nor `anyhow` among dependencies.
    NoErrorCrate,
    /// `serde` without the `derive` feature.
    SerdeWithoutDerive,
    /// `tokio` without explicit features.
    TokioWithoutFeatures,
    /// No `[profile.release]` table.
    NoReleaseProfile,
    /// No benchmarking dev-dependency.
    NoBenchmarkHarness,
    /// Missing `src/` directory.
    MissingSrcDir,
    /// Missing `tests/` directory.
    MissingTestsDir,
    /// Missing `README.md`.
    MissingReadme,
    /// Missing `.gitignore`.
    MissingGitignore,
    /// Missing license file.
    MissingLicenseFile,
    /// Allow directive for an error pattern without a reason.
    AllowWithoutReason,
}

impl PatternId {
    /// Every pattern, in code order.
    pub const ALL: &'static [Self] = &[
        Self::BlockingSleep,
        Self::AwaitPoint,
        Self::SpawnTask,
        Self::SpawnBlocking,
        Self::SyncMutex,
        Self::ConcurrentJoin,
        Self::SelectMacro,
        Self::Timeout,
        Self::UnboundedChannel,
        Self::NestedRuntime,
        Self::Unwrap,
        Self::Expect,
        Self::QuestionMark,
        Self::Panic,
        Self::MapErr,
        Self::OkOr,
        Self::UnnecessaryClone,
        Self::MoveInLoop,
        Self::TempReference,
        Self::BorrowConflict,
        Self::MissingDebug,
        Self::MissingPairedCapability,
        Self::HashWithoutEq,
        Self::OutdatedEdition,
        Self::MissingDescription,
        Self::MissingLicense,
        Self::MissingRepository,
        Self::NoErrorCrate,
        Self::SerdeWithoutDerive,
        Self::TokioWithoutFeatures,
        Self::NoReleaseProfile,
        Self::NoBenchmarkHarness,
        Self::MissingSrcDir,
        Self::MissingTestsDir,
        Self::MissingReadme,
        Self::MissingGitignore,
        Self::MissingLicenseFile,
        Self::AllowWithoutReason,
    ];

    /// Returns the kebab-case name (e.g., "blocking-sleep").
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::BlockingSleep => "blocking-sleep",
            Self::AwaitPoint => "await-point",
            Self::SpawnTask => "spawn-task",
            Self::SpawnBlocking => "spawn-blocking",
            Self::SyncMutex => "sync-mutex",
            Self::ConcurrentJoin => "concurrent-join",
            Self::SelectMacro => "select-macro",
            Self::Timeout => "timeout",
            Self::UnboundedChannel => "unbounded-channel",
            Self::NestedRuntime => "nested-runtime",
            Self::Unwrap => "unwrap",
            Self::Expect => "expect",
            Self::QuestionMark => "question-mark",
            Self::Panic => "panic",
            Self::MapErr => "map-err",
            Self::OkOr => "ok-or",
            Self::UnnecessaryClone => "unnecessary-clone",
            Self::MoveInLoop => "move-in-loop",
            Self::TempReference => "temp-reference",
            Self::BorrowConflict => "borrow-conflict",
            Self::MissingDebug => "missing-debug",
            Self::MissingPairedCapability => "missing-paired-capability",
            Self::HashWithoutEq => "hash-without-eq",
            Self::OutdatedEdition => "outdated-edition",
            Self::MissingDescription => "missing-description",
            Self::MissingLicense => "missing-license",
            Self::MissingRepository => "missing-repository",
            Self::NoErrorCrate => "no-error-crate",
            Self::SerdeWithoutDerive => "serde-without-derive",
            Self::TokioWithoutFeatures => "tokio-without-features",
            Self::NoReleaseProfile => "no-release-profile",
            Self::NoBenchmarkHarness => "no-benchmark-harness",
            Self::MissingSrcDir => "missing-src-dir",
            Self::MissingTestsDir => "missing-tests-dir",
            Self::MissingReadme => "missing-readme",
            Self::MissingGitignore => "missing-gitignore",
            Self::MissingLicenseFile => "missing-license-file",
            Self::AllowWithoutReason => "allow-without-reason",
        }
    }

    /// Returns the stable rule code (e.g., "IL101").
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::BlockingSleep => "IL101",
            Self::AwaitPoint => "IL102",
            Self::SpawnTask => "IL103",
            Self::SpawnBlocking => "IL104",
            Self::SyncMutex => "IL105",
            Self::ConcurrentJoin => "IL106",
            Self::SelectMacro => "IL107",
            Self::Timeout => "IL108",
            Self::UnboundedChannel => "IL109",
            Self::NestedRuntime => "IL110",
            Self::Unwrap => "IL201",
            Self::Expect => "IL202",
            Self::QuestionMark => "IL203",
            Self::Panic => "IL204",
            Self::MapErr => "IL205",
            Self::OkOr => "IL206",
            Self::UnnecessaryClone => "IL301",
            Self::MoveInLoop => "IL302",
            Self::TempReference => "IL303",
            Self::BorrowConflict => "IL304",
            Self::MissingDebug => "IL401",
            Self::MissingPairedCapability => "IL402",
            Self::HashWithoutEq => "IL403",
            Self::OutdatedEdition => "IL501",
            Self::MissingDescription => "IL502",
            Self::MissingLicense => "IL503",
            Self::MissingRepository => "IL504",
            Self::NoErrorCrate => "IL505",
            Self::SerdeWithoutDerive => "IL506",
            Self::TokioWithoutFeatures => "IL507",
            Self::NoReleaseProfile => "IL508",
            Self::NoBenchmarkHarness => "IL509",
            Self::MissingSrcDir => "IL601",
            Self::MissingTestsDir => "IL602",
            Self::MissingReadme => "IL603",
            Self::MissingGitignore => "IL604",
            Self::MissingLicenseFile => "IL605",
            Self::AllowWithoutReason => "IL900",
        }
    }

    /// Returns the idiom family of this pattern.
    #[must_use]
    pub fn category(self) -> Category {
        match self {
            Self::BlockingSleep
            | Self::AwaitPoint
            | Self::SpawnTask
            | Self::SpawnBlocking
            | Self::SyncMutex
            | Self::ConcurrentJoin
            | Self::SelectMacro
            | Self::Timeout
            | Self::UnboundedChannel
            | Self::NestedRuntime => Category::Async,
            Self::Unwrap
            | Self::Expect
            | Self::QuestionMark
            | Self::Panic
            | Self::MapErr
            | Self::OkOr => Category::ErrorHandling,
            Self::UnnecessaryClone
            | Self::MoveInLoop
            | Self::TempReference
            | Self::BorrowConflict => Category::Ownership,
            Self::MissingDebug | Self::MissingPairedCapability | Self::HashWithoutEq => {
                Category::Traits
            }
            Self::OutdatedEdition
            | Self::MissingDescription
            | Self::MissingLicense
            | Self::MissingRepository
            | Self::NoErrorCrate
            | Self::SerdeWithoutDerive
            | Self::TokioWithoutFeatures
            | Self::NoReleaseProfile
            | Self::NoBenchmarkHarness => Category::Manifest,
            Self::MissingSrcDir
            | Self::MissingTestsDir
            | Self::MissingReadme
            | Self::MissingGitignore
            | Self::MissingLicenseFile => Category::Layout,
            Self::AllowWithoutReason => Category::Suppression,
        }
    }

    /// Whether this pattern marks good practice rather than a problem.
    ///
    /// Positive findings earn a score bonus and are never penalised.
    #[must_use]
    pub fn is_positive(self) -> bool {
        match self {
            Self::AwaitPoint
            | Self::SpawnTask
            | Self::SpawnBlocking
            | Self::ConcurrentJoin
            | Self::SelectMacro
            | Self::Timeout
            | Self::Expect
            | Self::QuestionMark
            | Self::MapErr
            | Self::OkOr => true,
            Self::BlockingSleep
            | Self::SyncMutex
            | Self::UnboundedChannel
            | Self::NestedRuntime
            | Self::Unwrap
            | Self::Panic
            | Self::UnnecessaryClone
            | Self::MoveInLoop
            | Self::TempReference
            | Self::BorrowConflict
            | Self::MissingDebug
            | Self::MissingPairedCapability
            | Self::HashWithoutEq
            | Self::OutdatedEdition
            | Self::MissingDescription
            | Self::MissingLicense
            | Self::MissingRepository
            | Self::NoErrorCrate
            | Self::SerdeWithoutDerive
            | Self::TokioWithoutFeatures
            | Self::NoReleaseProfile
            | Self::NoBenchmarkHarness
            | Self::MissingSrcDir
            | Self::MissingTestsDir
            | Self::MissingReadme
            | Self::MissingGitignore
            | Self::MissingLicenseFile
            | Self::AllowWithoutReason => false,
        }
    }

    /// Looks up a pattern by kebab-case name or rule code.
    #[must_use]
    pub fn lookup(name_or_code: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name() == name_or_code || p.code() == name_or_code)
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One reported observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Pattern that produced this finding.
    pub pattern: PatternId,
    /// Severity of this finding.
    pub severity: Severity,
    /// File the finding belongs to, set for batch and project runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Line number (1-indexed); 0 for file-level findings.
    pub line: usize,
    /// Bounded excerpt of the offending text.
    pub snippet: String,
    /// Human-readable message.
    pub message: String,
    /// Optional remediation advice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Finding {
    /// Creates a new finding without snippet or suggestion.
    #[must_use]
    pub fn new(
        pattern: PatternId,
        severity: Severity,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            pattern,
            severity,
            file: None,
            line,
            snippet: String::new(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Sets the snippet, truncated to [`MAX_SNIPPET_CHARS`] characters.
    #[must_use]
    pub fn with_snippet(mut self, text: &str) -> Self {
        self.snippet = text.chars().take(MAX_SNIPPET_CHARS).collect();
        self
    }

    /// Adds remediation advice.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attaches the file this finding belongs to.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Returns the rule code of the pattern.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.pattern.code()
    }

    /// Whether the finding marks a good pattern.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.pattern.is_positive()
    }

    /// Formats the finding for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!("{} {} at {}\n", self.code(), self.pattern, self.location());
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        if !self.snippet.is_empty() {
            let _ = writeln!(output, "  | {}", self.snippet);
        }
        if let Some(suggestion) = &self.suggestion {
            let _ = writeln!(output, "  = help: {suggestion}");
        }
        output
    }

    fn location(&self) -> String {
        match &self.file {
            Some(file) if self.line > 0 => format!("{}:{}", file.display(), self.line),
            Some(file) => file.display().to_string(),
            None => format!("line {}", self.line),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.location(),
            self.severity,
            self.code(),
            self.message
        )
    }
}

/// A finding rendered as a miette diagnostic against its source text.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct FindingDiagnostic {
    code: &'static str,
    message: String,
    help: Option<String>,
    severity: Severity,
    span: SourceSpan,
    label: &'static str,
}

impl FindingDiagnostic {
    /// Builds a diagnostic whose label covers the finding's trimmed line.
    ///
    /// File-level findings (line 0) get an empty span at the start of `content`.
    #[must_use]
    pub fn new(finding: &Finding, content: &str) -> Self {
        Self {
            code: finding.code(),
            message: finding.message.clone(),
            help: finding.suggestion.clone(),
            severity: finding.severity,
            span: line_span(content, finding.line),
            label: finding.pattern.name(),
        }
    }
}

impl Diagnostic for FindingDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
            Severity::Info => miette::Severity::Advice,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(self.label.to_string()),
            self.span,
        ))))
    }
}

/// Byte span of the trimmed content of a 1-indexed line.
fn line_span(content: &str, line: usize) -> SourceSpan {
    if line == 0 {
        return SourceSpan::from((0, 0));
    }

    let mut offset = 0;
    for (i, text) in content.split('\n').enumerate() {
        if i + 1 == line {
            let text = text.trim_end_matches('\r');
            let indent = text.len() - text.trim_start().len();
            return SourceSpan::from((offset + indent, text.trim().len()));
        }
        offset += text.len() + 1;
    }

    SourceSpan::from((0, 0))
}

/// A unit that could not be analyzed during a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFailure {
    /// Path of the unit.
    pub path: PathBuf,
    /// Why it was skipped.
    pub message: String,
}

/// A declared type and the capabilities derived on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSummary {
    /// Declared name.
    pub name: String,
    /// `struct` or `enum`.
    pub kind: String,
    /// Line of the declaration keyword.
    pub line: usize,
    /// Derived capabilities, sorted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub derives: Vec<String>,
    /// File the type was found in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// One dependency line of a project summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySummary {
    /// Crate name.
    pub name: String,
    /// Version requirement, or `workspace` when inherited.
    pub version: String,
    /// Listed under `[dev-dependencies]`.
    #[serde(default)]
    pub dev: bool,
}

/// Package facts reported alongside manifest findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Package name.
    pub name: String,
    /// Package version.
    pub version: String,
    /// Edition.
    pub edition: String,
    /// License, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Normal then dev dependencies, each sorted by name.
    #[serde(default)]
    pub dependencies: Vec<DependencySummary>,
}

/// Scored result of analyzing one unit or a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Findings in discovery order.
    pub findings: Vec<Finding>,
    /// Findings tallied by severity and polarity.
    pub counts: SeverityCounts,
    /// Score in `0..=100`.
    pub score: u8,
    /// Number of units analyzed successfully.
    pub files_checked: usize,
    /// Units skipped because they could not be read.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<UnitFailure>,
    /// Declared types, for source scans.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeSummary>,
    /// Package facts, for project scans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectSummary>,
}

impl Report {
    /// Tallies and scores `findings`.
    #[must_use]
    pub fn new(
        findings: Vec<Finding>,
        files_checked: usize,
        failures: Vec<UnitFailure>,
        weights: &ScoreWeights,
    ) -> Self {
        let counts = SeverityCounts::tally(&findings);
        Self {
            score: weights.score(&counts),
            findings,
            counts,
            files_checked,
            failures,
            types: Vec::new(),
            project: None,
        }
    }

    /// Attaches the declared types found by the scan.
    #[must_use]
    pub fn with_types(mut self, types: Vec<TypeSummary>) -> Self {
        self.types = types;
        self
    }

    /// Attaches package facts.
    #[must_use]
    pub fn with_project(mut self, project: ProjectSummary) -> Self {
        self.project = Some(project);
        self
    }

    /// Returns true if there are any error findings.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.counts.errors > 0
    }

    /// Checks if any finding meets or exceeds the given severity.
    ///
    /// Positive findings never count toward the threshold.
    #[must_use]
    pub fn has_findings_at(&self, severity: Severity) -> bool {
        self.findings
            .iter()
            .any(|f| !f.is_positive() && f.severity >= severity)
    }

    /// Returns findings with exactly the given severity, positives excluded.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| !f.is_positive() && f.severity == severity)
            .collect()
    }

    /// Returns the positive findings.
    #[must_use]
    pub fn positives(&self) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.is_positive()).collect()
    }

    /// One-line summary of counts and score.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Found {} error(s), {} warning(s), {} info(s), {} good pattern(s) in {} file(s); score {}/100",
            self.counts.errors,
            self.counts.warnings,
            self.counts.infos,
            self.counts.positives,
            self.files_checked,
            self.score,
        );
        if !self.failures.is_empty() {
            use std::fmt::Write;
            let _ = write!(summary, "; {} file(s) skipped", self.failures.len());
        }
        summary
    }
}
