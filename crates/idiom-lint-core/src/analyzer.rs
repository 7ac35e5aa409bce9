//! Core analyzer for orchestrating single-file, batch and project runs.

use crate::binder::{AttributeBinder, TypeScan};
use crate::config::{Config, ConfigError};
use crate::context::ProjectContext;
use crate::manifest::{Manifest, ManifestError};
use crate::registry::DetectorRegistry;
use crate::rule::{Detector, DetectorBox, ProjectRule, ProjectRuleBox, RuleError};
use crate::source::SourceLines;
use crate::synthesizer::SuggestionSynthesizer;
use crate::types::{Category, Finding, PatternId, Report, TypeSummary, UnitFailure};
use crate::utils::apply_allow_directives;

use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The input path does not exist.
    #[error("Input not found: {path}")]
    InputNotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// The input exists but could not be read as text.
    #[error("Failed to read {path}: {source}")]
    UnreadableInput {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Worker pool could not be created.
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Manifest error.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Detector construction error.
    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    detectors: Vec<DetectorBox>,
    project_rules: Vec<ProjectRuleBox>,
    exclude_patterns: Vec<String>,
    include_patterns: Vec<String>,
    config: Option<Config>,
    synthesizer: Option<SuggestionSynthesizer>,
    patterns: Option<HashSet<PatternId>>,
    categories: Option<HashSet<Category>>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a detector.
    #[must_use]
    pub fn detector<D: Detector + 'static>(mut self, detector: D) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    /// Adds a boxed detector.
    #[must_use]
    pub fn detector_box(mut self, detector: DetectorBox) -> Self {
        self.detectors.push(detector);
        self
    }

    /// Adds a project-wide rule.
    #[must_use]
    pub fn project_rule<R: ProjectRule + 'static>(mut self, rule: R) -> Self {
        self.project_rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed project-wide rule.
    #[must_use]
    pub fn project_rule_box(mut self, rule: ProjectRuleBox) -> Self {
        self.project_rules.push(rule);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds an include glob pattern.
    #[must_use]
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_patterns.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the default capability table.
    #[must_use]
    pub fn synthesizer(mut self, synthesizer: SuggestionSynthesizer) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Reports only the given patterns.
    #[must_use]
    pub fn only_patterns(mut self, patterns: impl IntoIterator<Item = PatternId>) -> Self {
        self.patterns = Some(patterns.into_iter().collect());
        self
    }

    /// Reports only patterns in the given categories.
    #[must_use]
    pub fn only_categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories = Some(categories.into_iter().collect());
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob pattern is invalid or a binder pattern
    /// fails to compile.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());
        let mut include_patterns = self.include_patterns;
        include_patterns.extend(config.analyzer.include.iter().cloned());

        let exclude = compile_globs(&exclude_patterns)?;
        let include = compile_globs(&include_patterns)?;

        let mut registry = DetectorRegistry::new();
        for detector in self.detectors {
            registry.push(detector);
        }

        let unknown = config.unknown_rules();
        if !unknown.is_empty() {
            warn!("Unknown rules in configuration: {}", unknown.join(", "));
        }

        Ok(Analyzer {
            registry,
            project_rules: self.project_rules,
            binder: AttributeBinder::new()?,
            synthesizer: self.synthesizer.unwrap_or_default(),
            exclude,
            include,
            patterns: self.patterns,
            categories: self.categories,
            config,
        })
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<glob::Pattern>, AnalyzerError> {
    patterns
        .iter()
        .map(|p| glob::Pattern::new(p).map_err(AnalyzerError::from))
        .collect()
}

/// The main analyzer that orchestrates detector execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    registry: DetectorRegistry,
    project_rules: Vec<ProjectRuleBox>,
    binder: AttributeBinder,
    synthesizer: SuggestionSynthesizer,
    exclude: Vec<glob::Pattern>,
    include: Vec<glob::Pattern>,
    patterns: Option<HashSet<PatternId>>,
    categories: Option<HashSet<Category>>,
    config: Config,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the number of registered detectors and project rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.registry.len() + self.project_rules.len()
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyzes in-memory text as one unit.
    #[must_use]
    pub fn analyze_source(&self, text: &str) -> Report {
        let (findings, types) = self.scan_unit(text);
        Report::new(findings, 1, Vec::new(), &self.config.score).with_types(types)
    }

    /// Runs every stage over `text`: detectors, synthesized advisories,
    /// severity overrides, allow directives, then configuration filters.
    ///
    /// Overrides land before allow directives, so a pattern raised to error
    /// in config needs a reason to be allowed.
    #[must_use]
    pub fn scan_source(&self, text: &str) -> Vec<Finding> {
        self.scan_unit(text).0
    }

    fn scan_unit(&self, text: &str) -> (Vec<Finding>, Vec<TypeSummary>) {
        let lines = SourceLines::parse(text);

        let mut findings = self.registry.scan(&lines);
        let types = self.binder.scan(&lines);
        findings.extend(self.synthesizer.synthesize(
            &types.declarations,
            &types.bindings,
            &types.implementations,
        ));

        let findings = self.apply_overrides(findings);
        let findings = apply_allow_directives(findings, &lines);
        (self.finalize(findings), type_summaries(&types))
    }

    /// Analyzes a file, or every source file under a directory.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::InputNotFound`] if `path` does not exist,
    /// and propagates file or walk errors.
    pub fn analyze_path(&self, path: &Path) -> Result<Report, AnalyzerError> {
        if !path.exists() {
            return Err(AnalyzerError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        if path.is_dir() {
            self.analyze_dir(path)
        } else {
            self.analyze_file(path)
        }
    }

    /// Analyzes a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or not readable as UTF-8 text.
    pub fn analyze_file(&self, path: &Path) -> Result<Report, AnalyzerError> {
        let (findings, types) = self.scan_file(path)?;
        Ok(Report::new(findings, 1, Vec::new(), &self.config.score).with_types(types))
    }

    fn scan_file(&self, path: &Path) -> Result<UnitScan, AnalyzerError> {
        debug!("Analyzing: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                AnalyzerError::InputNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                AnalyzerError::UnreadableInput {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let (findings, types) = self.scan_unit(&content);
        Ok((
            findings.into_iter().map(|f| f.with_file(path)).collect(),
            types
                .into_iter()
                .map(|t| TypeSummary {
                    file: Some(path.to_path_buf()),
                    ..t
                })
                .collect(),
        ))
    }

    /// Analyzes every discovered source file under `root` in parallel.
    ///
    /// Findings are merged in sorted path order. Entries the walk cannot
    /// visit and files that cannot be read are recorded as failures and do
    /// not stop the run.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker pool cannot start.
    pub fn analyze_dir(&self, root: &Path) -> Result<Report, AnalyzerError> {
        info!("Starting analysis at {}", root.display());

        let (files, mut failures) = self.discover_files(root);
        info!("Found {} files to analyze", files.len());

        let outcomes = self.run_parallel(&files)?;

        let mut findings = Vec::new();
        let mut types = Vec::new();
        let mut files_checked = 0;
        for (path, outcome) in files.iter().zip(outcomes) {
            match outcome {
                Ok((file_findings, file_types)) => {
                    findings.extend(file_findings);
                    types.extend(file_types);
                    files_checked += 1;
                }
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    failures.push(UnitFailure {
                        path: path.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Analysis complete: {} findings in {} files",
            findings.len(),
            files_checked
        );

        Ok(Report::new(findings, files_checked, failures, &self.config.score).with_types(types))
    }

    fn run_parallel(
        &self,
        files: &[PathBuf],
    ) -> Result<Vec<Result<UnitScan, AnalyzerError>>, AnalyzerError> {
        let scan = || -> Vec<Result<UnitScan, AnalyzerError>> {
            files.par_iter().map(|path| self.scan_file(path)).collect()
        };

        match self.config.analyzer.parallelism {
            Some(threads) if threads > 0 => {
                debug!("Using {threads} worker threads");
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?;
                Ok(pool.install(scan))
            }
            _ => Ok(scan()),
        }
    }

    /// Analyzes a project's `Cargo.toml` and directory layout.
    ///
    /// `path` may be the project directory or the manifest itself.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::InputNotFound`] if no manifest exists, or a
    /// manifest error if it cannot be read or decoded.
    pub fn analyze_project(&self, path: &Path) -> Result<Report, AnalyzerError> {
        let (root, manifest_path) = if path.is_dir() {
            (path.to_path_buf(), path.join("Cargo.toml"))
        } else {
            let root = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            (root, path.to_path_buf())
        };

        if !manifest_path.is_file() {
            return Err(AnalyzerError::InputNotFound {
                path: manifest_path,
            });
        }

        info!("Analyzing project at {}", root.display());
        let manifest = Manifest::from_file(&manifest_path)?;
        let ctx = ProjectContext::new(&root).with_manifest(&manifest);

        let mut findings = Vec::new();
        for rule in &self.project_rules {
            debug!("Running project rule: {}", rule.name());
            findings.extend(rule.check_project(&ctx).into_iter().map(|f| {
                if f.pattern.category() == Category::Manifest {
                    f.with_file(&manifest_path)
                } else {
                    f.with_file(&root)
                }
            }));
        }

        Ok(
            Report::new(self.finalize(findings), 1, Vec::new(), &self.config.score)
                .with_project(manifest.summary()),
        )
    }

    /// Applies pattern/category filters and configuration overrides.
    fn finalize(&self, findings: Vec<Finding>) -> Vec<Finding> {
        let findings = findings
            .into_iter()
            .filter(|f| self.is_reported(f.pattern))
            .collect();
        self.apply_overrides(findings)
    }

    fn apply_overrides(&self, findings: Vec<Finding>) -> Vec<Finding> {
        findings
            .into_iter()
            .map(|mut f| {
                if let Some(severity) = self.config.pattern_severity(f.pattern) {
                    f.severity = severity;
                }
                f
            })
            .collect()
    }

    fn is_reported(&self, pattern: PatternId) -> bool {
        if !self.config.is_pattern_enabled(pattern) {
            return false;
        }
        // suppression warnings follow whatever they replaced
        if pattern == PatternId::AllowWithoutReason {
            return true;
        }
        let by_pattern = self.patterns.as_ref().map_or(true, |p| p.contains(&pattern));
        let by_category = self
            .categories
            .as_ref()
            .map_or(true, |c| c.contains(&pattern.category()));
        by_pattern && by_category
    }

    /// Discovers source files under `root`, sorted by path, along with the
    /// entries the walk could not visit.
    fn discover_files(&self, root: &Path) -> (Vec<PathBuf>, Vec<UnitFailure>) {
        let mut builder = ignore::WalkBuilder::new(root);
        builder
            .hidden(false)
            .git_ignore(self.config.analyzer.respect_gitignore)
            .git_exclude(self.config.analyzer.respect_gitignore)
            .require_git(false);

        let mut files = Vec::new();
        let mut failures = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let failure = walk_failure(root, &e);
                    warn!("Skipping {}: {}", failure.path.display(), failure.message);
                    failures.push(failure);
                    continue;
                }
            };
            let path = entry.path();

            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("rs") {
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(path);
            if self.should_exclude(relative) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        (files, failures)
    }

    /// Checks a root-relative path against include and exclude globs.
    fn should_exclude(&self, relative: &Path) -> bool {
        let options = glob::MatchOptions {
            require_literal_separator: false,
            ..glob::MatchOptions::default()
        };
        // `**/target/**` should also match a top-level `target/`
        let anchored = Path::new("/").join(relative);

        let matches = |pattern: &glob::Pattern| {
            pattern.matches_path_with(relative, options)
                || pattern.matches_path_with(&anchored, options)
        };

        if self.exclude.iter().any(matches) {
            return true;
        }
        !self.include.is_empty() && !self.include.iter().any(matches)
    }
}

type UnitScan = (Vec<Finding>, Vec<TypeSummary>);

fn type_summaries(scan: &TypeScan) -> Vec<TypeSummary> {
    scan.declarations
        .iter()
        .map(|decl| TypeSummary {
            name: decl.name.clone(),
            kind: decl.kind.to_string(),
            line: decl.line,
            derives: scan
                .bindings
                .get(&decl.name)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default(),
            file: None,
        })
        .collect()
}

fn walk_failure(root: &Path, err: &ignore::Error) -> UnitFailure {
    UnitFailure {
        path: walk_error_path(err).unwrap_or(root).to_path_buf(),
        message: err.to_string(),
    }
}

fn walk_error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::Loop { child, .. } => Some(child),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            walk_error_path(err)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::LineContext;
    use crate::types::Severity;

    struct UnwrapDetector;

    impl Detector for UnwrapDetector {
        fn pattern(&self) -> PatternId {
            PatternId::Unwrap
        }

        fn check(&self, ctx: &LineContext<'_>) -> Vec<Finding> {
            if ctx.line.trimmed.contains(".unwrap()") {
                vec![ctx.finding(self.pattern(), self.severity(), "unwrap")]
            } else {
                Vec::new()
            }
        }
    }

    fn analyzer(config: Config) -> Analyzer {
        Analyzer::builder()
            .detector(UnwrapDetector)
            .config(config)
            .build()
            .unwrap()
    }

    #[test]
    fn test_exclude_patterns() {
        let analyzer = Analyzer::builder()
            .exclude("**/generated/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.should_exclude(Path::new("target/debug/build.rs")));
        assert!(analyzer.should_exclude(Path::new("crates/a/target/x.rs")));
        assert!(analyzer.should_exclude(Path::new("src/generated/api.rs")));
        assert!(!analyzer.should_exclude(Path::new("src/lib.rs")));
    }

    #[test]
    fn test_invalid_glob_is_error() {
        let result = Analyzer::builder().exclude("[unclosed").build();
        assert!(matches!(result, Err(AnalyzerError::Glob(_))));
    }

    #[test]
    fn test_source_combines_detectors_and_synthesizer() {
        let report = analyzer(Config::default()).analyze_source("struct A;\nfn f() { x.unwrap(); }");
        let patterns: Vec<PatternId> = report.findings.iter().map(|f| f.pattern).collect();
        assert_eq!(patterns, vec![PatternId::Unwrap, PatternId::MissingDebug]);
        assert_eq!(report.score, 100 - 5 - 15);
    }

    #[test]
    fn test_severity_override_and_disable() {
        let config = Config::parse(
            "[rules.unwrap]\nseverity = \"error\"\n[rules.missing-debug]\nenabled = false\n",
        )
        .unwrap();
        let report = analyzer(config).analyze_source("struct A;\nx.unwrap();");
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].severity, Severity::Error);
    }

    #[test]
    fn test_raised_severity_needs_allow_reason() {
        let config = Config::parse("[rules.unwrap]\nseverity = \"error\"\n").unwrap();
        let report = analyzer(config)
            .analyze_source("fn f() { x.unwrap(); } // idiom-lint: allow(unwrap)\n");
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].pattern, PatternId::AllowWithoutReason);
        assert_eq!(report.findings[0].severity, Severity::Warning);
    }

    #[test]
    fn test_report_lists_declared_types() {
        let report = analyzer(Config::default())
            .analyze_source("#[derive(Debug, Clone)]\npub struct A;\nenum B { X }\n");
        let types: Vec<(&str, &str, Vec<&str>)> = report
            .types
            .iter()
            .map(|t| {
                (
                    t.name.as_str(),
                    t.kind.as_str(),
                    t.derives.iter().map(String::as_str).collect(),
                )
            })
            .collect();
        assert_eq!(
            types,
            vec![("A", "struct", vec!["Clone", "Debug"]), ("B", "enum", vec![])]
        );
    }

    #[test]
    fn test_category_filter() {
        let analyzer = Analyzer::builder()
            .detector(UnwrapDetector)
            .only_categories([Category::Traits])
            .build()
            .unwrap();
        let report = analyzer.analyze_source("struct A;\nx.unwrap();");
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].pattern, PatternId::MissingDebug);
    }

    #[test]
    fn test_walk_error_becomes_failure() {
        let err = ignore::Error::WithDepth {
            depth: 2,
            err: Box::new(ignore::Error::WithPath {
                path: PathBuf::from("src/locked"),
                err: Box::new(ignore::Error::Io(std::io::Error::from(
                    std::io::ErrorKind::PermissionDenied,
                ))),
            }),
        };
        let failure = walk_failure(Path::new("."), &err);
        assert_eq!(failure.path, PathBuf::from("src/locked"));
        assert!(failure.message.contains("src/locked"));

        let bare = ignore::Error::Io(std::io::Error::from(std::io::ErrorKind::Other));
        assert_eq!(walk_failure(Path::new("root"), &bare).path, PathBuf::from("root"));
    }

    #[test]
    fn test_directory_scan_keeps_going() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn f() { x.unwrap(); }\n").unwrap();
        std::fs::write(dir.path().join("b.rs"), [0xff, 0xfe, 0x00]).unwrap();

        let report = analyzer(Config::default()).analyze_path(dir.path()).unwrap();
        assert_eq!(report.files_checked, 1);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.ends_with("b.rs"));
    }

    #[test]
    fn test_missing_input_is_reported() {
        let err = analyzer(Config::default())
            .analyze_path(Path::new("/definitely/not/here.rs"))
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::InputNotFound { .. }));
    }
}
