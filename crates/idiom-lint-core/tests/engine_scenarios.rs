//! Integration test: the scan pipeline end-to-end via Analyzer.
//!
//! Detectors here are minimal stand-ins; the built-in catalogue is tested
//! in `idiom-lint-rules`.

use idiom_lint_core::{
    Analyzer, Construct, Detector, Finding, LineContext, PatternId, Severity, SourceLines,
};
use std::fs;

struct SleepInAsync;

impl Detector for SleepInAsync {
    fn pattern(&self) -> PatternId {
        PatternId::BlockingSleep
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &LineContext<'_>) -> Vec<Finding> {
        if ctx.is_active(Construct::Async) && ctx.line.trimmed.contains("thread::sleep") {
            vec![ctx.finding(self.pattern(), self.severity(), "blocking sleep")]
        } else {
            Vec::new()
        }
    }
}

struct EveryLine;

impl Detector for EveryLine {
    fn pattern(&self) -> PatternId {
        PatternId::AwaitPoint
    }

    fn check(&self, ctx: &LineContext<'_>) -> Vec<Finding> {
        vec![ctx.finding(self.pattern(), Severity::Info, "seen")]
    }
}

fn analyzer() -> Analyzer {
    Analyzer::builder()
        .detector(SleepInAsync)
        .build()
        .expect("analyzer should build")
}

// ── Scenarios ──

#[test]
fn blocking_sleep_inside_async_fn_is_one_error() {
    let text = "async fn f() {\n    std::thread::sleep(Duration::from_millis(10));\n}";
    let report = analyzer().analyze_source(text);

    let sleeps: Vec<&Finding> = report
        .findings
        .iter()
        .filter(|f| f.pattern == PatternId::BlockingSleep)
        .collect();
    assert_eq!(sleeps.len(), 1);
    assert_eq!(sleeps[0].severity, Severity::Error);
    assert_eq!(sleeps[0].line, 2);
}

#[test]
fn blocking_sleep_after_async_fn_closes_is_ignored() {
    let text = "async fn f() {\n    work().await;\n}\nfn g() {\n    std::thread::sleep(d);\n}";
    let report = analyzer().analyze_source(text);
    assert!(report
        .findings
        .iter()
        .all(|f| f.pattern != PatternId::BlockingSleep));
}

#[test]
fn partial_eq_without_eq_then_fixed() {
    let before = analyzer().analyze_source("#[derive(Debug, PartialEq)]\nstruct Point { x: i32 }");
    assert_eq!(before.findings.len(), 1);
    let finding = &before.findings[0];
    assert_eq!(finding.pattern, PatternId::MissingPairedCapability);
    assert_eq!(finding.severity, Severity::Info);
    assert!(finding.message.contains("PartialEq") && finding.message.contains(" Eq"));

    let after =
        analyzer().analyze_source("#[derive(Debug, PartialEq, Eq)]\nstruct Point { x: i32 }");
    assert!(after.findings.is_empty());
    assert_eq!(after.score, 100);
}

#[test]
fn statement_between_attribute_and_declaration_blocks_binding() {
    let text = "#[derive(Debug)]\nlet unrelated = 1;\n\n\nstruct Late;";
    let report = analyzer().analyze_source(text);
    let patterns: Vec<PatternId> = report.findings.iter().map(|f| f.pattern).collect();
    // the derive did not reach `Late`, so Debug is still missing
    assert_eq!(patterns, vec![PatternId::MissingDebug]);
}

// ── Properties ──

#[test]
fn every_line_number_is_in_bounds() {
    let text = "#[derive(Hash)]\nstruct K;\nasync fn f() {\n    std::thread::sleep(d);\n}\n\n";
    let line_count = SourceLines::parse(text).len();
    let analyzer = Analyzer::builder()
        .detector(SleepInAsync)
        .detector(EveryLine)
        .build()
        .expect("analyzer should build");

    let report = analyzer.analyze_source(text);
    assert!(!report.findings.is_empty());
    for finding in &report.findings {
        assert!(
            (1..=line_count).contains(&finding.line),
            "line {} out of 1..={line_count}",
            finding.line
        );
    }
}

#[test]
fn identical_input_gives_identical_report() {
    let text = "#[derive(PartialOrd)]\nenum E { A }\nasync fn f() {\n    thread::sleep(d);\n}";
    let analyzer = analyzer();
    assert_eq!(analyzer.analyze_source(text), analyzer.analyze_source(text));
}

#[test]
fn allow_directive_suppresses_with_reason() {
    let text = "async fn f() {\n    // idiom-lint: allow(blocking-sleep) reason=\"test shim\"\n    thread::sleep(d);\n}";
    let report = analyzer().analyze_source(text);
    assert!(report.findings.is_empty());
}

// ── Batch ──

#[test]
fn batch_run_merges_in_path_order_and_records_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let src = dir.path().join("src");
    fs::create_dir_all(&src).expect("mkdir");
    fs::write(src.join("b.rs"), "async fn b() {\n    thread::sleep(d);\n}\n").expect("write");
    fs::write(src.join("a.rs"), "async fn a() {\n\n    thread::sleep(d);\n}\n").expect("write");
    fs::write(src.join("bad.rs"), [0xff, 0xfe, 0x00]).expect("write");
    fs::write(src.join("notes.txt"), "thread::sleep").expect("write");

    let report = analyzer().analyze_path(dir.path()).expect("batch run");

    assert_eq!(report.files_checked, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("bad.rs"));

    let located: Vec<(String, usize)> = report
        .findings
        .iter()
        .map(|f| {
            let name = f
                .file
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            (name, f.line)
        })
        .collect();
    assert_eq!(
        located,
        vec![("a.rs".to_string(), 3), ("b.rs".to_string(), 2)]
    );
}

#[test]
fn gitignored_files_are_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join(".gitignore"), "ignored.rs\n").expect("write");
    fs::write(dir.path().join("ignored.rs"), "async fn x() {\n thread::sleep(d);\n}").expect("write");
    fs::write(dir.path().join("kept.rs"), "fn ok() {}\n").expect("write");

    let report = analyzer().analyze_path(dir.path()).expect("batch run");
    assert_eq!(report.files_checked, 1);
    assert!(report.findings.is_empty());
}
