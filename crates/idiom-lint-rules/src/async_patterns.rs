//! Concurrency and async runtime idioms.
//!
//! # Detected Patterns
//!
//! | Code | Name | Gate | Severity |
//! |------|------|------|----------|
//! | IL101 | `blocking-sleep` | async | error |
//! | IL102 | `await-point` | | info (good) |
//! | IL103 | `spawn-task` | | info (good) |
//! | IL104 | `spawn-blocking` | | info (good) |
//! | IL105 | `sync-mutex` | async | warning |
//! | IL106 | `concurrent-join` | | info (good) |
//! | IL107 | `select-macro` | | info (good) |
//! | IL108 | `timeout` | | info (good) |
//! | IL109 | `unbounded-channel` | | warning |
//! | IL110 | `nested-runtime` | async | error |

use crate::catalogue::describe;
use crate::pattern_detector::PatternDetector;
use idiom_lint_core::{
    Construct, Detector, DetectorBox, Finding, LineContext, PatternId, Severity,
};

/// Returns the async detectors in code order.
#[must_use]
pub fn async_detectors() -> Vec<DetectorBox> {
    vec![
        Box::new(
            PatternDetector::contains(PatternId::BlockingSleep, Severity::Error, &["thread::sleep"])
                .within(Construct::Async)
                .message("Use tokio::time::sleep instead of std::thread::sleep in async context")
                .suggestion("Replace with tokio::time::sleep(duration).await"),
        ),
        Box::new(
            PatternDetector::contains(PatternId::AwaitPoint, Severity::Info, &[".await"])
                .message("Await point found"),
        ),
        Box::new(
            PatternDetector::contains(PatternId::SpawnTask, Severity::Info, &["tokio::spawn"])
                .message("Task spawning - ensure JoinHandle is handled"),
        ),
        Box::new(
            PatternDetector::contains(PatternId::SpawnBlocking, Severity::Info, &["spawn_blocking"])
                .message("Using spawn_blocking for blocking operations"),
        ),
        Box::new(SyncMutex::new()),
        Box::new(
            PatternDetector::contains(PatternId::ConcurrentJoin, Severity::Info, &["join!"])
                .message("Using join! for concurrent execution"),
        ),
        Box::new(
            PatternDetector::contains(PatternId::SelectMacro, Severity::Info, &["select!"])
                .message("Using select! for racing futures"),
        ),
        Box::new(
            PatternDetector::contains(PatternId::Timeout, Severity::Info, &["timeout(", "timeout::"])
                .message("Using timeout for async operations"),
        ),
        Box::new(
            PatternDetector::contains(
                PatternId::UnboundedChannel,
                Severity::Warning,
                &["unbounded_channel"],
            )
            .message("Consider using bounded channel to prevent memory issues")
            .suggestion("Use tokio::sync::mpsc::channel(capacity)"),
        ),
        Box::new(
            PatternDetector::contains(PatternId::NestedRuntime, Severity::Error, &["block_on"])
                .within(Construct::Async)
                .message("Avoid block_on inside async context - causes deadlock")
                .suggestion("Await the future directly"),
        ),
    ]
}

/// `.lock()` inside async code when the mutex is likely `std::sync::Mutex`.
///
/// Lines that name `Mutex` themselves are skipped, as is everything after
/// the first mention of `tokio::sync`.
#[derive(Debug, Clone)]
pub struct SyncMutex {
    severity: Severity,
}

impl Default for SyncMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncMutex {
    /// Creates the detector with warning severity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }
}

impl Detector for SyncMutex {
    fn pattern(&self) -> PatternId {
        PatternId::SyncMutex
    }

    fn description(&self) -> &'static str {
        describe(PatternId::SyncMutex)
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &LineContext<'_>) -> Vec<Finding> {
        let line = ctx.line;
        let hit = !line.is_comment()
            && ctx.is_active(Construct::Async)
            && !ctx.snapshot.async_sync_imported
            && line.raw.contains(".lock()")
            && !line.raw.contains("Mutex");

        if !hit {
            return Vec::new();
        }

        vec![ctx
            .finding(
                self.pattern(),
                self.severity,
                "Possible std::sync::Mutex in async - consider tokio::sync::Mutex",
            )
            .with_suggestion("Use tokio::sync::Mutex and lock().await across await points")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idiom_lint_core::{DetectorRegistry, SourceLines};

    fn check_code(code: &str) -> Vec<Finding> {
        let mut registry = DetectorRegistry::new();
        for detector in async_detectors() {
            registry.push(detector);
        }
        registry.scan(&SourceLines::parse(code))
    }

    fn patterns(findings: &[Finding]) -> Vec<PatternId> {
        findings.iter().map(|f| f.pattern).collect()
    }

    #[test]
    fn test_detects_blocking_sleep_in_async_fn() {
        let findings = check_code(
            r"
async fn handler() {
    std::thread::sleep(Duration::from_secs(1));
}
",
        );
        assert_eq!(patterns(&findings), vec![PatternId::BlockingSleep]);
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[0].line, 3);
    }

    #[test]
    fn test_allows_blocking_sleep_in_sync_fn() {
        let findings = check_code("fn main() {\n    std::thread::sleep(d);\n}");
        assert!(findings.is_empty());
    }

    #[test]
    fn test_positive_patterns() {
        let findings = check_code(
            r"
async fn run() {
    let (a, b) = tokio::join!(one(), two());
    let h = tokio::spawn(async move { work().await });
    tokio::time::timeout(d, fut).await;
}
",
        );
        let found = patterns(&findings);
        assert!(found.contains(&PatternId::ConcurrentJoin));
        assert!(found.contains(&PatternId::SpawnTask));
        assert!(found.contains(&PatternId::Timeout));
        assert_eq!(found.iter().filter(|p| **p == PatternId::AwaitPoint).count(), 2);
        assert!(findings.iter().all(Finding::is_positive));
    }

    #[test]
    fn test_sync_mutex_in_async() {
        let findings = check_code(
            r"
async fn update(state: &State) {
    let guard = state.data.lock().unwrap();
}
",
        );
        assert_eq!(patterns(&findings), vec![PatternId::SyncMutex]);
    }

    #[test]
    fn test_sync_mutex_skipped_after_tokio_sync() {
        let findings = check_code(
            r"
use tokio::sync::Mutex;

async fn update(state: &State) {
    let guard = state.data.lock();
}
",
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_sync_mutex_skips_lines_naming_mutex() {
        let findings = check_code("async fn f() {\n    let m = Mutex::new(0).lock();\n}");
        assert!(findings.is_empty());
    }

    #[test]
    fn test_unbounded_channel_anywhere() {
        let findings = check_code("let (tx, rx) = mpsc::unbounded_channel();");
        assert_eq!(patterns(&findings), vec![PatternId::UnboundedChannel]);
        assert_eq!(findings[0].severity, Severity::Warning);
    }

    #[test]
    fn test_nested_runtime_in_async_block() {
        let findings = check_code("let f = async move {\n    rt.block_on(inner());\n};");
        assert_eq!(patterns(&findings), vec![PatternId::NestedRuntime]);
    }
}
