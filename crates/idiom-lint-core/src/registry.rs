//! Ordered detector table and the single forward scan.

use crate::context::LineContext;
use crate::rule::{Detector, DetectorBox};
use crate::source::SourceLines;
use crate::tracker::ContextTracker;
use crate::types::{Finding, PatternId};

/// Detectors in registration order.
#[derive(Default)]
pub struct DetectorRegistry {
    detectors: Vec<DetectorBox>,
}

impl DetectorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a detector.
    #[must_use]
    pub fn with<D: Detector + 'static>(mut self, detector: D) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    /// Adds a boxed detector.
    pub fn push(&mut self, detector: DetectorBox) {
        self.detectors.push(detector);
    }

    /// Number of detectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    /// Whether no detector is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Iterates over detectors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Detector> {
        self.detectors.iter().map(AsRef::as_ref)
    }

    /// Keeps only detectors for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&dyn Detector) -> bool) {
        self.detectors.retain(|d| keep(d.as_ref()));
    }

    /// Patterns of the registered detectors.
    #[must_use]
    pub fn patterns(&self) -> Vec<PatternId> {
        self.iter().map(Detector::pattern).collect()
    }

    /// Scans `lines` once, front to back.
    ///
    /// Findings are grouped by detector in registration order and, within a
    /// detector, ordered by line.
    #[must_use]
    pub fn scan(&self, lines: &SourceLines) -> Vec<Finding> {
        let mut buckets: Vec<Vec<Finding>> = vec![Vec::new(); self.detectors.len()];
        let mut tracker = ContextTracker::new();

        for line in lines {
            let snapshot = tracker.advance(line);
            let ctx = LineContext::new(line, snapshot, lines);
            for (bucket, detector) in buckets.iter_mut().zip(&self.detectors) {
                bucket.extend(detector.check(&ctx));
            }
        }

        buckets.into_iter().flatten().collect()
    }
}

impl std::fmt::Debug for DetectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.detectors.iter().map(|d| d.name()))
            .finish()
    }
}
