//! Lexical context tracking over a forward line scan.
//!
//! The tracker keeps one flag and one brace counter per [`Construct`]. A line
//! that opens a construct sets its flag and resets the counter; every line
//! while the flag is set (the opener included) adds `{` minus `}` to the
//! counter, and the flag clears once the counter is zero or below.
//!
//! This is a heuristic: braces inside strings or char literals are counted,
//! and unbalanced input leaves counters wherever they land. Nothing here
//! ever fails.

use crate::source::SourceLine;

/// A lexical region tracked by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
    /// An `async fn` body or `async` block.
    Async,
    /// A `for`, `while` or `loop` body.
    Loop,
}

impl Construct {
    /// Every tracked construct.
    pub const ALL: &'static [Self] = &[Self::Async, Self::Loop];

    /// Whether `line` opens this construct.
    #[must_use]
    pub fn opens(self, line: &SourceLine) -> bool {
        if line.is_comment() {
            return false;
        }
        let text = line.trimmed.as_str();
        match self {
            Self::Async => {
                text.contains("async fn") || text.contains("async move {") || text.contains("async {")
            }
            Self::Loop => {
                // `unsafe impl<T> Trait for Type` is not a loop
                let is_impl = match (find_word(text, "impl"), find_word(text, "for")) {
                    (Some(imp), Some(f)) => imp < f,
                    _ => false,
                };
                !is_impl && ["for", "while", "loop"].iter().any(|kw| contains_word(text, kw))
            }
        }
    }
}

/// Whether `text` contains `word` delimited by non-identifier characters.
#[must_use]
pub fn contains_word(text: &str, word: &str) -> bool {
    find_word(text, word).is_some()
}

fn find_word(text: &str, word: &str) -> Option<usize> {
    text.match_indices(word).map(|(start, _)| start).find(|&start| {
        let before = text[..start].chars().next_back();
        let after = text[start + word.len()..].chars().next();
        !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char)
    })
}

/// Whether `c` can appear in an identifier.
#[must_use]
pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Net brace balance of a line.
#[must_use]
pub fn brace_delta(text: &str) -> i64 {
    text.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

/// What detectors see for one line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextSnapshot {
    /// Inside an async construct on this line.
    pub async_active: bool,
    /// Inside a loop construct on this line.
    pub loop_active: bool,
    /// Async brace depth after this line.
    pub async_depth: i64,
    /// Loop brace depth after this line.
    pub loop_depth: i64,
    /// `tokio::sync` was mentioned on an earlier line.
    pub async_sync_imported: bool,
}

impl ContextSnapshot {
    /// Whether `construct` is active on this line.
    #[must_use]
    pub fn is_active(&self, construct: Construct) -> bool {
        match construct {
            Construct::Async => self.async_active,
            Construct::Loop => self.loop_active,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ConstructState {
    active: bool,
    depth: i64,
}

impl ConstructState {
    /// Applies one line and returns whether the construct is visible on it.
    fn step(&mut self, opens: bool, delta: i64) -> bool {
        if opens {
            self.active = true;
            self.depth = 0;
        }
        let visible = self.active;
        if self.active {
            self.depth += delta;
            if self.depth <= 0 {
                self.active = false;
            }
        }
        visible
    }
}

/// Forward-only tracker of construct flags.
#[derive(Debug, Clone, Default)]
pub struct ContextTracker {
    async_state: ConstructState,
    loop_state: ConstructState,
    async_sync_imported: bool,
}

impl ContextTracker {
    /// Creates a tracker with every construct inactive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the next line and returns the context detectors see for it.
    ///
    /// A construct that opens and closes on the same line is reported active
    /// for that line and inactive afterwards.
    pub fn advance(&mut self, line: &SourceLine) -> ContextSnapshot {
        let comment = line.is_comment();
        let delta = if comment { 0 } else { brace_delta(&line.raw) };
        let imported_before = self.async_sync_imported;

        let async_active = self
            .async_state
            .step(Construct::Async.opens(line), delta);
        let loop_active = self.loop_state.step(Construct::Loop.opens(line), delta);

        if !comment && line.trimmed.contains("tokio::sync") {
            self.async_sync_imported = true;
        }

        ContextSnapshot {
            async_active,
            loop_active,
            async_depth: self.async_state.depth,
            loop_depth: self.loop_state.depth,
            async_sync_imported: imported_before,
        }
    }

    /// Whether `construct` is active after the last consumed line.
    #[must_use]
    pub fn is_active(&self, construct: Construct) -> bool {
        match construct {
            Construct::Async => self.async_state.active,
            Construct::Loop => self.loop_state.active,
        }
    }
}
