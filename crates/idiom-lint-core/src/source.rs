//! Line source: input text as an ordered, 1-indexed sequence of lines.

/// A single line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// Line number (1-indexed).
    pub number: usize,
    /// Text as it appears in the input, without the line terminator.
    pub raw: String,
    /// `raw` with surrounding whitespace removed.
    pub trimmed: String,
}

impl SourceLine {
    /// Creates a line.
    #[must_use]
    pub fn new(number: usize, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim().to_string();
        Self {
            number,
            raw,
            trimmed,
        }
    }

    /// Whether the line holds only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.trimmed.is_empty()
    }

    /// Whether the whole line is a comment (`//`, `/*`, or a `*` continuation).
    #[must_use]
    pub fn is_comment(&self) -> bool {
        let t = self.trimmed.as_str();
        if t.starts_with("//") || t.starts_with("/*") || t.starts_with("*/") {
            return true;
        }
        // `* text` block-comment continuation, but not a `*ptr` deref
        t == "*" || t.starts_with("* ")
    }

    /// Whether the line starts with an outer or inner attribute.
    #[must_use]
    pub fn is_attribute(&self) -> bool {
        self.trimmed.starts_with("#[") || self.trimmed.starts_with("#![")
    }
}

/// Normalized input lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLines {
    lines: Vec<SourceLine>,
}

impl SourceLines {
    /// Splits `text` into lines.
    ///
    /// `\n` and `\r\n` both terminate a line; a trailing terminator does not
    /// produce an extra empty line, and empty text yields no lines.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let lines = text
            .lines()
            .enumerate()
            .map(|(i, raw)| SourceLine::new(i + 1, raw))
            .collect();
        Self { lines }
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether there are no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the line with the given 1-indexed number.
    #[must_use]
    pub fn get(&self, number: usize) -> Option<&SourceLine> {
        number.checked_sub(1).and_then(|i| self.lines.get(i))
    }

    /// Iterates over lines in order.
    pub fn iter(&self) -> std::slice::Iter<'_, SourceLine> {
        self.lines.iter()
    }

    /// All lines as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[SourceLine] {
        &self.lines
    }

    /// Lines from `number - before` through `number + after`, clipped to the input.
    ///
    /// The returned slice includes the line `number` itself.
    #[must_use]
    pub fn window(&self, number: usize, before: usize, after: usize) -> &[SourceLine] {
        if number == 0 || number > self.lines.len() {
            return &[];
        }
        let index = number - 1;
        let start = index.saturating_sub(before);
        let end = index.saturating_add(after).min(self.lines.len() - 1);
        &self.lines[start..=end]
    }
}

impl<'a> IntoIterator for &'a SourceLines {
    type Item = &'a SourceLine;
    type IntoIter = std::slice::Iter<'a, SourceLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numbers_lines_from_one() {
        let lines = SourceLines::parse("a\n  b  \r\nc\n");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.get(1).map(|l| l.number), Some(1));
        assert_eq!(lines.get(2).map(|l| l.trimmed.as_str()), Some("b"));
        assert_eq!(lines.get(2).map(|l| l.raw.as_str()), Some("  b  "));
        assert!(lines.get(0).is_none());
        assert!(lines.get(4).is_none());
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(SourceLines::parse("").is_empty());
    }

    #[test]
    fn comment_detection() {
        assert!(SourceLine::new(1, "  // note").is_comment());
        assert!(SourceLine::new(1, "/// docs").is_comment());
        assert!(SourceLine::new(1, " * continued").is_comment());
        assert!(SourceLine::new(1, " */").is_comment());
        assert!(!SourceLine::new(1, "*ptr = 5;").is_comment());
        assert!(!SourceLine::new(1, "let x = 1; // trailing").is_comment());
    }

    #[test]
    fn attribute_detection() {
        assert!(SourceLine::new(1, "#[derive(Debug)]").is_attribute());
        assert!(SourceLine::new(1, "#![allow(dead_code)]").is_attribute());
        assert!(!SourceLine::new(1, "struct A;").is_attribute());
    }

    #[test]
    fn window_is_clipped() {
        let lines = SourceLines::parse("1\n2\n3\n4\n5");
        let numbers: Vec<usize> = lines.window(2, 3, 1).iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        let numbers: Vec<usize> = lines.window(5, 1, 10).iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![4, 5]);
        assert!(lines.window(9, 1, 1).is_empty());
    }
}
