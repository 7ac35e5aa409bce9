//! Attribute-to-declaration binding.
//!
//! A `#[derive(...)]` block binds to the first `struct` or `enum` that
//! follows it, looking past blank lines, comments and other attributes.
//! Any other content between the block and a declaration aborts the binding.

use crate::context::MAX_WINDOW;
use crate::rule::{compile, RuleError};
use crate::source::{SourceLine, SourceLines};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Declaration name to the capabilities derived for it.
pub type AttributeBindings = BTreeMap<String, BTreeSet<String>>;

const DECLARATION: &str = r"^\s*(?:pub(?:\([^)]*\))?\s+)?(struct|enum)\s+(\w+)";
const IMPLEMENTATION: &str = r"^\s*impl(?:<[^>]*>)?\s+([\w:]+)(?:<[^>]*>)?\s+for\s+(\w+)";
const DERIVE_OPEN: &str = "#[derive(";

/// Kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    /// `struct`.
    Struct,
    /// `enum`.
    Enum,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Struct => f.write_str("struct"),
            Self::Enum => f.write_str("enum"),
        }
    }
}

/// A `struct` or `enum` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Line of the declaration keyword.
    pub line: usize,
    /// Declaration kind.
    pub kind: DeclarationKind,
    /// Declared name.
    pub name: String,
}

/// An explicit `impl Capability for Type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityImpl {
    /// Last path segment of the implemented trait.
    pub capability: String,
    /// Target type name.
    pub declaration: String,
    /// Line of the `impl`.
    pub line: usize,
}

/// Everything the binder extracts from one input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeScan {
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
    /// Derived capabilities per declaration name.
    pub bindings: AttributeBindings,
    /// Explicit capability implementations in source order.
    pub implementations: Vec<CapabilityImpl>,
}

/// Extracts declarations, derive bindings and explicit implementations.
#[derive(Debug, Clone)]
pub struct AttributeBinder {
    declaration: Regex,
    implementation: Regex,
}

impl AttributeBinder {
    /// Compiles the binder patterns.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidPattern`] if a pattern fails to compile.
    pub fn new() -> Result<Self, RuleError> {
        Ok(Self {
            declaration: compile("attribute-binder", DECLARATION)?,
            implementation: compile("attribute-binder", IMPLEMENTATION)?,
        })
    }

    /// Runs all three extractions.
    #[must_use]
    pub fn scan(&self, lines: &SourceLines) -> TypeScan {
        TypeScan {
            declarations: self.declarations(lines),
            bindings: self.bind(lines),
            implementations: self.implementations(lines),
        }
    }

    /// Declarations in source order. Comment lines are ignored.
    #[must_use]
    pub fn declarations(&self, lines: &SourceLines) -> Vec<Declaration> {
        lines
            .iter()
            .filter_map(|line| self.declaration_at(line))
            .collect()
    }

    /// Explicit `impl Trait for Type` blocks in source order.
    #[must_use]
    pub fn implementations(&self, lines: &SourceLines) -> Vec<CapabilityImpl> {
        lines
            .iter()
            .filter(|line| !line.is_comment())
            .filter_map(|line| {
                let caps = self.implementation.captures(&line.raw)?;
                let path = caps.get(1)?.as_str();
                Some(CapabilityImpl {
                    capability: last_segment(path).to_string(),
                    declaration: caps.get(2)?.as_str().to_string(),
                    line: line.number,
                })
            })
            .collect()
    }

    /// Binds derive blocks to the declarations that follow them.
    ///
    /// Each derive attribute binds on its own, so of several stacked derives
    /// the one closest to the declaration wins. A later binding to the same
    /// name replaces the earlier one.
    #[must_use]
    pub fn bind(&self, lines: &SourceLines) -> AttributeBindings {
        let all = lines.as_slice();
        let mut bindings = AttributeBindings::new();
        let mut i = 0;

        while i < all.len() {
            let Some((derived, end)) = derive_at(all, i) else {
                i += 1;
                continue;
            };

            let mut j = end + 1;
            while j < all.len() && j - end <= MAX_WINDOW {
                let line = &all[j];
                if let Some((_, stacked_end)) = derive_at(all, j) {
                    j = stacked_end + 1;
                } else if line.is_blank() || line.is_comment() || line.is_attribute() {
                    j += 1;
                } else {
                    if let Some(decl) = self.declaration_at(line) {
                        bindings.insert(decl.name, derived);
                    }
                    break;
                }
            }

            i = end + 1;
        }

        bindings
    }

    fn declaration_at(&self, line: &SourceLine) -> Option<Declaration> {
        if line.is_comment() {
            return None;
        }
        let caps = self.declaration.captures(&line.raw)?;
        let kind = match caps.get(1)?.as_str() {
            "struct" => DeclarationKind::Struct,
            _ => DeclarationKind::Enum,
        };
        Some(Declaration {
            line: line.number,
            kind,
            name: caps.get(2)?.as_str().to_string(),
        })
    }
}

/// Parses a derive attribute starting at index `i`.
///
/// Returns the derived names and the index of the line that closes the
/// attribute. A list may continue over following lines up to `)]`.
fn derive_at(lines: &[SourceLine], i: usize) -> Option<(BTreeSet<String>, usize)> {
    let first = lines.get(i)?;
    if first.is_comment() {
        return None;
    }
    let open = first.trimmed.find(DERIVE_OPEN)?;
    let mut body = first.trimmed[open + DERIVE_OPEN.len()..].to_string();
    let mut end = i;

    while !body.contains(")]") {
        end += 1;
        if end - i > MAX_WINDOW {
            return None;
        }
        let next = lines.get(end)?;
        body.push(' ');
        body.push_str(&next.trimmed);
    }

    let list = body.split(")]").next().unwrap_or_default();
    let names = list
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect();
    Some((names, end))
}

/// Last `::` segment of a path (`std::fmt::Debug` -> `Debug`).
#[must_use]
pub fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}
