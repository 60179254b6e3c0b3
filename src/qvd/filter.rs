//! Row filtering by substring or wildcard match.
//!
//! A row passes when the text of any of its symbols matches. Matching is
//! evaluated once per symbol, so testing a row is a table lookup per field.
//! Missing cells never match.

use log::{debug, warn};
use regex::{Regex, RegexBuilder};

use super::codec::glob;
use super::format::rows::RowIndices;
use super::types::models::{Symbol, SymbolTable};

/// How the search text is compared with symbol text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// The symbol text contains the search text.
    #[default]
    Contains,
    /// The whole symbol text matches a `*`/`?` pattern.
    Wildcard,
    /// The symbol text equals the search text.
    Exact,
}

/// Search parameters for [`RowFilter`].
///
/// Defaults: case-sensitive, backslash escapes enabled for wildcards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub text: String,
    pub mode: MatchMode,
    pub case_sensitive: bool,
    /// In wildcard mode, `\*`, `\?` and `\\` stand for literal characters.
    pub escape: bool,
}

impl FilterOptions {
    pub fn new(text: impl Into<String>, mode: MatchMode) -> Self {
        Self {
            text: text.into(),
            mode,
            case_sensitive: true,
            escape: true,
        }
    }

    pub fn contains(text: impl Into<String>) -> Self {
        Self::new(text, MatchMode::Contains)
    }

    pub fn wildcard(text: impl Into<String>) -> Self {
        Self::new(text, MatchMode::Wildcard)
    }

    pub fn exact(text: impl Into<String>) -> Self {
        Self::new(text, MatchMode::Exact)
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_escape(mut self, escape: bool) -> Self {
        self.escape = escape;
        self
    }

    /// An empty search text disables filtering.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A compiled text predicate.
#[derive(Debug, Clone)]
pub enum Matcher {
    Substring(String),
    Equals(String),
    Pattern(Regex),
    /// The pattern could not be compiled; nothing matches.
    Nothing,
}

impl Matcher {
    /// Compiles `options`, or returns `None` when the search text is empty.
    pub fn new(options: &FilterOptions) -> Option<Self> {
        if options.is_empty() {
            return None;
        }
        let text = &options.text;
        let matcher = match (options.mode, options.case_sensitive) {
            (MatchMode::Contains, true) => Matcher::Substring(text.clone()),
            (MatchMode::Exact, true) => Matcher::Equals(text.clone()),
            (MatchMode::Contains, false) => compile(&regex::escape(text), false),
            (MatchMode::Exact, false) => compile(&format!(r"(?s)\A{}\z", regex::escape(text)), false),
            (MatchMode::Wildcard, case_sensitive) => {
                compile(&glob::to_regex(text, options.escape), case_sensitive)
            }
        };
        Some(matcher)
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Substring(needle) => text.contains(needle.as_str()),
            Matcher::Equals(expected) => text == expected,
            Matcher::Pattern(regex) => regex.is_match(text),
            Matcher::Nothing => false,
        }
    }

    /// Matches against the symbol's text form; dual symbols use their text half.
    pub fn matches_symbol(&self, symbol: &Symbol) -> bool {
        self.is_match(&symbol.text())
    }
}

fn compile(pattern: &str, case_sensitive: bool) -> Matcher {
    match RegexBuilder::new(pattern).case_insensitive(!case_sensitive).build() {
        Ok(regex) => Matcher::Pattern(regex),
        Err(e) => {
            warn!("Search pattern could not be compiled, no rows will match: {}", e);
            Matcher::Nothing
        }
    }
}

/// Per-symbol match results for every field of a table.
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    /// `None` when filtering is disabled.
    matches: Option<Vec<Vec<bool>>>,
}

impl RowFilter {
    /// Evaluates `options` against every symbol of `symbol_tables`.
    pub fn new(options: Option<&FilterOptions>, symbol_tables: &[SymbolTable]) -> Self {
        let Some(matcher) = options.and_then(Matcher::new) else {
            return Self::default();
        };
        let matches = symbol_tables
            .iter()
            .map(|table| table.iter().map(|symbol| matcher.matches_symbol(symbol)).collect())
            .collect();
        Self { matches: Some(matches) }
    }

    pub fn is_active(&self) -> bool {
        self.matches.is_some()
    }

    /// Whether any cell of `row` resolves to a matching symbol.
    pub fn accepts(&self, row: &[Option<usize>]) -> bool {
        let Some(matches) = &self.matches else {
            return true;
        };
        row.iter().zip(matches).any(|(cell, field_matches)| {
            cell.and_then(|index| field_matches.get(index).copied()).unwrap_or(false)
        })
    }

    /// Indices of the fields that hold at least one matching symbol.
    pub fn matching_fields(&self) -> Vec<usize> {
        match &self.matches {
            Some(matches) => matches
                .iter()
                .enumerate()
                .filter(|(_, field_matches)| field_matches.contains(&true))
                .map(|(field, _)| field)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Drops the rows that do not pass the filter.
    pub fn apply(&self, rows: &mut RowIndices) {
        if !self.is_active() {
            return;
        }
        let before = rows.num_rows();
        rows.retain(|row| self.accepts(row));
        debug!("Row filter kept {} of {} rows", rows.num_rows(), before);
    }
}
