//! Error type produced by the grammar rules
//!
//! Chumsky merges every error raised at the same input position. This type
//! keeps the union of what each failing alternative expected, with named
//! entries (`identifier`, `if`, ...) standing in for rules whose first
//! character alone would say nothing useful.

use chumsky::error::Error;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

/// One thing the grammar would have accepted at a failure position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Expected {
    Char(char),
    EndOfInput,
    Named(&'static str),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Char(c) => write!(f, "{:?}", c),
            Expected::EndOfInput => write!(f, "end of input"),
            Expected::Named(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GrammarError {
    span: Range<usize>,
    expected: BTreeSet<Expected>,
    found: Option<char>,
    reason: Option<String>,
    labelled: bool,
}

impl GrammarError {
    /// A rule matched structurally but rejected what it read.
    pub(crate) fn custom(span: Range<usize>, reason: impl Into<String>) -> Self {
        Self {
            span,
            expected: BTreeSet::new(),
            found: None,
            reason: Some(reason.into()),
            labelled: false,
        }
    }

    pub(crate) fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub(crate) fn expected(&self) -> impl Iterator<Item = &Expected> {
        self.expected.iter()
    }

    pub(crate) fn found(&self) -> Option<char> {
        self.found
    }

    pub(crate) fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

impl Error<char> for GrammarError {
    type Span = Range<usize>;
    type Label = &'static str;

    fn expected_input_found<Iter: IntoIterator<Item = Option<char>>>(
        span: Self::Span,
        expected: Iter,
        found: Option<char>,
    ) -> Self {
        Self {
            span,
            expected: expected
                .into_iter()
                .map(|token| token.map_or(Expected::EndOfInput, Expected::Char))
                .collect(),
            found,
            reason: None,
            labelled: false,
        }
    }

    /// The innermost label wins. It names the expectation only when the
    /// failing rule had no concrete character to offer (a `filter`, a
    /// lookahead, a keyword mismatch).
    fn with_label(mut self, label: Self::Label) -> Self {
        if !self.labelled {
            if self.expected.is_empty() && self.reason.is_none() {
                self.expected.insert(Expected::Named(label));
            }
            self.labelled = true;
        }
        self
    }

    /// Expected sets are unioned; the first custom reason is kept.
    fn merge(mut self, other: Self) -> Self {
        self.expected.extend(other.expected);
        if self.reason.is_none() {
            self.reason = other.reason;
        }
        if self.found.is_none() {
            self.found = other.found;
        }
        self.labelled |= other.labelled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unexpected(at: usize, expected: &[char], found: char) -> GrammarError {
        GrammarError::expected_input_found(at..at + 1, expected.iter().map(|c| Some(*c)), Some(found))
    }

    fn rendered(error: &GrammarError) -> Vec<String> {
        error.expected().map(ToString::to_string).collect()
    }

    #[test]
    fn test_merge_unions_expected_sets() {
        let merged = unexpected(3, &['}'], 'x').merge(unexpected(3, &['.', '['], 'x'));
        assert_eq!(rendered(&merged), vec!["'.'", "'['", "'}'"]);
        assert_eq!(merged.found(), Some('x'));
    }

    #[test]
    fn test_label_names_an_empty_expectation() {
        let error = unexpected(0, &[], '/').with_label("identifier");
        assert_eq!(rendered(&error), vec!["identifier"]);
    }

    #[test]
    fn test_label_keeps_concrete_characters() {
        let error = unexpected(0, &['['], 'x').with_label("indexer");
        assert_eq!(rendered(&error), vec!["'['"]);
    }

    #[test]
    fn test_innermost_label_wins() {
        let error = unexpected(0, &[], 'x')
            .with_label("if")
            .with_label("conditional");
        assert_eq!(rendered(&error), vec!["if"]);
    }

    #[test]
    fn test_custom_reason_survives_merge_from_either_side() {
        let custom = GrammarError::custom(4..5, "closing tag without an open block");
        let left = custom.clone().merge(unexpected(4, &['#'], '/'));
        let right = unexpected(4, &['#'], '/').merge(custom);
        assert_eq!(left.reason(), Some("closing tag without an open block"));
        assert_eq!(right.reason(), Some("closing tag without an open block"));
    }

    #[test]
    fn test_end_of_input_is_ordered_after_characters() {
        let error = GrammarError::expected_input_found(0..1, vec![None, Some('a')], None)
            .with_label("text");
        assert_eq!(rendered(&error), vec!["'a'", "end of input"]);
    }
}
