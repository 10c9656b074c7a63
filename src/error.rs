//! Parse failures
//!
//! Every failure carries the source position it was detected at. Grammar
//! failures also carry the set of things the grammar would have accepted there.

use chumsky::error::Error as _;
use thiserror::Error;

use crate::ast::{Position, SourceLocation};
use crate::parsing::grammar_error::GrammarError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input matched none of the alternatives at `position`.
    #[error(
        "unexpected {} at {position}, expected {}",
        describe_found(.found),
        describe_expected(.expected)
    )]
    Syntax {
        position: Position,
        found: Option<char>,
        expected: Vec<String>,
    },

    /// A rule matched structurally but rejected what it found, e.g. a block
    /// closed with the wrong keyword.
    #[error("{reason} at {position}")]
    Invalid { position: Position, reason: String },

    #[error("blocks are nested {depth} deep at {position}, the limit is {limit}")]
    NestingTooDeep {
        position: Position,
        depth: usize,
        limit: usize,
    },

    #[error("template is {length} characters long, the limit is {limit}")]
    TemplateTooLong { length: usize, limit: usize },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Syntax { position, .. }
            | ParseError::Invalid { position, .. }
            | ParseError::NestingTooDeep { position, .. } => *position,
            ParseError::TemplateTooLong { .. } => Position::default(),
        }
    }

    /// What the grammar would have accepted at the failure position.
    pub fn expected(&self) -> &[String] {
        match self {
            ParseError::Syntax { expected, .. } => expected,
            _ => &[],
        }
    }

    /// Describe a failed grammar run. Errors raised at the furthest offset
    /// are merged, so the expected set covers every alternative that got
    /// that far.
    pub(crate) fn from_grammar_errors(errors: Vec<GrammarError>, source: &SourceLocation) -> Self {
        let furthest = errors.iter().map(|error| error.span().start).max();
        let merged = errors
            .into_iter()
            .filter(|error| Some(error.span().start) == furthest)
            .reduce(|merged, error| merged.merge(error));

        match merged {
            Some(error) => Self::from_grammar_error(&error, source),
            None => ParseError::Invalid {
                position: source.position_at(0),
                reason: "template could not be parsed".to_string(),
            },
        }
    }

    pub(crate) fn from_grammar_error(error: &GrammarError, source: &SourceLocation) -> Self {
        let position = source.position_at(error.span().start);

        match error.reason() {
            Some(reason) => ParseError::Invalid {
                position,
                reason: reason.to_string(),
            },
            None => ParseError::Syntax {
                position,
                found: error.found(),
                expected: error.expected().map(ToString::to_string).collect(),
            },
        }
    }
}

fn describe_found(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("{:?}", c),
        None => "end of input".to_string(),
    }
}

fn describe_expected(expected: &[String]) -> String {
    match expected {
        [] => "something else".to_string(),
        [only] => only.clone(),
        _ => format!("one of {}", expected.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_message() {
        let error = ParseError::Syntax {
            position: Position::new(3, 1, 4),
            found: Some('/'),
            expected: vec!["'}'".to_string(), "identifier".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "unexpected '/' at line 1, column 4, expected one of '}', identifier"
        );
        assert_eq!(error.expected().len(), 2);
    }

    #[test]
    fn test_end_of_input_message() {
        let error = ParseError::Syntax {
            position: Position::new(8, 1, 9),
            found: None,
            expected: vec!["'#'".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "unexpected end of input at line 1, column 9, expected '#'"
        );
    }

    #[test]
    fn test_custom_reason_becomes_invalid() {
        let source = SourceLocation::new("#{if X}A#{/unless}");
        let custom = GrammarError::custom(8..18, "expected #{/if} to close #{if}");
        let error = ParseError::from_grammar_error(&custom, &source);
        assert_eq!(
            error,
            ParseError::Invalid {
                position: Position::new(8, 1, 9),
                reason: "expected #{/if} to close #{if}".to_string(),
            }
        );
    }

    #[test]
    fn test_furthest_error_wins() {
        let source = SourceLocation::new("abcdef");
        let errors = vec![
            GrammarError::custom(1..2, "near"),
            GrammarError::custom(4..5, "far"),
        ];
        let error = ParseError::from_grammar_errors(errors, &source);
        assert_eq!(error.position().offset, 4);
        assert_eq!(error.to_string(), "far at line 1, column 5");
    }

    #[test]
    fn test_errors_at_the_furthest_offset_are_merged() {
        let source = SourceLocation::new("#{Foo");
        let errors = vec![
            GrammarError::expected_input_found(5..5, vec![Some('}')], None),
            GrammarError::expected_input_found(2..3, vec![Some('/')], Some('F')),
            GrammarError::expected_input_found(5..5, vec![Some('.')], None).with_label("symbol"),
            GrammarError::expected_input_found(5..5, Vec::new(), None).with_label("identifier"),
        ];
        let error = ParseError::from_grammar_errors(errors, &source);
        assert_eq!(error.expected(), ["'.'", "'}'", "identifier"]);
        assert_eq!(
            error.to_string(),
            "unexpected end of input at line 1, column 6, expected one of '.', '}', identifier"
        );
    }

    #[test]
    fn test_too_long_has_no_expected_set() {
        let error = ParseError::TemplateTooLong {
            length: 10,
            limit: 5,
        };
        assert!(error.expected().is_empty());
        assert_eq!(
            error.to_string(),
            "template is 10 characters long, the limit is 5"
        );
    }
}
