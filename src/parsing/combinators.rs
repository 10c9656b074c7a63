//! Character-level building blocks shared by the symbol and template rules.

use chumsky::error::Error as _;
use chumsky::prelude::*;
use chumsky::text;
use std::ops::Range;
use std::sync::Arc;

use crate::ast::{Identifier, Indexer, SourceLocation};
use crate::parsing::grammar_error::GrammarError;

/// Type alias for parser error
pub(crate) type ParserError = GrammarError;

/// Offset-to-position index shared by every rule of one parse
pub(crate) type Source = Arc<SourceLocation>;

/// Characters an identifier may contain. Whitespace is allowed inside a name
/// (`Octopus Action`) and trimmed from its ends.
pub(crate) fn is_identifier_char(c: &char) -> bool {
    c.is_alphanumeric()
        || c.is_whitespace()
        || matches!(c, '_' | '-' | ':' | '/' | '~' | '(' | ')')
}

/// Zero or more whitespace characters
pub(crate) fn whitespace0() -> impl Parser<char, (), Error = ParserError> + Clone {
    filter(|c: &char| c.is_whitespace())
        .repeated()
        .ignored()
        .labelled("whitespace")
}

/// At least one whitespace character
pub(crate) fn whitespace1() -> impl Parser<char, (), Error = ParserError> + Clone {
    filter(|c: &char| c.is_whitespace())
        .repeated()
        .at_least(1)
        .ignored()
        .labelled("whitespace")
}

/// A whole word matched case-insensitively (`if`, `IF`, `If`, ...).
///
/// The word is checked before it is consumed, so a mismatch is reported at
/// its first character and named after the keyword.
pub(crate) fn keyword(word: &'static str) -> impl Parser<char, (), Error = ParserError> + Clone {
    text::ident::<char, ParserError>()
        .rewind()
        .try_map(move |found: String, span: Range<usize>| {
            if found.eq_ignore_ascii_case(word) {
                Ok(())
            } else {
                Err(ParserError::expected_input_found(
                    span,
                    Vec::new(),
                    found.chars().next(),
                ))
            }
        })
        .ignore_then(text::ident::<char, ParserError>())
        .ignored()
        .labelled(word)
}

/// Whitespace that an identifier must not swallow: a single whitespace
/// character directly followed by a filter pipe, or by the word `in` and more
/// whitespace (the separator of `#{each x in xs}`).
///
/// Only an enumerator folds the case of `in`; elsewhere `In` and `IN` stay
/// part of the name, as in `#{Log In Page}`.
fn reserved_whitespace(fold_case: bool) -> impl Parser<char, (), Error = ParserError> + Clone {
    let letter = move |expected: char| {
        filter::<char, _, ParserError>(move |c: &char| {
            if fold_case {
                c.eq_ignore_ascii_case(&expected)
            } else {
                *c == expected
            }
        })
    };
    let pipe = just('|').ignored();
    let in_keyword = letter('i')
        .then(letter('n'))
        .then(filter(|c: &char| c.is_whitespace()))
        .ignored();

    filter(|c: &char| c.is_whitespace()).ignore_then(pipe.or(in_keyword))
}

/// One or more identifier characters, each of which must not start reserved
/// whitespace. The lookahead runs before every character, so a pipe or `in`
/// separator stops the name wherever it occurs.
fn name(source: Source, fold_in_case: bool) -> impl Parser<char, Identifier, Error = ParserError> + Clone {
    filter(is_identifier_char)
        .rewind()
        .ignore_then(reserved_whitespace(fold_in_case).not())
        .repeated()
        .at_least(1)
        .collect::<String>()
        .try_map(move |raw: String, span: Range<usize>| {
            let name = raw.trim();
            if name.is_empty() {
                return Err(ParserError::custom(span, "identifier cannot be blank"));
            }
            let leading = raw.chars().take_while(|c| c.is_whitespace()).count();
            Ok(Identifier::new(name, source.position_at(span.start + leading)))
        })
        .labelled("identifier")
}

/// Identifier in a symbol path or filter stage
pub(crate) fn identifier(source: Source) -> impl Parser<char, Identifier, Error = ParserError> + Clone {
    name(source, false)
}

/// Loop variable of `#{each x in Xs}`, which stops before `in` written in
/// any case.
pub(crate) fn enumerator(source: Source) -> impl Parser<char, Identifier, Error = ParserError> + Clone {
    name(source, true)
}

/// Indexer: `[` one or more characters other than `]` `]`
pub(crate) fn indexer(source: Source) -> impl Parser<char, Indexer, Error = ParserError> + Clone {
    filter(|c: &char| *c != ']')
        .repeated()
        .at_least(1)
        .collect::<String>()
        .delimited_by(just('['), just(']'))
        .map_with_span(move |index, span: Range<usize>| {
            Indexer::new(index, source.position_at(span.start))
        })
        .labelled("indexer")
}
