//! Symbol path and filter chain rules
//!
//! ```text
//! symbol       := identifier ( "." identifier | indexer )*
//! filter_chain := symbol ( ws? "|" ws? identifier )+
//! expression   := filter_chain | symbol
//! ```
//!
//! `filter_chain` is tried before the bare symbol so a trailing `| name` is
//! never left behind unparsed.

use chumsky::prelude::*;

use crate::ast::{ContentExpression, FunctionCallExpression, SymbolExpression, SymbolExpressionStep};
use crate::parsing::combinators::{identifier, indexer, whitespace0, ParserError, Source};

/// Parse a symbol path. Dotted steps are tried before bracketed ones.
pub(crate) fn symbol(source: Source) -> impl Parser<char, SymbolExpression, Error = ParserError> + Clone {
    let step = choice((
        just('.')
            .ignore_then(identifier(source.clone()))
            .map(SymbolExpressionStep::Identifier),
        indexer(source.clone()).map(SymbolExpressionStep::Indexer),
    ));

    identifier(source)
        .then(step.repeated())
        .map(|(head, rest)| SymbolExpression::new(head, rest))
        .labelled("symbol")
        .boxed()
}

/// Parse a symbol followed by at least one `| filter` stage, folding the
/// stages left to right: `a | f | g` is `call(g, call(f, a))`.
pub(crate) fn filter_chain(
    source: Source,
) -> impl Parser<char, ContentExpression, Error = ParserError> + Clone {
    let stage = whitespace0()
        .ignore_then(just('|'))
        .ignore_then(whitespace0())
        .ignore_then(identifier(source.clone()))
        .labelled("filter");

    symbol(source)
        .map(ContentExpression::Symbol)
        .then(stage.repeated().at_least(1))
        .foldl(|subject, function| {
            ContentExpression::FunctionCall(FunctionCallExpression::filter(subject, function))
        })
}

/// Anything a substitution may contain
pub(crate) fn expression(
    source: Source,
) -> impl Parser<char, ContentExpression, Error = ParserError> + Clone {
    choice((
        filter_chain(source.clone()),
        symbol(source).map(ContentExpression::Symbol),
    ))
}
