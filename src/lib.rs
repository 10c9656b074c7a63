//! # hashbrace
//!
//! Grammar engine and parse cache for `#{...}` substitution templates.
//!
//! ```text
//! Dear #{Customer.Name | ToUpper},
//! #{if Customer.IsVip}thanks for staying with us#{/if}
//! #{each offer in Offers}- #{offer.Title}
//! #{/each}
//! ```
//!
//! Templates parse into an immutable token tree (see [`ast`]). Evaluating
//! that tree against data is left to the host.
//!
//! The crate-level [`parse`] and [`try_parse`] go through the process-wide
//! [`cache`], so repeated parses of the same source share one [`Template`].
//! [`parsing::parse_template`] is the uncached entry point.
//!
//! ## Escaping
//!
//! - `##{` is a literal `#{`
//! - `##` directly before a real `#{` is a literal `#`
//! - `#` followed by anything other than `{`, or at the end of input, is
//!   literal

pub mod ast;
pub mod cache;
pub mod error;
pub mod formats;
pub mod parsing;

use std::sync::Arc;

pub use ast::{
    ConditionalKind, ConditionalToken, ContentExpression, FunctionCallExpression, Identifier,
    Indexer, Position, RepetitionToken, SubstitutionToken, SymbolExpression,
    SymbolExpressionStep, Template, TemplateToken, TextToken,
};
pub use cache::{ParseOutcome, TemplateCache};
pub use error::ParseError;

/// Parse `source` through the global cache.
pub fn parse(source: &str) -> Result<Arc<Template>, ParseError> {
    cache::global().get_or_parse(source)
}

/// Parse `source` through the global cache, reporting failure as a message.
pub fn try_parse(source: &str) -> ParseOutcome {
    cache::global().try_get_or_parse(source)
}

/// Parse a standalone symbol path, e.g. a variable name supplied by the host.
/// Returns `None` unless the whole input is one path.
pub fn try_parse_symbol_path(path: &str) -> Option<SymbolExpression> {
    parsing::parse_symbol_path(path).ok()
}
