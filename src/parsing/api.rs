//! Public API for the grammar engine.
//!
//! These entry points are uncached and pure: every call builds its own
//! position index and parser, so they may run concurrently from any thread.

use chumsky::prelude::*;
use std::sync::Arc;

use hashbrace_config::GrammarConfig;

use crate::ast::{SourceLocation, SymbolExpression, Template};
use crate::error::ParseError;
use crate::parsing::symbols::symbol;
use crate::parsing::template::build_template_parser;

/// Bounds checked before the grammar runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarLimits {
    /// Deepest allowed nesting of `if`/`unless`/`each` blocks
    pub max_nesting_depth: usize,
    /// Longest accepted template, in characters
    pub max_template_length: usize,
}

impl Default for GrammarLimits {
    fn default() -> Self {
        Self {
            max_nesting_depth: 32,
            max_template_length: 1 << 20,
        }
    }
}

impl From<&GrammarConfig> for GrammarLimits {
    fn from(config: &GrammarConfig) -> Self {
        Self {
            max_nesting_depth: config.max_nesting_depth,
            max_template_length: config.max_template_length,
        }
    }
}

/// Parse a whole template. Trailing input the grammar cannot consume is an
/// error; there is no partial result.
pub fn parse_template(source: &str, limits: &GrammarLimits) -> Result<Template, ParseError> {
    let location = Arc::new(SourceLocation::new(source));

    if location.len() > limits.max_template_length {
        return Err(ParseError::TemplateTooLong {
            length: location.len(),
            limit: limits.max_template_length,
        });
    }
    check_nesting(source, &location, limits.max_nesting_depth)?;

    build_template_parser(location.clone())
        .then_ignore(end())
        .parse(source)
        .map_err(|errors| ParseError::from_grammar_errors(errors, &location))
}

/// Parse a standalone symbol path such as `Octopus.Action[Name].Foo`.
/// The whole input must be a single path.
pub fn parse_symbol_path(path: &str) -> Result<SymbolExpression, ParseError> {
    let location = Arc::new(SourceLocation::new(path));

    symbol(location.clone())
        .then_ignore(end())
        .parse(path)
        .map_err(|errors| ParseError::from_grammar_errors(errors, &location))
}

/// Count block openers and closers ahead of the grammar so that deeply nested
/// input is refused before it can drive the recursive rules.
///
/// Escapes are skipped the same way the text rule reads them: `##` before
/// `#{`, then `##{`, then `#` and any other character.
fn check_nesting(source: &str, location: &SourceLocation, limit: usize) -> Result<(), ParseError> {
    let chars: Vec<char> = source.chars().collect();
    let at = |i: usize| chars.get(i).copied();
    let mut depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '#' {
            i += 1;
            continue;
        }

        match (at(i + 1), at(i + 2), at(i + 3)) {
            (Some('#'), Some('#'), Some('{')) => i += 2,
            (Some('#'), Some('{'), _) => i += 3,
            (Some('{'), Some('/'), _) => {
                depth = depth.saturating_sub(1);
                i += 3;
            }
            (Some('{'), _, _) => {
                if opens_block(&chars[i + 2..]) {
                    depth += 1;
                    if depth > limit {
                        return Err(ParseError::NestingTooDeep {
                            position: location.position_at(i),
                            depth,
                            limit,
                        });
                    }
                }
                i += 2;
            }
            (Some(_), _, _) => i += 2,
            (None, _, _) => i += 1,
        }
    }

    Ok(())
}

/// Whether the text after `#{` starts with a block keyword and whitespace.
fn opens_block(rest: &[char]) -> bool {
    let start = rest.iter().take_while(|c| c.is_whitespace()).count();
    let word: String = rest[start..]
        .iter()
        .take_while(|c| c.is_alphanumeric() || **c == '_')
        .collect();
    let after = rest.get(start + word.chars().count());

    ["if", "unless", "each"]
        .iter()
        .any(|keyword| word.eq_ignore_ascii_case(keyword))
        && after.map_or(false, |c| c.is_whitespace())
}
