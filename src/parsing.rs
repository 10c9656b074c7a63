//! Grammar engine for `#{...}` templates
//!
//! The grammar is written with chumsky combinators directly over characters;
//! there is no separate lexing pass. Rules live in three layers:
//!
//! - [`combinators`]: identifiers, indexers, keywords and whitespace
//! - [`symbols`]: symbol paths and filter chains
//! - [`template`]: text, substitutions and the two block constructs
//!
//! Every rule reports failures as a `GrammarError`. [`api`] wraps the rules
//! with the resource limits and converts those errors into `ParseError`.

pub mod api;
pub(crate) mod combinators;
pub(crate) mod grammar_error;
pub(crate) mod symbols;
pub(crate) mod template;

pub use api::{parse_symbol_path, parse_template, GrammarLimits};
