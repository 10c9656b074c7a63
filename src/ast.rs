//! Abstract syntax tree for hashbrace templates
//!
//! ## Structure
//!
//! ```text
//! Template
//!   ├─ TextToken          literal fragments, already unescaped
//!   ├─ SubstitutionToken  ContentExpression (symbol path or filter chain)
//!   ├─ ConditionalToken   guard SymbolExpression + truthy/falsy Templates
//!   └─ RepetitionToken    collection SymbolExpression + enumerator + body Template
//! ```
//!
//! Every token and every path step carries the [`Position`] where its parse
//! started. The tree is read-only: fields are private and only exposed through
//! accessors, so a parsed template can be shared freely behind an `Arc`.

pub mod location;
pub mod symbol;
pub mod token;

pub use location::{Position, SourceLocation};
pub use symbol::{
    ContentExpression, FunctionCallExpression, Identifier, Indexer, SymbolExpression,
    SymbolExpressionStep,
};
pub use token::{
    ConditionalKind, ConditionalToken, RepetitionToken, SubstitutionToken, Template,
    TemplateToken, TextToken,
};
