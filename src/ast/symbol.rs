//! Symbol paths and the content expressions built on them
//!
//! A symbol path such as `Octopus.Action[Name].Foo` is a non-empty list of
//! steps whose first step is always an identifier. Filter chains wrap a
//! subject expression one stage at a time, so `a | f | g` becomes
//! `call(g, call(f, a))`.
//!
//! Equality is structural: positions are carried for diagnostics only.

use serde::Serialize;
use std::fmt;

use super::location::Position;

/// A named step in a symbol path, also used for filter names and loop variables.
#[derive(Debug, Clone, Serialize)]
pub struct Identifier {
    text: String,
    position: Position,
}

impl Identifier {
    pub fn new(text: impl Into<String>, position: Position) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Identifier {}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A bracketed step: `[anything but a closing bracket]`.
#[derive(Debug, Clone, Serialize)]
pub struct Indexer {
    index: String,
    position: Position,
}

impl Indexer {
    pub fn new(index: impl Into<String>, position: Position) -> Self {
        Self {
            index: index.into(),
            position,
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

impl PartialEq for Indexer {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for Indexer {}

impl fmt::Display for Indexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SymbolExpressionStep {
    Identifier(Identifier),
    Indexer(Indexer),
}

impl SymbolExpressionStep {
    pub fn position(&self) -> Position {
        match self {
            SymbolExpressionStep::Identifier(identifier) => identifier.position(),
            SymbolExpressionStep::Indexer(indexer) => indexer.position(),
        }
    }
}

/// A dotted/bracketed value path. Never empty; the head is an identifier.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolExpression {
    steps: Vec<SymbolExpressionStep>,
}

impl SymbolExpression {
    pub fn new(head: Identifier, rest: Vec<SymbolExpressionStep>) -> Self {
        let mut steps = Vec::with_capacity(rest.len() + 1);
        steps.push(SymbolExpressionStep::Identifier(head));
        steps.extend(rest);
        Self { steps }
    }

    pub fn steps(&self) -> &[SymbolExpressionStep] {
        &self.steps
    }

    pub fn head(&self) -> &Identifier {
        match &self.steps[0] {
            SymbolExpressionStep::Identifier(identifier) => identifier,
            SymbolExpressionStep::Indexer(_) => unreachable!("symbol paths start with an identifier"),
        }
    }

    pub fn position(&self) -> Position {
        self.head().position()
    }
}

impl PartialEq for SymbolExpression {
    fn eq(&self, other: &Self) -> bool {
        self.steps == other.steps
    }
}

impl Eq for SymbolExpression {}

impl fmt::Display for SymbolExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                SymbolExpressionStep::Identifier(identifier) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    write!(f, "{}", identifier)?;
                }
                SymbolExpressionStep::Indexer(indexer) => write!(f, "{}", indexer)?,
            }
        }
        Ok(())
    }
}

/// Anything a substitution can inline: a bare path or a filtered one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentExpression {
    Symbol(SymbolExpression),
    FunctionCall(FunctionCallExpression),
}

impl ContentExpression {
    pub fn position(&self) -> Position {
        match self {
            ContentExpression::Symbol(symbol) => symbol.position(),
            ContentExpression::FunctionCall(call) => call.position(),
        }
    }

    /// The symbol at the bottom of any filter chain.
    pub fn root_symbol(&self) -> &SymbolExpression {
        match self {
            ContentExpression::Symbol(symbol) => symbol,
            ContentExpression::FunctionCall(call) => call.subject().root_symbol(),
        }
    }
}

impl fmt::Display for ContentExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentExpression::Symbol(symbol) => write!(f, "{}", symbol),
            ContentExpression::FunctionCall(call) => write!(f, "{}", call),
        }
    }
}

/// One pipeline stage: `subject | function`.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionCallExpression {
    subject: Box<ContentExpression>,
    function: Identifier,
    is_filter: bool,
}

impl FunctionCallExpression {
    pub fn new(subject: ContentExpression, function: Identifier, is_filter: bool) -> Self {
        Self {
            subject: Box::new(subject),
            function,
            is_filter,
        }
    }

    /// Wrap `subject` in a filter stage named by `function`.
    pub fn filter(subject: ContentExpression, function: Identifier) -> Self {
        Self::new(subject, function, true)
    }

    pub fn subject(&self) -> &ContentExpression {
        &self.subject
    }

    pub fn function(&self) -> &Identifier {
        &self.function
    }

    pub fn is_filter(&self) -> bool {
        self.is_filter
    }

    /// Position of the filter name, not of the subject.
    pub fn position(&self) -> Position {
        self.function.position()
    }
}

impl PartialEq for FunctionCallExpression {
    fn eq(&self, other: &Self) -> bool {
        self.function == other.function
            && self.is_filter == other.is_filter
            && self.subject == other.subject
    }
}

impl Eq for FunctionCallExpression {}

impl fmt::Display for FunctionCallExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.subject, self.function)
    }
}
