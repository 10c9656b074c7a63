//! Template tokens
//!
//! A [`Template`] is the ordered token list produced for one source string.
//! Block tokens (conditionals and repetitions) own nested templates, so the
//! tree is as deep as the block nesting in the source.

use serde::Serialize;

use super::location::Position;
use super::symbol::{ContentExpression, Identifier, SymbolExpression};

/// A fully parsed template. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Template {
    tokens: Vec<TemplateToken>,
}

impl Template {
    pub fn new(tokens: Vec<TemplateToken>) -> Self {
        Self { tokens }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &[TemplateToken] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Number of tokens in this template and every nested body.
    pub fn node_count(&self) -> usize {
        self.tokens
            .iter()
            .map(|token| match token {
                TemplateToken::Conditional(conditional) => {
                    1 + conditional.truthy().node_count() + conditional.falsy().node_count()
                }
                TemplateToken::Repetition(repetition) => 1 + repetition.body().node_count(),
                TemplateToken::Text(_) | TemplateToken::Substitution(_) => 1,
            })
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateToken {
    Text(TextToken),
    Substitution(SubstitutionToken),
    Conditional(ConditionalToken),
    Repetition(RepetitionToken),
}

impl TemplateToken {
    pub fn position(&self) -> Position {
        match self {
            TemplateToken::Text(text) => text.position(),
            TemplateToken::Substitution(substitution) => substitution.position(),
            TemplateToken::Conditional(conditional) => conditional.position(),
            TemplateToken::Repetition(repetition) => repetition.position(),
        }
    }

    /// Short debug label for diagnostics
    pub fn label(&self) -> String {
        match self {
            TemplateToken::Text(text) => format!("text {:?}", text.text()),
            TemplateToken::Substitution(substitution) => {
                format!("substitution {}", substitution.expression())
            }
            TemplateToken::Conditional(conditional) => {
                format!("{} {}", conditional.kind().keyword(), conditional.token())
            }
            TemplateToken::Repetition(repetition) => format!(
                "each {} in {}",
                repetition.enumerator(),
                repetition.collection()
            ),
        }
    }
}

/// Literal output, kept as the unescaped fragments it was parsed from.
#[derive(Debug, Clone, Serialize)]
pub struct TextToken {
    fragments: Vec<String>,
    position: Position,
}

impl TextToken {
    pub fn new(fragments: Vec<String>, position: Position) -> Self {
        Self {
            fragments,
            position,
        }
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// The literal text this token contributes to the output.
    pub fn text(&self) -> String {
        self.fragments.concat()
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

impl PartialEq for TextToken {
    fn eq(&self, other: &Self) -> bool {
        self.fragments == other.fragments
    }
}

impl Eq for TextToken {}

/// `#{expression}`
#[derive(Debug, Clone, Serialize)]
pub struct SubstitutionToken {
    expression: ContentExpression,
    position: Position,
}

impl SubstitutionToken {
    pub fn new(expression: ContentExpression, position: Position) -> Self {
        Self {
            expression,
            position,
        }
    }

    pub fn expression(&self) -> &ContentExpression {
        &self.expression
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

impl PartialEq for SubstitutionToken {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression
    }
}

impl Eq for SubstitutionToken {}

/// Which keyword opened a conditional block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalKind {
    If,
    Unless,
}

impl ConditionalKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ConditionalKind::If => "if",
            ConditionalKind::Unless => "unless",
        }
    }

    /// Case-insensitive keyword lookup.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        if keyword.eq_ignore_ascii_case("if") {
            Some(ConditionalKind::If)
        } else if keyword.eq_ignore_ascii_case("unless") {
            Some(ConditionalKind::Unless)
        } else {
            None
        }
    }
}

/// `#{if X}...#{/if}` or `#{unless X}...#{/unless}`.
///
/// The body lands in `truthy` for `if` and in `falsy` for `unless`; the other
/// branch is always empty. An empty body (`#{if X}#{/if}`) therefore leaves
/// both branches empty, so callers cannot tell the two kinds apart by their
/// branches alone and should check [`ConditionalToken::kind`].
#[derive(Debug, Clone, Serialize)]
pub struct ConditionalToken {
    #[serde(rename = "keyword")]
    kind: ConditionalKind,
    token: SymbolExpression,
    truthy: Template,
    falsy: Template,
    position: Position,
}

impl ConditionalToken {
    pub fn new(
        kind: ConditionalKind,
        token: SymbolExpression,
        body: Template,
        position: Position,
    ) -> Self {
        let (truthy, falsy) = match kind {
            ConditionalKind::If => (body, Template::empty()),
            ConditionalKind::Unless => (Template::empty(), body),
        };
        Self {
            kind,
            token,
            truthy,
            falsy,
            position,
        }
    }

    pub fn kind(&self) -> ConditionalKind {
        self.kind
    }

    /// The guarding symbol
    pub fn token(&self) -> &SymbolExpression {
        &self.token
    }

    pub fn truthy(&self) -> &Template {
        &self.truthy
    }

    pub fn falsy(&self) -> &Template {
        &self.falsy
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

impl PartialEq for ConditionalToken {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.token == other.token
            && self.truthy == other.truthy
            && self.falsy == other.falsy
    }
}

impl Eq for ConditionalToken {}

/// `#{each enumerator in collection}...#{/each}`
#[derive(Debug, Clone, Serialize)]
pub struct RepetitionToken {
    collection: SymbolExpression,
    enumerator: Identifier,
    body: Template,
    position: Position,
}

impl RepetitionToken {
    pub fn new(
        collection: SymbolExpression,
        enumerator: Identifier,
        body: Template,
        position: Position,
    ) -> Self {
        Self {
            collection,
            enumerator,
            body,
            position,
        }
    }

    pub fn collection(&self) -> &SymbolExpression {
        &self.collection
    }

    pub fn enumerator(&self) -> &Identifier {
        &self.enumerator
    }

    pub fn body(&self) -> &Template {
        &self.body
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

impl PartialEq for RepetitionToken {
    fn eq(&self, other: &Self) -> bool {
        self.collection == other.collection
            && self.enumerator == other.enumerator
            && self.body == other.body
    }
}

impl Eq for RepetitionToken {}
