//! Template rules
//!
//! At every position the alternatives are tried in this order:
//!
//! ```text
//! conditional   #{if X}...#{/if}  |  #{unless X}...#{/unless}
//! repetition    #{each x in Xs}...#{/each}
//! substitution  #{expression}     (never #{/..., never a block opener)
//! text          literal characters and # escapes
//! ```
//!
//! Block bodies re-enter the template rule through `recursive`, so they stop
//! at the first `#{/` they cannot consume, which is where the closing tag
//! must be.

use chumsky::prelude::*;
use chumsky::text;
use std::ops::Range;

use crate::ast::{
    ConditionalKind, ConditionalToken, RepetitionToken, SubstitutionToken, Template,
    TemplateToken, TextToken,
};
use crate::parsing::combinators::{
    enumerator, keyword, whitespace0, whitespace1, ParserError, Source,
};
use crate::parsing::symbols::{expression, symbol};

/// Literal text. Each alternative yields one unescaped fragment:
///
/// - a run of characters other than `#`
/// - `#` at the very end of input -> `#`
/// - `##` when `#{` follows -> `#`
/// - `##{` -> `#{`
/// - `#` and any character but `{` -> both characters
pub(crate) fn text_token(source: Source) -> impl Parser<char, TextToken, Error = ParserError> + Clone {
    let run = filter(|c: &char| *c != '#')
        .repeated()
        .at_least(1)
        .collect::<String>();
    let trailing_hash = just('#').then_ignore(end()).to("#".to_string());
    let hash_before_delimiter = just("##")
        .then_ignore(just("#{").rewind())
        .to("#".to_string());
    let escaped_delimiter = just("##{").to("#{".to_string());
    let literal_hash = just('#')
        .ignore_then(filter(|c: &char| *c != '{'))
        .map(|c| format!("#{}", c));

    choice((
        run,
        trailing_hash,
        hash_before_delimiter,
        escaped_delimiter,
        literal_hash,
    ))
    .repeated()
    .at_least(1)
    .map_with_span(move |fragments, span: Range<usize>| {
        TextToken::new(fragments, source.position_at(span.start))
    })
    .labelled("text")
}

/// What may follow `#{` without it being a substitution: a closing tag or
/// a block keyword.
fn block_tag_ahead() -> impl Parser<char, (), Error = ParserError> + Clone {
    choice((
        just('/').ignored(),
        whitespace0()
            .ignore_then(choice((keyword("if"), keyword("unless"), keyword("each"))))
            .then_ignore(whitespace1()),
    ))
}

/// Succeeds without consuming unless a block tag follows. A closing tag
/// here has no block to close, since block bodies stop in front of theirs.
fn no_block_tag_ahead() -> impl Parser<char, (), Error = ParserError> + Clone {
    block_tag_ahead()
        .not()
        .rewind()
        .ignored()
        .map_err(|error: ParserError| match error.found() {
            Some('/') => ParserError::custom(error.span(), "closing tag without an open block"),
            Some(_) => ParserError::custom(error.span(), "block keyword cannot start a substitution"),
            None => error,
        })
}

/// `#{expression}`
pub(crate) fn substitution(
    source: Source,
) -> impl Parser<char, SubstitutionToken, Error = ParserError> + Clone {
    just("#{")
        .ignore_then(no_block_tag_ahead())
        .ignore_then(whitespace0())
        .ignore_then(expression(source.clone()))
        .then_ignore(whitespace0())
        .then_ignore(just('}'))
        .map_with_span(move |expression, span: Range<usize>| {
            SubstitutionToken::new(expression, source.position_at(span.start))
        })
        .labelled("substitution")
}

/// `#{/keyword}`, yielding the keyword as written
fn closing_tag() -> impl Parser<char, (String, Range<usize>), Error = ParserError> + Clone {
    just("#{/")
        .ignore_then(text::ident::<char, ParserError>())
        .then_ignore(just('}'))
        .map_with_span(|word, span: Range<usize>| (word, span))
        .labelled("closing tag")
}

fn mismatched_closer(opened: &str, closing: &str, span: Range<usize>) -> ParserError {
    ParserError::custom(
        span,
        format!(
            "expected #{{/{}}} to close #{{{}}}, found #{{/{}}}",
            opened, opened, closing
        ),
    )
}

/// `#{if X}body#{/if}` and `#{unless X}body#{/unless}`
pub(crate) fn conditional<P>(
    source: Source,
    template: P,
) -> impl Parser<char, ConditionalToken, Error = ParserError> + Clone
where
    P: Parser<char, Template, Error = ParserError> + Clone + 'static,
{
    let kind = choice((
        keyword("if").to(ConditionalKind::If),
        keyword("unless").to(ConditionalKind::Unless),
    ));

    just("#{")
        .ignore_then(whitespace0())
        .ignore_then(kind)
        .then_ignore(whitespace1())
        .then(symbol(source.clone()))
        .then_ignore(whitespace0())
        .then_ignore(just('}'))
        .then(template)
        .then(closing_tag())
        .try_map(move |(((kind, token), body), (closing, closing_span)), span| {
            if ConditionalKind::from_keyword(&closing) == Some(kind) {
                Ok(ConditionalToken::new(
                    kind,
                    token,
                    body,
                    source.position_at(span.start),
                ))
            } else {
                Err(mismatched_closer(kind.keyword(), &closing, closing_span))
            }
        })
        .labelled("conditional")
}

/// `#{each item in Items}body#{/each}`
pub(crate) fn repetition<P>(
    source: Source,
    template: P,
) -> impl Parser<char, RepetitionToken, Error = ParserError> + Clone
where
    P: Parser<char, Template, Error = ParserError> + Clone + 'static,
{
    just("#{")
        .ignore_then(whitespace0())
        .ignore_then(keyword("each"))
        .ignore_then(whitespace1())
        .ignore_then(enumerator(source.clone()))
        .then_ignore(whitespace1())
        .then_ignore(keyword("in"))
        .then_ignore(whitespace1())
        .then(symbol(source.clone()))
        .then_ignore(whitespace0())
        .then_ignore(just('}'))
        .then(template)
        .then(closing_tag())
        .try_map(move |(((enumerator, collection), body), (closing, closing_span)), span| {
            if closing.eq_ignore_ascii_case("each") {
                Ok(RepetitionToken::new(
                    collection,
                    enumerator,
                    body,
                    source.position_at(span.start),
                ))
            } else {
                Err(mismatched_closer("each", &closing, closing_span))
            }
        })
        .labelled("repetition")
}

/// Build the template parser: a (possibly empty) token sequence whose block
/// bodies recurse into the same rule.
pub(crate) fn build_template_parser(
    source: Source,
) -> impl Parser<char, Template, Error = ParserError> + Clone {
    recursive(move |template| {
        choice((
            conditional(source.clone(), template.clone()).map(TemplateToken::Conditional),
            repetition(source.clone(), template).map(TemplateToken::Repetition),
            substitution(source.clone()).map(TemplateToken::Substitution),
            text_token(source.clone()).map(TemplateToken::Text),
        ))
        .repeated()
        .map(Template::new)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ContentExpression, SourceLocation};
    use std::sync::Arc;

    fn parse(input: &str) -> Result<Template, Vec<ParserError>> {
        build_template_parser(Arc::new(SourceLocation::new(input)))
            .then_ignore(end())
            .parse(input)
    }

    fn only_text(template: &Template) -> Vec<String> {
        match template.tokens() {
            [TemplateToken::Text(text)] => text.fragments().to_vec(),
            other => panic!("expected a single text token, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_template() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn test_plain_text_is_one_fragment() {
        assert_eq!(only_text(&parse("Hello, world").unwrap()), vec!["Hello, world"]);
    }

    #[test]
    fn test_escaped_delimiter() {
        assert_eq!(only_text(&parse("##{foo}").unwrap()), vec!["#{", "foo}"]);
    }

    #[test]
    fn test_lone_trailing_hash() {
        assert_eq!(only_text(&parse("#").unwrap()), vec!["#"]);
        assert_eq!(only_text(&parse("C#").unwrap()), vec!["C", "#"]);
    }

    #[test]
    fn test_hash_followed_by_other_character() {
        assert_eq!(only_text(&parse("#1 #a").unwrap()), vec!["#1", " ", "#a"]);
    }

    #[test]
    fn test_double_hash_before_real_delimiter() {
        let template = parse("###{x}").unwrap();
        assert_eq!(template.len(), 2);
        match &template.tokens()[0] {
            TemplateToken::Text(text) => assert_eq!(text.text(), "#"),
            other => panic!("expected text, got {:?}", other),
        }
        match &template.tokens()[1] {
            TemplateToken::Substitution(sub) => assert_eq!(sub.expression().to_string(), "x"),
            other => panic!("expected substitution, got {:?}", other),
        }
    }

    #[test]
    fn test_substitution_with_padding() {
        let template = parse("#{  Foo.Bar  }").unwrap();
        match template.tokens() {
            [TemplateToken::Substitution(sub)] => {
                assert!(matches!(sub.expression(), ContentExpression::Symbol(_)));
                assert_eq!(sub.expression().to_string(), "Foo.Bar");
                assert_eq!(sub.position().offset, 0);
            }
            other => panic!("expected a substitution, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_substitution_fails() {
        assert!(parse("#{Foo").is_err());
        assert!(parse("#{").is_err());
    }

    #[test]
    fn test_stray_closer_fails() {
        assert!(parse("text #{/if}").is_err());
    }

    #[test]
    fn test_stray_closer_names_the_problem() {
        let errors = parse("a #{/if}").unwrap_err();
        let error = errors
            .iter()
            .max_by_key(|error| error.span().start)
            .unwrap();
        assert_eq!(error.span().start, 4);
        assert_eq!(error.reason(), Some("closing tag without an open block"));
    }

    #[test]
    fn test_mismatched_closer_reason() {
        let errors = parse("#{if X}A#{/unless}").unwrap_err();
        let reasons: Vec<&str> = errors.iter().filter_map(|error| error.reason()).collect();
        assert_eq!(reasons, vec!["expected #{/if} to close #{if}, found #{/unless}"]);
    }

    #[test]
    fn test_conditional_keyword_case() {
        let template = parse("#{IF Foo}a#{/if}").unwrap();
        assert!(matches!(template.tokens(), [TemplateToken::Conditional(_)]));
    }

    #[test]
    fn test_block_opener_without_closer_fails() {
        assert!(parse("#{if X}A").is_err());
        assert!(parse("#{each x in Xs}A").is_err());
        assert!(parse("#{unless X}").is_err());
    }

    #[test]
    fn test_keyword_prefixed_names_are_symbols() {
        let template = parse("#{iffy}#{eachOne}#{if}").unwrap();
        assert_eq!(template.len(), 3);
        assert!(template
            .tokens()
            .iter()
            .all(|token| matches!(token, TemplateToken::Substitution(_))));
    }

    #[test]
    fn test_mismatched_repetition_closer_fails() {
        assert!(parse("#{each x in Xs}A#{/if}").is_err());
    }
}
