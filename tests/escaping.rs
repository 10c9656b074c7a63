//! Escaping rules for literal `#` and `#{` in template text

use hashbrace::{parse, TemplateToken};
use rstest::rstest;

fn single_text(source: &str) -> String {
    let template = parse(source).unwrap();
    match template.tokens() {
        [TemplateToken::Text(text)] => text.text(),
        other => panic!("expected one text token for {:?}, got {:?}", source, other),
    }
}

#[rstest]
#[case::plain("plain text", "plain text")]
#[case::escaped_delimiter("##{Foo}", "#{Foo}")]
#[case::hash_then_space("a # b", "a # b")]
#[case::lone_hash("#", "#")]
#[case::trailing_hash("50#", "50#")]
#[case::double_hash_alone("##", "##")]
#[case::languages("C# and F#", "C# and F#")]
#[case::hash_then_brace_close("#}", "#}")]
#[case::triple_hash("###", "###")]
#[case::quadruple_hash_before_brace("####{x}", "###{x}")]
#[case::escape_inside_text("say ##{hi} twice ##{hi}", "say #{hi} twice #{hi}")]
#[case::braces_alone("{ not a tag }", "{ not a tag }")]
#[case::multiline("line one\nline #2", "line one\nline #2")]
fn test_text_unescaping(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(single_text(source), expected);
}

#[test]
fn test_double_hash_before_substitution_yields_literal_hash() {
    let template = parse("Issue ###{Number}").unwrap();
    match template.tokens() {
        [TemplateToken::Text(text), TemplateToken::Substitution(substitution)] => {
            assert_eq!(text.text(), "Issue #");
            assert_eq!(substitution.expression().to_string(), "Number");
        }
        other => panic!("unexpected tokens {:?}", other),
    }
}

#[test]
fn test_text_keeps_fragments() {
    let template = parse("a##{b").unwrap();
    match template.tokens() {
        [TemplateToken::Text(text)] => assert_eq!(text.fragments(), ["a", "#{", "b"]),
        other => panic!("unexpected tokens {:?}", other),
    }
}

#[rstest]
#[case::unterminated("#{Foo")]
#[case::bare_opener("#{")]
#[case::empty_substitution("#{}")]
#[case::blank_substitution("#{   }")]
#[case::empty_indexer("#{Foo[]}")]
#[case::unclosed_indexer("#{Foo[Bar}")]
#[case::trailing_dot("#{Foo.}")]
#[case::dangling_pipe("#{Foo |}")]
fn test_malformed_substitutions_fail(#[case] source: &str) {
    assert!(parse(source).is_err(), "{:?} should not parse", source);
}
