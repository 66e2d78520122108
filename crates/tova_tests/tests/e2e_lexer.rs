//! E2E Lexer: golden token streams for the context-sensitive rules.

use tova_language::lexer::tokenize;
use tova_language::token::TokenKind;

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source)
        .into_iter()
        .map(|t| t.kind)
        .filter(|k| !matches!(k, TokenKind::Newline | TokenKind::Eof))
        .collect()
}

#[test]
fn slash_after_identifier_is_division() {
    assert_eq!(
        kinds("total / parts"),
        vec![
            TokenKind::Ident("total".into()),
            TokenKind::Slash,
            TokenKind::Ident("parts".into()),
        ]
    );
}

#[test]
fn slash_after_return_is_regex() {
    let toks = kinds("return /ab?c/i");
    assert_eq!(toks[0], TokenKind::Return);
    assert_eq!(
        toks[1],
        TokenKind::Regex {
            pattern: "ab?c".into(),
            flags: "i".into(),
        }
    );
}

#[test]
fn regex_after_open_paren_and_assignment() {
    let toks = kinds("f(/a/, x = /b/g)");
    assert!(matches!(toks[2], TokenKind::Regex { .. }));
    assert!(matches!(toks[6], TokenKind::Regex { .. }));
}

#[test]
fn regex_character_class_may_contain_slash() {
    let toks = kinds("x = /[/]+/");
    assert_eq!(
        toks[2],
        TokenKind::Regex {
            pattern: "[/]+".into(),
            flags: String::new(),
        }
    );
}

#[test]
fn int_and_float_literals_are_distinct_kinds() {
    assert_eq!(
        kinds("1 1.0 1_000 0xff"),
        vec![
            TokenKind::Int(1),
            TokenKind::Float(1.0),
            TokenKind::Int(1000),
            TokenKind::Int(255),
        ]
    );
}

#[test]
fn range_operators_do_not_eat_number_dots() {
    assert_eq!(
        kinds("0..10"),
        vec![TokenKind::Int(0), TokenKind::DotDot, TokenKind::Int(10)]
    );
    assert_eq!(
        kinds("0..=10"),
        vec![TokenKind::Int(0), TokenKind::DotDotEq, TokenKind::Int(10)]
    );
}

#[test]
fn lexing_twice_produces_identical_tokens() {
    let source = "server \"api\" {\n    fn f(a) { a |> g(_) }\n}\nx = \"t {a + 1}\"\n";
    let first = tokenize(source);
    let second = tokenize(source);
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.span, b.span);
        assert_eq!(a.first_on_line, b.first_on_line);
    }
}

#[test]
fn every_token_has_one_based_position() {
    for tok in tokenize("a = 1\nb = [2]\n") {
        assert!(tok.span.line >= 1);
        assert!(tok.span.column >= 1);
    }
}

#[test]
fn keywords_lex_as_keywords() {
    assert_eq!(
        kinds("state route rate_limit"),
        vec![TokenKind::State, TokenKind::Route, TokenKind::RateLimit]
    );
}
