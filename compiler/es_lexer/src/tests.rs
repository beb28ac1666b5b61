#![allow(clippy::unwrap_used)]

use std::rc::Rc;
use std::sync::Arc;

use es_diagnostic::ErrorKind;
use es_ir::{AssignOp, Keyword, StringInterner, TokenKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::generate;

fn kinds(source: &str) -> Vec<TokenKind> {
    let interner = StringInterner::new();
    generate(source, None, &interner)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn empty_source_is_just_eof() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
    assert_eq!(kinds("  \n\t "), vec![TokenKind::Eof]);
}

#[test]
fn numbers() {
    assert_eq!(
        kinds("1.99 1_000 7"),
        vec![
            TokenKind::Number(1.99),
            TokenKind::Number(1000.0),
            TokenKind::Number(7.0),
            TokenKind::Eof
        ]
    );
}

#[test]
fn dot_without_digit_ends_number() {
    let interner = StringInterner::new();
    let tokens = generate("1.foo", None, &interner).unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Number(1.0));
    assert_eq!(tokens[1].kind, TokenKind::Dot);
    assert_eq!(
        tokens[2].kind,
        TokenKind::Identifier(interner.intern("foo"))
    );
}

#[test]
fn second_dot_ends_number() {
    assert_eq!(
        kinds("1.2.3")[..3],
        [
            TokenKind::Number(1.2),
            TokenKind::Dot,
            TokenKind::Number(3.0)
        ]
    );
}

#[test]
fn keywords_and_identifiers() {
    let interner = StringInterner::new();
    let tokens = generate("var x_1 = $y", None, &interner).unwrap();
    let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Keyword(Keyword::Var),
            TokenKind::Identifier(interner.intern("x_1")),
            TokenKind::Assign(AssignOp::Set),
            TokenKind::Identifier(interner.intern("$y")),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn strings_with_every_quote_and_escapes() {
    assert_eq!(
        kinds(r#"'a' "b\n" `c\'d`"#),
        vec![
            TokenKind::String(Rc::from("a")),
            TokenKind::String(Rc::from("b\n")),
            TokenKind::String(Rc::from("c'd")),
            TokenKind::Eof
        ]
    );
}

#[test]
fn unterminated_string_is_an_error() {
    let interner = StringInterner::new();
    let err = generate("x = 'abc", None, &interner).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidSyntax);
    assert_eq!(err.position.column, 4);
}

#[test]
fn comments_are_skipped() {
    assert_eq!(
        kinds("1 // one\n/* two\n */ 2"),
        vec![TokenKind::Number(1.0), TokenKind::Number(2.0), TokenKind::Eof]
    );
}

#[test]
fn longest_operator_wins() {
    assert_eq!(
        kinds("== = += <= < ?? ?. && &"),
        vec![
            TokenKind::EqEq,
            TokenKind::Assign(AssignOp::Set),
            TokenKind::Assign(AssignOp::Add),
            TokenKind::LtEq,
            TokenKind::Lt,
            TokenKind::QuestionQuestion,
            TokenKind::QuestionDot,
            TokenKind::AmpAmp,
            TokenKind::Amp,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn semicolon_ends_statement() {
    assert_eq!(
        kinds("1;"),
        vec![TokenKind::Number(1.0), TokenKind::EndStatement, TokenKind::Eof]
    );
}

#[test]
fn illegal_character_reports_position() {
    let interner = StringInterner::new();
    let err = generate("a = 1\n  #", Some(Arc::from("bad.es")), &interner).unwrap_err();
    assert_eq!(err.kind, ErrorKind::IllegalChar);
    assert_eq!(err.details, "'#'");
    assert_eq!(err.position.to_string(), "bad.es:2:3");
}

#[test]
fn positions_point_at_token_start() {
    let interner = StringInterner::new();
    let tokens = generate("a\n  bb", None, &interner).unwrap();
    assert_eq!((tokens[1].position.line, tokens[1].position.column), (1, 2));
    assert_eq!(tokens[2].position.index, 6);
}

proptest! {
    #[test]
    fn integer_literals_lex_to_their_value(n in 0u32..u32::MAX) {
        prop_assert_eq!(kinds(&n.to_string())[0].clone(), TokenKind::Number(f64::from(n)));
    }

    #[test]
    fn decimal_literals_lex_to_their_value(whole in 0u32..100_000, frac in 0u32..1000) {
        let text = format!("{whole}.{frac:03}");
        let expected: f64 = text.parse().unwrap();
        prop_assert_eq!(kinds(&text)[0].clone(), TokenKind::Number(expected));
    }
}
