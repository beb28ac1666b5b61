use es_ir::{Position, Token, TokenKind};
use pretty_assertions::assert_eq;

use super::Cursor;

fn stream(kinds: Vec<TokenKind>) -> Vec<Token> {
    kinds
        .into_iter()
        .map(|kind| Token::new(kind, Position::UNKNOWN))
        .collect()
}

#[test]
fn advance_stops_at_eof() {
    let tokens = stream(vec![TokenKind::Plus, TokenKind::Eof]);
    let mut cursor = Cursor::new(&tokens);

    assert_eq!(cursor.advance().kind, TokenKind::Plus);
    assert_eq!(cursor.advance().kind, TokenKind::Eof);
    assert!(cursor.is_at_end());
    assert_eq!(cursor.position(), 1);
}

#[test]
fn peek_past_end_is_eof() {
    let tokens = stream(vec![TokenKind::Minus, TokenKind::Eof]);
    let cursor = Cursor::new(&tokens);
    assert_eq!(cursor.peek_kind_at(1), &TokenKind::Eof);
    assert_eq!(cursor.peek_kind_at(10), &TokenKind::Eof);
}

#[test]
fn set_position_rewinds() {
    let tokens = stream(vec![TokenKind::Star, TokenKind::Slash, TokenKind::Eof]);
    let mut cursor = Cursor::new(&tokens);
    cursor.advance();
    cursor.advance();
    cursor.set_position(0);
    assert!(cursor.check(&TokenKind::Star));
    assert!(cursor.eat(&TokenKind::Star));
    assert!(!cursor.eat(&TokenKind::Star));
}
