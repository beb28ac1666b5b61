//! Lexer: source text to a flat token stream.
//!
//! One left-to-right pass with no backtracking. Operators are matched against the
//! triple, double and single character tables in that order, so `==` never lexes
//! as two `=`. The stream always ends with [`TokenKind::Eof`].

mod cursor;
mod tables;

use std::rc::Rc;
use std::sync::Arc;

use es_diagnostic::EsError;
use es_ir::{Keyword, StringInterner, Token, TokenKind};
use tracing::debug;

use crate::cursor::Cursor;

const WHITESPACE: [char; 4] = [' ', '\t', '\r', '\n'];

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

/// Lex `source` into tokens.
///
/// `file` is recorded on every token position for error reporting.
#[tracing::instrument(level = "debug", skip_all, fields(file = file.as_deref().unwrap_or("<anonymous>")))]
pub fn generate(
    source: &str,
    file: Option<Arc<str>>,
    interner: &StringInterner,
) -> Result<Vec<Token>, EsError> {
    let mut lexer = Lexer {
        cursor: Cursor::new(source, file),
        interner,
        tokens: Vec::new(),
    };
    lexer.run()?;
    debug!(count = lexer.tokens.len(), "lexed");
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    cursor: Cursor<'a>,
    interner: &'a StringInterner,
    tokens: Vec<Token>,
}

impl Lexer<'_> {
    fn run(&mut self) -> Result<(), EsError> {
        while let Some(ch) = self.cursor.peek() {
            if WHITESPACE.contains(&ch) {
                self.cursor.bump();
            } else if ch == '/' && self.cursor.peek_second() == Some('/') {
                self.cursor.skip_line();
            } else if ch == '/' && self.cursor.peek_second() == Some('*') {
                self.cursor.skip_block_comment();
            } else if ch.is_ascii_digit() {
                self.number()?;
            } else if is_ident_start(ch) {
                self.identifier();
            } else if matches!(ch, '"' | '\'' | '`') {
                self.string(ch)?;
            } else {
                self.operator(ch)?;
            }
        }
        let eof = self.cursor.position();
        self.tokens.push(Token::new(TokenKind::Eof, eof));
        Ok(())
    }

    fn number(&mut self) -> Result<(), EsError> {
        let start = self.cursor.position();
        let mut text = String::new();
        let mut seen_dot = false;

        while let Some(ch) = self.cursor.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
            } else if ch == '_' {
                // digit group separator
            } else if ch == '.'
                && !seen_dot
                && self.cursor.peek_second().is_some_and(|c| c.is_ascii_digit())
            {
                seen_dot = true;
                text.push(ch);
            } else {
                break;
            }
            self.cursor.bump();
        }

        let value: f64 = text.parse().map_err(|_| {
            EsError::invalid_syntax(format!("Invalid number literal '{text}'")).at(start.clone())
        })?;
        self.tokens.push(Token::new(TokenKind::Number(value), start));
        Ok(())
    }

    fn identifier(&mut self) {
        let start = self.cursor.position();
        let word = self.cursor.eat_while(is_ident_continue);
        let kind = match Keyword::from_word(word) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Identifier(self.interner.intern(word)),
        };
        self.tokens.push(Token::new(kind, start));
    }

    fn string(&mut self, quote: char) -> Result<(), EsError> {
        let start = self.cursor.position();
        self.cursor.bump();

        let mut text = String::new();
        loop {
            match self.cursor.bump() {
                None => {
                    return Err(EsError::invalid_syntax("Unterminated string literal").at(start));
                }
                Some(ch) if ch == quote => break,
                Some('\\') => match self.cursor.bump() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some(other) => text.push(other),
                    None => {
                        return Err(
                            EsError::invalid_syntax("Unterminated string literal").at(start)
                        );
                    }
                },
                Some(ch) => text.push(ch),
            }
        }

        self.tokens
            .push(Token::new(TokenKind::String(Rc::from(text)), start));
        Ok(())
    }

    fn operator(&mut self, first: char) -> Result<(), EsError> {
        let start = self.cursor.position();

        // Longest match first: triple, then double, then single characters.
        for width in (1..=tables::MAX_OPERATOR_WIDTH).rev() {
            let Some(text) = self.cursor.peek_chars(width) else {
                continue;
            };
            if let Some(kind) = tables::operator(text) {
                for _ in 0..width {
                    self.cursor.bump();
                }
                self.tokens.push(Token::new(kind, start));
                return Ok(());
            }
        }
        Err(EsError::illegal_char(first).at(start))
    }
}

#[cfg(test)]
mod tests;
