//! Token cursor for navigating the token stream.

use es_ir::{Keyword, Position, Token, TokenKind};
use tracing::trace;

/// Position in a token stream that always ends with [`TokenKind::Eof`].
pub struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// `tokens` must be non-empty and end with `Eof`, as the lexer guarantees.
    pub fn new(tokens: &'a [Token]) -> Self {
        Cursor { tokens, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Rewind or skip to `pos`, as recorded by [`Cursor::position`].
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.last());
    }

    fn last(&self) -> usize {
        self.tokens.len().saturating_sub(1)
    }

    #[inline]
    pub fn current(&self) -> &'a Token {
        &self.tokens[self.pos.min(self.last())]
    }

    #[inline]
    pub fn current_kind(&self) -> &'a TokenKind {
        &self.current().kind
    }

    pub fn current_position(&self) -> Position {
        self.current().position.clone()
    }

    /// Kind of the token `offset` places ahead; `Eof` past the end.
    pub fn peek_kind_at(&self, offset: usize) -> &'a TokenKind {
        &self.tokens[(self.pos + offset).min(self.last())].kind
    }

    pub fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    pub fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == kind
    }

    pub fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current_kind().is_keyword(keyword)
    }

    /// Consume the current token. Never moves past `Eof`.
    pub fn advance(&mut self) -> &'a Token {
        let token = self.current();
        trace!(kind = ?token.kind, pos = self.pos, "advance");
        if self.pos < self.last() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it is `kind`.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests;
