//! Recursive descent parser.
//!
//! Turns the lexer's token stream into a [`Program`]. Statements are separated by
//! `;`; `if`, `while`, `for`, `try` and named `func`/`class`/`namespace`
//! declarations end at their closing brace without one.

mod context;
mod cursor;
mod error;
mod grammar;

use es_diagnostic::EsError;
use es_ir::{Name, Position, Program, StringInterner, Token, TokenKind};

pub use context::ParseContext;
pub use cursor::Cursor;
pub use error::{ErrorContext, ParseError};

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse a whole token stream.
#[tracing::instrument(level = "debug", skip_all, fields(tokens = tokens.len()))]
pub fn parse(tokens: &[Token], interner: &StringInterner) -> Result<Program, EsError> {
    if tokens.is_empty() {
        return Ok(Program::default());
    }
    let mut parser = Parser::new(tokens, interner);
    parser.program().map_err(ParseError::into_diagnostic)
}

/// Saved parser state for speculative parsing.
#[derive(Clone, Copy, Debug)]
pub struct ParserSnapshot {
    cursor_pos: usize,
    context: ParseContext,
}

pub struct Parser<'a> {
    cursor: Cursor<'a>,
    interner: &'a StringInterner,
    context: ParseContext,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], interner: &'a StringInterner) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            interner,
            context: ParseContext::NONE,
        }
    }

    pub fn snapshot(&self) -> ParserSnapshot {
        ParserSnapshot {
            cursor_pos: self.cursor.position(),
            context: self.context,
        }
    }

    pub fn restore(&mut self, snapshot: ParserSnapshot) {
        self.cursor.set_position(snapshot.cursor_pos);
        self.context = snapshot.context;
    }

    fn current_kind(&self) -> &'a TokenKind {
        self.cursor.current_kind()
    }

    fn position(&self) -> Position {
        self.cursor.current_position()
    }

    /// Error pointing at the current token.
    #[cold]
    fn unexpected(&self, expected: &str) -> ParseError {
        let found = self.cursor.current();
        ParseError::new(
            format!("Expected {expected}, found {found}"),
            found.position.clone(),
        )
    }

    fn expect(&mut self, kind: &TokenKind) -> ParseResult<()> {
        if self.cursor.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(&kind.describe()))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<Name> {
        match self.current_kind() {
            TokenKind::Identifier(name) => {
                let name = *name;
                self.cursor.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Run `f` under `context`, restoring the previous context afterwards.
    fn with_context<T>(&mut self, context: ParseContext, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.context;
        self.context = context;
        let result = f(self);
        self.context = saved;
        result
    }

    /// Run `f`, labelling any error it returns with `context`.
    fn in_error_context<T>(
        &mut self,
        context: ErrorContext,
        f: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        f(self).map_err(|err| err.in_context(context))
    }
}

#[cfg(test)]
mod tests;
