//! Lexer output.

use std::fmt;
use std::rc::Rc;

use crate::{AssignOp, Name, Position};

/// Reserved words. Identifiers matching one of these lex as [`TokenKind::Keyword`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Keyword {
    Var,
    Let,
    Global,
    Local,
    Const,
    Mutable,
    If,
    Else,
    While,
    For,
    In,
    Continue,
    Break,
    Func,
    Return,
    Yield,
    Class,
    Extends,
    Namespace,
    Try,
    Catch,
}

impl Keyword {
    pub const ALL: [Keyword; 21] = [
        Keyword::Var,
        Keyword::Let,
        Keyword::Global,
        Keyword::Local,
        Keyword::Const,
        Keyword::Mutable,
        Keyword::If,
        Keyword::Else,
        Keyword::While,
        Keyword::For,
        Keyword::In,
        Keyword::Continue,
        Keyword::Break,
        Keyword::Func,
        Keyword::Return,
        Keyword::Yield,
        Keyword::Class,
        Keyword::Extends,
        Keyword::Namespace,
        Keyword::Try,
        Keyword::Catch,
    ];

    pub fn from_word(word: &str) -> Option<Keyword> {
        Keyword::ALL.into_iter().find(|kw| kw.as_str() == word)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Var => "var",
            Keyword::Let => "let",
            Keyword::Global => "global",
            Keyword::Local => "local",
            Keyword::Const => "const",
            Keyword::Mutable => "mutable",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::For => "for",
            Keyword::In => "in",
            Keyword::Continue => "continue",
            Keyword::Break => "break",
            Keyword::Func => "func",
            Keyword::Return => "return",
            Keyword::Yield => "yield",
            Keyword::Class => "class",
            Keyword::Extends => "extends",
            Keyword::Namespace => "namespace",
            Keyword::Try => "try",
            Keyword::Catch => "catch",
        }
    }

    /// Declaration modifiers: `var let global local const mutable`.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Keyword::Var
                | Keyword::Let
                | Keyword::Global
                | Keyword::Local
                | Keyword::Const
                | Keyword::Mutable
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Number(f64),
    String(Rc<str>),
    Identifier(Name),
    Keyword(Keyword),

    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Percent,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Dot,
    Question,
    Tilde,
    Bang,
    Lt,
    Gt,
    Amp,
    Pipe,

    EqEq,
    NotEq,
    LtEq,
    GtEq,
    AmpAmp,
    PipePipe,
    QuestionQuestion,
    QuestionDot,

    /// `=`, `+=`, `-=`, `*=`, `/=`
    Assign(AssignOp),
    /// `;`
    EndStatement,
    Eof,
}

impl TokenKind {
    /// Short description used in "expected X, found Y" messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Number(n) => format!("number {n}"),
            TokenKind::String(s) => format!("string '{s}'"),
            TokenKind::Identifier(_) => "identifier".to_string(),
            TokenKind::Keyword(kw) => format!("keyword '{}'", kw.as_str()),
            TokenKind::Assign(op) => format!("'{}'", op.as_symbol()),
            TokenKind::EndStatement => "';'".to_string(),
            TokenKind::Eof => "end of file".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Caret => "^",
            TokenKind::Percent => "%",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Dot => ".",
            TokenKind::Question => "?",
            TokenKind::Tilde => "~",
            TokenKind::Bang => "!",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::QuestionQuestion => "??",
            TokenKind::QuestionDot => "?.",
            _ => "",
        }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self, TokenKind::Keyword(kw) if *kw == keyword)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, position: Position) -> Self {
        Token { kind, position }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind.describe())
    }
}
