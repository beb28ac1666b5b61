//! Operator tables.

use es_ir::{AssignOp, TokenKind};

pub(crate) const MAX_OPERATOR_WIDTH: usize = 3;

/// Token for an operator spelled exactly `text`.
pub(crate) fn operator(text: &str) -> Option<TokenKind> {
    let kind = match text {
        // double
        "==" => TokenKind::EqEq,
        "!=" => TokenKind::NotEq,
        ">=" => TokenKind::GtEq,
        "<=" => TokenKind::LtEq,
        "+=" => TokenKind::Assign(AssignOp::Add),
        "-=" => TokenKind::Assign(AssignOp::Subtract),
        "*=" => TokenKind::Assign(AssignOp::Multiply),
        "/=" => TokenKind::Assign(AssignOp::Divide),
        "&&" => TokenKind::AmpAmp,
        "||" => TokenKind::PipePipe,
        "??" => TokenKind::QuestionQuestion,
        "?." => TokenKind::QuestionDot,
        // single
        "*" => TokenKind::Star,
        "/" => TokenKind::Slash,
        "+" => TokenKind::Plus,
        "-" => TokenKind::Minus,
        "(" => TokenKind::LParen,
        ")" => TokenKind::RParen,
        "^" => TokenKind::Caret,
        "%" => TokenKind::Percent,
        "{" => TokenKind::LBrace,
        "}" => TokenKind::RBrace,
        "," => TokenKind::Comma,
        "[" => TokenKind::LBracket,
        "]" => TokenKind::RBracket,
        ";" => TokenKind::EndStatement,
        ":" => TokenKind::Colon,
        "." => TokenKind::Dot,
        "=" => TokenKind::Assign(AssignOp::Set),
        ">" => TokenKind::Gt,
        "<" => TokenKind::Lt,
        "!" => TokenKind::Bang,
        "|" => TokenKind::Pipe,
        "&" => TokenKind::Amp,
        "~" => TokenKind::Tilde,
        "?" => TokenKind::Question,
        _ => return None,
    };
    Some(kind)
}
