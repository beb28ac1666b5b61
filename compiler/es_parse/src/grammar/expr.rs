//! Binary operator ladder, unary operators and postfix chains.
//!
//! Precedence, low to high: logical, comparison (with `!` prefix), additive,
//! multiplicative, unary, power, postfix, primary. Every binary level folds
//! left-associatively.

use es_ir::{BinaryOp, Keyword, Name, Node, NodeKind, TokenKind, UnaryOp};
use es_stack::ensure_sufficient_stack;

use crate::{ErrorContext, ParseResult, Parser};

type Production<'a> = fn(&mut Parser<'a>) -> ParseResult<Node>;

fn logical_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Amp | TokenKind::AmpAmp => Some(BinaryOp::And),
        TokenKind::Pipe | TokenKind::PipePipe => Some(BinaryOp::Or),
        TokenKind::QuestionQuestion => Some(BinaryOp::Coalesce),
        TokenKind::Keyword(Keyword::In) => Some(BinaryOp::In),
        _ => None,
    }
}

fn comparison_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::EqEq => Some(BinaryOp::Eq),
        TokenKind::NotEq => Some(BinaryOp::NotEq),
        TokenKind::Lt => Some(BinaryOp::Lt),
        TokenKind::Gt => Some(BinaryOp::Gt),
        TokenKind::LtEq => Some(BinaryOp::LtEq),
        TokenKind::GtEq => Some(BinaryOp::GtEq),
        _ => None,
    }
}

fn additive_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Subtract),
        _ => None,
    }
}

fn multiplicative_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Star => Some(BinaryOp::Multiply),
        TokenKind::Slash => Some(BinaryOp::Divide),
        _ => None,
    }
}

fn power_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Caret => Some(BinaryOp::Power),
        TokenKind::Percent => Some(BinaryOp::Modulo),
        _ => None,
    }
}

fn unary_op(kind: &TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Minus => Some(UnaryOp::Negate),
        TokenKind::Plus => Some(UnaryOp::Plus),
        TokenKind::Bang => Some(UnaryOp::Not),
        _ => None,
    }
}

impl<'a> Parser<'a> {
    /// Any expression, including declarations.
    pub(crate) fn expr(&mut self) -> ParseResult<Node> {
        ensure_sufficient_stack(|| {
            if self.at_declaration() {
                self.in_error_context(ErrorContext::Declaration, Parser::declaration)
            } else {
                self.logical()
            }
        })
    }

    /// Parse `left (op right)*`, folding to the left.
    fn binary_level(
        &mut self,
        left: Production<'a>,
        right: Production<'a>,
        matcher: fn(&TokenKind) -> Option<BinaryOp>,
    ) -> ParseResult<Node> {
        let mut lhs = left(self)?;
        while let Some(op) = matcher(self.current_kind()) {
            let position = self.position();
            self.cursor.advance();
            let rhs = right(self)?;
            lhs = Node::new(
                NodeKind::Binary {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
                position,
            );
        }
        Ok(lhs)
    }

    fn logical(&mut self) -> ParseResult<Node> {
        self.binary_level(Parser::comparison, Parser::comparison, logical_op)
    }

    fn comparison(&mut self) -> ParseResult<Node> {
        if self.cursor.check(&TokenKind::Bang) {
            let position = self.position();
            self.cursor.advance();
            let operand = ensure_sufficient_stack(|| self.comparison())?;
            return Ok(Node::new(
                NodeKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                position,
            ));
        }
        self.binary_level(Parser::additive, Parser::additive, comparison_op)
    }

    fn additive(&mut self) -> ParseResult<Node> {
        self.binary_level(Parser::term, Parser::term, additive_op)
    }

    fn term(&mut self) -> ParseResult<Node> {
        self.binary_level(Parser::unary, Parser::unary, multiplicative_op)
    }

    fn unary(&mut self) -> ParseResult<Node> {
        let Some(op) = unary_op(self.current_kind()) else {
            return self.power();
        };
        let position = self.position();
        self.cursor.advance();
        let operand = ensure_sufficient_stack(|| self.unary())?;
        Ok(Node::new(
            NodeKind::Unary {
                op,
                operand: Box::new(operand),
            },
            position,
        ))
    }

    fn power(&mut self) -> ParseResult<Node> {
        self.binary_level(Parser::postfix, Parser::unary, power_op)
    }

    /// Primary followed by calls, indexing and member access.
    pub(crate) fn postfix(&mut self) -> ParseResult<Node> {
        let mut expr = self.primary()?;
        loop {
            let position = self.position();
            let optional = match self.current_kind() {
                TokenKind::QuestionDot => {
                    self.cursor.advance();
                    true
                }
                TokenKind::LParen | TokenKind::LBracket | TokenKind::Dot => false,
                _ => break,
            };

            expr = match self.current_kind() {
                TokenKind::LParen => {
                    let args = self.in_error_context(ErrorContext::CallArguments, |p| {
                        p.cursor.advance();
                        p.comma_list(&TokenKind::RParen)
                    })?;
                    Node::new(
                        NodeKind::Call {
                            callee: Box::new(expr),
                            args,
                            optional,
                        },
                        position,
                    )
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let index = self.expr()?;
                    self.expect(&TokenKind::RBracket)?;
                    Node::new(
                        NodeKind::Index {
                            base: Box::new(expr),
                            index: Box::new(index),
                            optional,
                        },
                        position,
                    )
                }
                _ => {
                    if !optional {
                        self.cursor.advance();
                    }
                    let name = self.member_name()?;
                    Node::new(
                        NodeKind::Member {
                            base: Box::new(expr),
                            name,
                            optional,
                        },
                        position,
                    )
                }
            };
        }
        Ok(expr)
    }

    /// Identifier after `.`; keywords are allowed as member names.
    fn member_name(&mut self) -> ParseResult<Name> {
        match self.current_kind() {
            TokenKind::Keyword(kw) => {
                let name = self.interner.intern(kw.as_str());
                self.cursor.advance();
                Ok(name)
            }
            _ => self.expect_ident(),
        }
    }

    /// Comma separated expressions up to and including `close`; a trailing comma is allowed.
    pub(crate) fn comma_list(&mut self, close: &TokenKind) -> ParseResult<Vec<Node>> {
        let mut items = Vec::new();
        while !self.cursor.check(close) {
            items.push(self.expr()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(close)?;
        Ok(items)
    }

    /// Type annotation after `:`.
    pub(crate) fn type_annotation(&mut self) -> ParseResult<Node> {
        self.postfix()
    }
}
