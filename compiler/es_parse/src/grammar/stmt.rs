//! Statements and statement lists.

use es_ir::{AssignTarget, ForLoop, Keyword, Node, NodeKind, Position, Program, TokenKind};

use crate::{ErrorContext, ParseContext, ParseError, ParseResult, Parser};

impl Parser<'_> {
    pub(crate) fn program(&mut self) -> ParseResult<Program> {
        let statements = self.statements()?;
        if !self.cursor.is_at_end() {
            return Err(self.unexpected("';' or end of file"));
        }
        Ok(Program { statements })
    }

    /// Skip `;` separators, reporting whether there was at least one.
    fn separators(&mut self) -> bool {
        let mut any = false;
        while self.cursor.eat(&TokenKind::EndStatement) {
            any = true;
        }
        any
    }

    /// Statements up to `}` or end of input.
    ///
    /// Each statement is parsed speculatively: one that fails before consuming a
    /// token is rolled back and ends the list, leaving the enclosing production to
    /// report what it expected there.
    pub(crate) fn statements(&mut self) -> ParseResult<Vec<Node>> {
        let mut statements = Vec::new();
        self.separators();

        loop {
            if matches!(self.current_kind(), TokenKind::RBrace | TokenKind::Eof) {
                break;
            }

            let snapshot = self.snapshot();
            let statement = match self.statement() {
                Ok(statement) => statement,
                Err(_) if self.cursor.position() == snapshot.cursor_pos => {
                    self.restore(snapshot);
                    break;
                }
                Err(err) => return Err(err),
            };

            let terminated = ends_at_brace(&statement);
            statements.push(statement);
            if !self.separators() && !terminated {
                break;
            }
        }

        Ok(statements)
    }

    pub(crate) fn block(&mut self) -> ParseResult<Node> {
        let position = self.position();
        self.in_error_context(ErrorContext::Block, |p| {
            p.expect(&TokenKind::LBrace)?;
            let statements = p.statements()?;
            p.expect(&TokenKind::RBrace)?;
            Ok(Node::new(NodeKind::Block(statements), position))
        })
    }

    /// Body of `if`/`while`/`for`: a block or a single statement.
    fn body(&mut self) -> ParseResult<Node> {
        if self.cursor.check(&TokenKind::LBrace) {
            self.block()
        } else {
            self.statement()
        }
    }

    fn loop_body(&mut self) -> ParseResult<Node> {
        let context = self.context.with(ParseContext::IN_LOOP);
        self.with_context(context, Parser::body)
    }

    pub(crate) fn statement(&mut self) -> ParseResult<Node> {
        let position = self.position();
        match self.current_kind() {
            TokenKind::Keyword(Keyword::Return) => self.return_like(position, false),
            TokenKind::Keyword(Keyword::Yield) => self.return_like(position, true),
            TokenKind::Keyword(Keyword::Break) => {
                self.cursor.advance();
                if !self.context.in_loop() {
                    return Err(ParseError::new("'break' outside of a loop", position));
                }
                Ok(Node::new(NodeKind::Break, position))
            }
            TokenKind::Keyword(Keyword::Continue) => {
                self.cursor.advance();
                if !self.context.in_loop() {
                    return Err(ParseError::new("'continue' outside of a loop", position));
                }
                Ok(Node::new(NodeKind::Continue, position))
            }
            TokenKind::Keyword(Keyword::If) => {
                self.in_error_context(ErrorContext::IfStatement, Parser::if_statement)
            }
            TokenKind::Keyword(Keyword::While) => {
                self.in_error_context(ErrorContext::WhileLoop, Parser::while_loop)
            }
            TokenKind::Keyword(Keyword::For) => {
                self.in_error_context(ErrorContext::ForLoop, Parser::for_loop)
            }
            TokenKind::Keyword(Keyword::Try) => {
                self.in_error_context(ErrorContext::TryCatch, Parser::try_catch)
            }
            _ if self.at_named_item() => self.named_item(),
            _ => self.expression_statement(),
        }
    }

    fn return_like(&mut self, position: Position, is_yield: bool) -> ParseResult<Node> {
        let keyword = if is_yield { "yield" } else { "return" };
        self.cursor.advance();
        if !self.context.in_function() {
            return Err(ParseError::new(
                format!("'{keyword}' outside of a function"),
                position,
            ));
        }

        let value = if self.at_expression_end() {
            Node::new(NodeKind::Undefined, self.position())
        } else {
            self.expr()?
        };
        let kind = if is_yield {
            NodeKind::Yield(Box::new(value))
        } else {
            NodeKind::Return(Box::new(value))
        };
        Ok(Node::new(kind, position))
    }

    fn at_expression_end(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::EndStatement | TokenKind::RBrace | TokenKind::Eof
        )
    }

    fn if_statement(&mut self) -> ParseResult<Node> {
        let position = self.position();
        self.cursor.advance();
        let condition = self.expr()?;
        let then_branch = self.body()?;

        // `if (a) x = 1; else x = 2;`
        if self.cursor.check(&TokenKind::EndStatement)
            && self.cursor.peek_kind_at(1).is_keyword(Keyword::Else)
        {
            self.cursor.advance();
        }

        let else_branch = if self.cursor.check_keyword(Keyword::Else) {
            self.cursor.advance();
            Some(Box::new(self.body()?))
        } else {
            None
        };

        Ok(Node::new(
            NodeKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch,
            },
            position,
        ))
    }

    fn while_loop(&mut self) -> ParseResult<Node> {
        let position = self.position();
        self.cursor.advance();
        let condition = self.expr()?;
        let body = self.loop_body()?;
        Ok(Node::new(
            NodeKind::While {
                condition: Box::new(condition),
                body: Box::new(body),
            },
            position,
        ))
    }

    /// `for i in xs body` or `for (var i in xs) body`.
    fn for_loop(&mut self) -> ParseResult<Node> {
        let position = self.position();
        self.cursor.advance();

        let parenthesised = self.cursor.eat(&TokenKind::LParen);
        let modifiers = self.modifiers()?;
        let binding = self.expect_ident()?;
        if !self.cursor.check_keyword(Keyword::In) {
            return Err(self.unexpected("'in'"));
        }
        self.cursor.advance();
        let iterable = self.expr()?;
        if parenthesised {
            self.expect(&TokenKind::RParen)?;
        }

        let body = self.loop_body()?;
        Ok(Node::new(
            NodeKind::For(Box::new(ForLoop {
                binding,
                modifiers,
                iterable,
                body,
            })),
            position,
        ))
    }

    fn try_catch(&mut self) -> ParseResult<Node> {
        let position = self.position();
        self.cursor.advance();
        let body = self.block()?;
        if !self.cursor.check_keyword(Keyword::Catch) {
            return Err(self.unexpected("'catch'"));
        }
        self.cursor.advance();
        let handler = self.block()?;
        Ok(Node::new(
            NodeKind::Try {
                body: Box::new(body),
                handler: Box::new(handler),
            },
            position,
        ))
    }

    /// An expression, optionally followed by an assignment operator and value.
    fn expression_statement(&mut self) -> ParseResult<Node> {
        let expr = self.expr()?;
        let TokenKind::Assign(op) = *self.current_kind() else {
            return Ok(expr);
        };

        let op_position = self.position();
        let position = expr.position.clone();
        let target = match expr.kind {
            NodeKind::Variable(name) => AssignTarget::Variable(name),
            NodeKind::Member {
                base,
                name,
                optional: false,
            } => AssignTarget::Member { base: *base, name },
            NodeKind::Index {
                base,
                index,
                optional: false,
            } => AssignTarget::Index {
                base: *base,
                index: *index,
            },
            _ => {
                return Err(ParseError::new("Cannot assign to this value", op_position));
            }
        };

        self.cursor.advance();
        let value = self.expr()?;
        Ok(Node::new(
            NodeKind::Assign {
                target: Box::new(target),
                op,
                value: Box::new(value),
            },
            position,
        ))
    }
}

/// Statements that close with a brace and need no `;` after them.
fn ends_at_brace(node: &Node) -> bool {
    match &node.kind {
        NodeKind::If { .. } | NodeKind::While { .. } | NodeKind::For(_) | NodeKind::Try { .. } => {
            true
        }
        NodeKind::Function(def) => def.declares,
        NodeKind::Class(def) => def.declares,
        NodeKind::Namespace(def) => def.declares,
        _ => false,
    }
}
