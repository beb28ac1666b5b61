//! Literals, variables, grouping, array and object literals.

use std::rc::Rc;

use es_ir::{Keyword, Node, NodeKind, ObjectEntry, ObjectKey, TokenKind};

use crate::{ErrorContext, ParseResult, Parser};

impl Parser<'_> {
    pub(crate) fn primary(&mut self) -> ParseResult<Node> {
        let position = self.position();
        let kind = match self.current_kind() {
            TokenKind::Number(value) => {
                self.cursor.advance();
                NodeKind::Number(*value)
            }
            TokenKind::String(text) => {
                self.cursor.advance();
                NodeKind::String(Rc::clone(text))
            }
            TokenKind::Identifier(_) if self.at_abstract_class() => return self.class(false),
            TokenKind::Identifier(name) => {
                self.cursor.advance();
                NodeKind::Variable(*name)
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.expr()?;
                self.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            TokenKind::LBracket => {
                let items = self.in_error_context(ErrorContext::ArrayLiteral, |p| {
                    p.cursor.advance();
                    p.comma_list(&TokenKind::RBracket)
                })?;
                NodeKind::Array(items)
            }
            TokenKind::LBrace => {
                self.in_error_context(ErrorContext::ObjectLiteral, Parser::object_literal)?
            }
            TokenKind::Keyword(Keyword::Func) => return self.function(false),
            TokenKind::Keyword(Keyword::Class) => return self.class(false),
            TokenKind::Keyword(Keyword::Namespace | Keyword::Mutable) => {
                return self.namespace(false);
            }
            _ => return Err(self.unexpected("an expression").in_context(ErrorContext::Expression)),
        };
        Ok(Node::new(kind, position))
    }

    /// `{ a, b: 1, 'c d': 2, [key]: 3 }`
    fn object_literal(&mut self) -> ParseResult<NodeKind> {
        self.cursor.advance();
        let mut entries = Vec::new();

        while !self.cursor.check(&TokenKind::RBrace) {
            let position = self.position();
            let entry = match self.current_kind() {
                TokenKind::Identifier(name) => {
                    let name = *name;
                    self.cursor.advance();
                    let key = ObjectKey::Static(Rc::from(self.interner.lookup(name)));
                    let value = if self.cursor.eat(&TokenKind::Colon) {
                        self.expr()?
                    } else {
                        Node::new(NodeKind::Variable(name), position)
                    };
                    ObjectEntry { key, value }
                }
                TokenKind::Keyword(kw) => {
                    self.cursor.advance();
                    self.expect(&TokenKind::Colon)?;
                    ObjectEntry {
                        key: ObjectKey::Static(Rc::from(kw.as_str())),
                        value: self.expr()?,
                    }
                }
                TokenKind::String(text) => {
                    self.cursor.advance();
                    self.expect(&TokenKind::Colon)?;
                    ObjectEntry {
                        key: ObjectKey::Static(Rc::clone(text)),
                        value: self.expr()?,
                    }
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let key = self.expr()?;
                    self.expect(&TokenKind::RBracket)?;
                    self.expect(&TokenKind::Colon)?;
                    ObjectEntry {
                        key: ObjectKey::Computed(key),
                        value: self.expr()?,
                    }
                }
                _ => return Err(self.unexpected("an object key")),
            };
            entries.push(entry);

            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(&TokenKind::RBrace)?;
        Ok(NodeKind::Object(entries))
    }
}
