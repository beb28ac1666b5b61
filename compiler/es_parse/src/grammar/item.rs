//! Declarations, functions, classes and namespaces.

use std::rc::Rc;

use es_ir::{
    AssignOp, ClassDef, ClassField, Declaration, Destructure, DestructureTarget, FunctionDef,
    Keyword, Modifiers, Name, NamespaceDef, Node, NodeKind, Param, Position, TokenKind,
};

use crate::{ErrorContext, ParseContext, ParseError, ParseResult, Parser};

/// Class body members as they are read.
#[derive(Default)]
struct ClassMembers {
    init: Option<Rc<FunctionDef>>,
    methods: Vec<Rc<FunctionDef>>,
    properties: Vec<ClassField>,
    static_methods: Vec<Rc<FunctionDef>>,
    static_fields: Vec<ClassField>,
}

/// Which modifier groups have been seen while reading a declaration.
#[derive(Default)]
struct ModifierState {
    binding: bool,
    scope: bool,
    constancy: bool,
}

impl Parser<'_> {
    pub(crate) fn at_declaration(&self) -> bool {
        match self.current_kind() {
            TokenKind::Keyword(Keyword::Mutable) => {
                !self.cursor.peek_kind_at(1).is_keyword(Keyword::Namespace)
            }
            TokenKind::Keyword(kw) => kw.is_modifier(),
            _ => false,
        }
    }

    /// Modifier keywords before a declared name, in any order, each group at most once.
    pub(crate) fn modifiers(&mut self) -> ParseResult<Modifiers> {
        let mut modifiers = Modifiers::default();
        let mut seen = ModifierState::default();

        while let TokenKind::Keyword(kw) = self.current_kind() {
            if !kw.is_modifier() {
                break;
            }
            let group = match kw {
                Keyword::Var | Keyword::Let => &mut seen.binding,
                Keyword::Global | Keyword::Local => &mut seen.scope,
                _ => &mut seen.constancy,
            };
            if *group {
                return Err(ParseError::new(
                    format!("Unexpected modifier '{}'", kw.as_str()),
                    self.position(),
                ));
            }
            *group = true;

            match kw {
                Keyword::Global => modifiers.global = true,
                Keyword::Local => modifiers.local = true,
                Keyword::Const => modifiers.constant = true,
                _ => {}
            }
            self.cursor.advance();
        }
        Ok(modifiers)
    }

    /// `var name: Type = value` or `var [a, b: Type] = value`
    pub(crate) fn declaration(&mut self) -> ParseResult<Node> {
        let position = self.position();
        let modifiers = self.modifiers()?;
        if self.cursor.check(&TokenKind::LBracket) {
            return self.destructure(modifiers, position);
        }
        let name = self.expect_ident()?;

        let ty = if self.cursor.eat(&TokenKind::Colon) {
            Some(self.type_annotation()?)
        } else {
            None
        };

        let value = if self.cursor.check(&TokenKind::Assign(AssignOp::Set)) {
            self.cursor.advance();
            let mut value = self.expr()?;
            name_anonymous(&mut value, name);
            Some(value)
        } else {
            None
        };

        if modifiers.constant && value.is_none() {
            return Err(ParseError::new(
                format!("Constant '{}' must be initialised", self.interner.lookup(name)),
                position,
            ));
        }

        Ok(Node::new(
            NodeKind::Declare(Box::new(Declaration {
                name,
                modifiers,
                ty,
                value,
            })),
            position,
        ))
    }

    /// `[a, b: Type] = value` after the modifiers. The value is required.
    fn destructure(&mut self, modifiers: Modifiers, position: Position) -> ParseResult<Node> {
        self.cursor.advance();
        let mut targets = Vec::new();
        while !self.cursor.check(&TokenKind::RBracket) {
            let name = self.expect_ident()?;
            let ty = if self.cursor.eat(&TokenKind::Colon) {
                Some(self.type_annotation()?)
            } else {
                None
            };
            targets.push(DestructureTarget { name, ty });
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBracket)?;
        self.expect(&TokenKind::Assign(AssignOp::Set))?;
        let value = self.expr()?;

        Ok(Node::new(
            NodeKind::Destructure(Box::new(Destructure {
                targets,
                modifiers,
                value,
            })),
            position,
        ))
    }

    /// `func name`, `class name`, `abstract class name`, `namespace name` or
    /// `mutable namespace name` in statement position.
    pub(crate) fn at_named_item(&self) -> bool {
        let offset = match self.current_kind() {
            TokenKind::Keyword(Keyword::Func | Keyword::Class | Keyword::Namespace) => 1,
            TokenKind::Keyword(Keyword::Mutable)
                if self.cursor.peek_kind_at(1).is_keyword(Keyword::Namespace) =>
            {
                2
            }
            _ if self.at_abstract_class() => 2,
            _ => return false,
        };
        matches!(self.cursor.peek_kind_at(offset), TokenKind::Identifier(_))
    }

    /// `abstract` is only a keyword directly before `class`.
    pub(crate) fn at_abstract_class(&self) -> bool {
        self.at_contextual("abstract") && self.cursor.peek_kind_at(1).is_keyword(Keyword::Class)
    }

    fn at_contextual(&self, word: &str) -> bool {
        match self.current_kind() {
            TokenKind::Identifier(name) => self.interner.lookup(*name) == word,
            _ => false,
        }
    }

    pub(crate) fn named_item(&mut self) -> ParseResult<Node> {
        match self.current_kind() {
            TokenKind::Keyword(Keyword::Func) => self.function(true),
            TokenKind::Keyword(Keyword::Class) => self.class(true),
            TokenKind::Identifier(_) => self.class(true),
            _ => self.namespace(true),
        }
    }

    fn optional_name(&mut self) -> Option<Name> {
        match self.current_kind() {
            TokenKind::Identifier(name) => {
                let name = *name;
                self.cursor.advance();
                Some(name)
            }
            _ => None,
        }
    }

    /// `func [name] (params) [: Type] body`
    pub(crate) fn function(&mut self, declares: bool) -> ParseResult<Node> {
        let position = self.position();
        self.in_error_context(ErrorContext::FunctionDef, |p| {
            p.cursor.advance();
            let name = p.optional_name();
            let def = p.function_rest(name, declares, position.clone())?;
            Ok(Node::new(NodeKind::Function(Rc::new(def)), position))
        })
    }

    /// Everything after the function or method name.
    fn function_rest(
        &mut self,
        name: Option<Name>,
        declares: bool,
        position: Position,
    ) -> ParseResult<FunctionDef> {
        let params = self.in_error_context(ErrorContext::Parameters, Parser::params)?;
        let return_type = if self.cursor.eat(&TokenKind::Colon) {
            Some(self.type_annotation()?)
        } else {
            None
        };

        let context = self
            .context
            .without(ParseContext::IN_LOOP)
            .with(ParseContext::IN_FUNCTION);
        let body = self.with_context(context, |p| {
            if p.cursor.check(&TokenKind::LBrace) {
                p.block()
            } else {
                p.expr()
            }
        })?;

        Ok(FunctionDef {
            name,
            params,
            return_type,
            body,
            declares,
            position,
        })
    }

    /// `(a, b: Number, c = 1)`
    fn params(&mut self) -> ParseResult<Vec<Param>> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            let name = self.expect_ident()?;
            let ty = if self.cursor.eat(&TokenKind::Colon) {
                Some(self.type_annotation()?)
            } else {
                None
            };
            let default = if self.cursor.eat(&TokenKind::Assign(AssignOp::Set)) {
                Some(self.expr()?)
            } else {
                None
            };
            params.push(Param { name, ty, default });
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(params)
    }

    /// `[abstract] class [Name] [extends Parent] { members }`
    ///
    /// Members are methods, `init`, property declarations `name[: Type]`
    /// and their `static` forms. Static fields may also take `= value`.
    pub(crate) fn class(&mut self, declares: bool) -> ParseResult<Node> {
        let position = self.position();
        self.in_error_context(ErrorContext::ClassDef, |p| {
            let is_abstract = p.at_abstract_class();
            if is_abstract {
                p.cursor.advance();
            }
            p.cursor.advance();
            let name = p.optional_name();
            let extends = if p.cursor.check_keyword(Keyword::Extends) {
                p.cursor.advance();
                Some(p.postfix()?)
            } else {
                None
            };

            p.expect(&TokenKind::LBrace)?;
            let init_name = p.interner.intern("init");
            let mut members = ClassMembers::default();
            loop {
                while p.cursor.eat(&TokenKind::EndStatement) {}
                if p.cursor.eat(&TokenKind::RBrace) {
                    break;
                }
                let is_static = p.at_contextual("static")
                    && matches!(p.cursor.peek_kind_at(1), TokenKind::Identifier(_));
                if is_static {
                    p.cursor.advance();
                }
                let member_position = p.position();
                let member_name = p.expect_ident()?;

                if !p.cursor.check(&TokenKind::LParen) {
                    let field = p.class_field(member_name, is_static)?;
                    if is_static {
                        members.static_fields.push(field);
                    } else {
                        members.properties.push(field);
                    }
                    continue;
                }

                let def = Rc::new(p.function_rest(
                    Some(member_name),
                    false,
                    member_position.clone(),
                )?);
                if is_static {
                    members.static_methods.push(def);
                } else if member_name == init_name {
                    if members.init.is_some() {
                        return Err(ParseError::new(
                            "Class already has an 'init' method",
                            member_position,
                        ));
                    }
                    members.init = Some(def);
                } else {
                    members.methods.push(def);
                }
            }

            Ok(Node::new(
                NodeKind::Class(Rc::new(ClassDef {
                    name,
                    extends,
                    init: members.init,
                    methods: members.methods,
                    properties: members.properties,
                    static_methods: members.static_methods,
                    static_fields: members.static_fields,
                    is_abstract,
                    declares,
                    position: position.clone(),
                })),
                position,
            ))
        })
    }

    /// The rest of `name[: Type]`, or `name[: Type] [= value]` when static,
    /// up to the end of the statement.
    fn class_field(&mut self, name: Name, is_static: bool) -> ParseResult<ClassField> {
        let ty = if self.cursor.eat(&TokenKind::Colon) {
            Some(self.type_annotation()?)
        } else {
            None
        };
        let value = if is_static && self.cursor.eat(&TokenKind::Assign(AssignOp::Set)) {
            Some(self.expr()?)
        } else {
            None
        };
        if !self.cursor.check(&TokenKind::RBrace) {
            self.expect(&TokenKind::EndStatement)?;
        }
        Ok(ClassField { name, ty, value })
    }

    /// `[mutable] namespace [Name] { statements }`
    pub(crate) fn namespace(&mut self, declares: bool) -> ParseResult<Node> {
        let position = self.position();
        self.in_error_context(ErrorContext::NamespaceDef, |p| {
            let mutable = p.cursor.check_keyword(Keyword::Mutable);
            if mutable {
                p.cursor.advance();
            }
            if !p.cursor.check_keyword(Keyword::Namespace) {
                return Err(p.unexpected("'namespace'"));
            }
            p.cursor.advance();
            let name = p.optional_name();

            p.expect(&TokenKind::LBrace)?;
            let body = p.with_context(ParseContext::NONE, Parser::statements)?;
            p.expect(&TokenKind::RBrace)?;

            Ok(Node::new(
                NodeKind::Namespace(Rc::new(NamespaceDef {
                    name,
                    body,
                    mutable,
                    declares,
                })),
                position,
            ))
        })
    }
}

/// `var f = func () {}` names the function `f`.
fn name_anonymous(value: &mut Node, name: Name) {
    match &mut value.kind {
        NodeKind::Function(def) => {
            if let Some(def) = Rc::get_mut(def) {
                def.name.get_or_insert(name);
            }
        }
        NodeKind::Class(def) => {
            if let Some(def) = Rc::get_mut(def) {
                def.name.get_or_insert(name);
            }
        }
        NodeKind::Namespace(def) => {
            if let Some(def) = Rc::get_mut(def) {
                def.name.get_or_insert(name);
            }
        }
        _ => {}
    }
}
