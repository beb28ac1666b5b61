//! Syntax tree.
//!
//! Nodes own their children. Function, class and namespace definitions sit behind
//! `Rc` because the values they evaluate to keep referring to them after the
//! enclosing statement has finished.

use std::rc::Rc;

use crate::{AssignOp, BinaryOp, Name, Position, UnaryOp};

/// A parsed source file.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub position: Position,
}

impl Node {
    pub fn new(kind: NodeKind, position: Position) -> Self {
        Node { kind, position }
    }

    /// Nodes that evaluate without visiting children.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Number(_)
                | NodeKind::String(_)
                | NodeKind::Variable(_)
                | NodeKind::Undefined
                | NodeKind::Break
                | NodeKind::Continue
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Number(f64),
    String(Rc<str>),
    Variable(Name),
    Undefined,
    Break,
    Continue,

    Array(Vec<Node>),
    Object(Vec<ObjectEntry>),

    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    Declare(Box<Declaration>),
    /// `var [a, b: Type] = value`
    Destructure(Box<Destructure>),
    Assign {
        target: Box<AssignTarget>,
        op: AssignOp,
        value: Box<Node>,
    },

    If {
        condition: Box<Node>,
        then_branch: Box<Node>,
        else_branch: Option<Box<Node>>,
    },
    While {
        condition: Box<Node>,
        body: Box<Node>,
    },
    For(Box<ForLoop>),
    /// Brace-delimited statement list. Does not open a scope on its own.
    Block(Vec<Node>),
    Try {
        body: Box<Node>,
        handler: Box<Node>,
    },

    Call {
        callee: Box<Node>,
        args: Vec<Node>,
        optional: bool,
    },
    Index {
        base: Box<Node>,
        index: Box<Node>,
        optional: bool,
    },
    Member {
        base: Box<Node>,
        name: Name,
        optional: bool,
    },

    Function(Rc<FunctionDef>),
    Class(Rc<ClassDef>),
    Namespace(Rc<NamespaceDef>),

    /// `return` without a value carries an [`NodeKind::Undefined`] node.
    Return(Box<Node>),
    /// Returns from the enclosing function only if the value is truthy.
    Yield(Box<Node>),
}

/// Modifier keywords collected before a declared name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub constant: bool,
    pub global: bool,
    /// Hidden from code outside the enclosing namespace.
    pub local: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub name: Name,
    pub modifiers: Modifiers,
    pub ty: Option<Node>,
    pub value: Option<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DestructureTarget {
    pub name: Name,
    pub ty: Option<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Destructure {
    pub targets: Vec<DestructureTarget>,
    pub modifiers: Modifiers,
    pub value: Node,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AssignTarget {
    Variable(Name),
    Member { base: Node, name: Name },
    Index { base: Node, index: Node },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForLoop {
    pub binding: Name,
    pub modifiers: Modifiers,
    pub iterable: Node,
    pub body: Node,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ObjectKey {
    Static(Rc<str>),
    Computed(Node),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectEntry {
    pub key: ObjectKey,
    pub value: Node,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Name,
    pub ty: Option<Node>,
    pub default: Option<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: Option<Name>,
    pub params: Vec<Param>,
    pub return_type: Option<Node>,
    /// A [`NodeKind::Block`] or a single expression.
    pub body: Node,
    /// `func name(...)` in statement position binds `name` as a constant.
    pub declares: bool,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDef {
    pub name: Option<Name>,
    pub extends: Option<Node>,
    pub init: Option<Rc<FunctionDef>>,
    pub methods: Vec<Rc<FunctionDef>>,
    /// Declared instance properties, checked once `init` returns.
    pub properties: Vec<ClassField>,
    pub static_methods: Vec<Rc<FunctionDef>>,
    pub static_fields: Vec<ClassField>,
    pub is_abstract: bool,
    pub declares: bool,
    pub position: Position,
}

/// `name: Type` in a class body. Only static fields carry a value.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassField {
    pub name: Name,
    pub ty: Option<Node>,
    pub value: Option<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NamespaceDef {
    pub name: Option<Name>,
    pub body: Vec<Node>,
    pub mutable: bool,
    pub declares: bool,
}

#[cfg(test)]
mod tests;
