//! EntropyScript IR: the data shared between the lexer, parser and evaluator.
//!
//! - [`Position`] for source locations, with an "unknown" sentinel
//! - [`Name`] and [`StringInterner`] for identifiers
//! - [`Token`] and [`TokenKind`] for lexer output
//! - [`ast`] for the syntax tree the parser builds and the evaluator walks

pub mod ast;
mod interner;
mod name;
mod ops;
mod position;
mod token;

pub use ast::{
    AssignTarget, ClassDef, ClassField, Declaration, Destructure, DestructureTarget, ForLoop,
    FunctionDef, Modifiers, NamespaceDef, Node, NodeKind, ObjectEntry, ObjectKey, Param, Program,
};
pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use ops::{AssignOp, BinaryOp, UnaryOp};
pub use position::Position;
pub use token::{Keyword, Token, TokenKind};
