//! Grammar productions.
//!
//! - `stmt`: statement lists, control flow, assignment
//! - `expr`: the binary operator ladder, unary operators and postfix chains
//! - `primary`: literals, grouping, array and object literals
//! - `item`: declarations, functions, classes and namespaces

mod expr;
mod item;
mod primary;
mod stmt;
