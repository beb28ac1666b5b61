//! Diagnostics shared by every phase of the runtime.
//!
//! A script failure, whether raised by the lexer, the parser or the evaluator, is an
//! [`EsError`]: a [`ErrorKind`], a human readable detail string, the source
//! [`Position`](es_ir::Position) that observed it, and the call frames it unwound through.

mod error;
mod kind;

pub use error::{EsError, TracebackFrame};
pub use kind::{ErrorCode, ErrorKind};

#[cfg(test)]
mod tests;
