//! Tree-walking interpreter for EntropyScript.
//!
//! # Architecture
//!
//! - [`Runtime`]: owns the root scope, the builtins, the module registry and
//!   the I/O handlers; [`Runtime::run`] lexes, parses and evaluates a source
//!   string and reports per-phase timing
//! - [`ContextStore`]: generational arena of lexical scopes, shared by every
//!   closure and namespace that keeps one alive
//! - [`Value`]: the closed set of runtime values, with operator support
//!   expressed through the capability traits in [`ops`]
//! - [`Interpreter`]: evaluates AST nodes against a scope, enforcing the
//!   runtime's [`Limits`]
//!
//! Scripts can print, read input, sleep and import files; everything else is
//! pure evaluation. Each runtime is single-threaded.

mod builtins;
pub mod context;
pub mod interpreter;
pub mod io;
mod map;
mod modules;
pub mod runtime;
mod shared;
pub mod value;

pub use builtins::{GLOBAL_FUNCTIONS, PRIMITIVE_METHODS};
pub use context::{ContextError, ContextId, ContextRef, ContextStore, Symbol};
pub use interpreter::{ControlAction, EvalResult, Interpreter};
pub use io::{InputHandler, PrintHandler, SharedInputHandler, SharedPrintHandler};
pub use map::OrderedMap;
pub use modules::{ModuleBuilder, SCRIPT_EXTENSION};
pub use runtime::{Limits, RunOptions, RunOutcome, Runtime, RuntimeBuilder, TimingData};
pub use shared::{Heap, WeakHeap};
pub use value::{ops, BuiltinTypes, Fields, Function, Info, NativeCall, NativeFn, Object, Primitive, Type, Value};

pub use es_diagnostic::{ErrorKind, EsError};
