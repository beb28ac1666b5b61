//! Globals installed into every runtime's root scope, and the methods
//! available on arrays, strings and objects.
//!
//! Both tables are plain arrays of `(name, description, fn)` so the set of
//! builtins can be listed, documented and tested without running a script.

mod functions;
mod methods;

use std::rc::Rc;

use es_diagnostic::EsError;
use rustc_hash::FxHashMap;

use crate::context::{ContextError, Symbol};
use crate::runtime::Runtime;
use crate::value::{Function, NativeCall, NativeFn, Primitive, Value};

/// Global functions: `(name, description, implementation)`.
pub const GLOBAL_FUNCTIONS: &[(&str, &str, NativeFn)] = &[
    ("print", "Writes the display forms of all arguments, concatenated, as one line", functions::print),
    ("input", "Prompts with a message and reads a line, passing it to the callback if one is given", functions::input),
    ("range", "range(n) counts 0..n; range(min, max, step?) counts from min while below max", functions::range),
    ("len", "Length of a string or array, or the number of keys of an object", functions::len),
    ("typeof", "Type of the symbol with the given name", functions::type_of),
    ("parse_num", "Parses the leading number of a value's display form", functions::parse_num),
    ("throw", "Raises an error, either an Error value or one built from a name and details", functions::throw),
    ("assert", "Fails with TestFailed unless the condition is truthy", functions::assert),
    ("assert_eq", "Fails with TestFailed unless both values are equal", functions::assert_eq),
    ("import", "Loads a registered module or a script file as a namespace", functions::import),
    ("using", "Copies a namespace's members into the current scope, or the global one", functions::using),
    ("delete", "Removes a symbol from the current scope", functions::delete),
    ("__symbols__", "Names bound in the current scope, or every enclosing one when recursive", functions::symbols),
    ("help", "Describes a value", functions::help),
    ("sleep", "Blocks for a number of milliseconds, then calls the callback if one is given", functions::sleep),
];

/// Methods reachable through member access on builtin values.
pub const PRIMITIVE_METHODS: &[(Primitive, &str, &str, NativeFn)] = &[
    (Primitive::Array, "push", "Appends the arguments and returns the new length", methods::array_push),
    (Primitive::Array, "pop", "Removes and returns the last element", methods::array_pop),
    (Primitive::Array, "contains", "Whether an element equals the argument", methods::array_contains),
    (Primitive::Array, "join", "Display forms of the elements joined by a separator", methods::array_join),
    (Primitive::Array, "map", "New array of callback(element, index)", methods::array_map),
    (Primitive::Array, "filter", "Elements for which callback(element, index) is truthy", methods::array_filter),
    (Primitive::String, "split", "Splits on a separator, or into characters", methods::string_split),
    (Primitive::String, "upper", "Upper-case copy", methods::string_upper),
    (Primitive::String, "lower", "Lower-case copy", methods::string_lower),
    (Primitive::String, "contains", "Whether the argument occurs as a substring", methods::string_contains),
    (Primitive::Object, "keys", "Array of the object's keys", methods::object_keys),
];

/// Build the method table a runtime dispatches builtin member calls through.
pub(crate) fn methods() -> FxHashMap<(Primitive, &'static str), Rc<Function>> {
    PRIMITIVE_METHODS
        .iter()
        .map(|&(primitive, name, description, f)| {
            ((primitive, name), Rc::new(Function::native(name, description, f)))
        })
        .collect()
}

/// Bind the builtin constants, types and functions in the runtime's root.
pub(crate) fn install(rt: &Runtime) -> Result<(), ContextError> {
    let root = rt.root().id();
    let store = rt.contexts();
    let interner = rt.interner();
    let bind = |name: &str, value: Value| store.declare(root, interner.intern(name), Symbol::constant(value));

    bind("true", Value::Boolean(true))?;
    bind("false", Value::Boolean(false))?;
    bind("nil", Value::Undefined)?;
    bind("undefined", Value::Undefined)?;
    bind("inf", Value::Number(f64::INFINITY))?;

    for &primitive in &Primitive::ALL {
        let ty = Value::Type(Rc::clone(rt.types().get(primitive)));
        bind(primitive.name(), ty.clone())?;
        for alias in primitive.aliases() {
            bind(*alias, ty.clone())?;
        }
    }

    for &(name, description, f) in GLOBAL_FUNCTIONS {
        bind(name, Value::function(Function::native(name, description, f)))?;
    }
    tracing::debug!(
        functions = GLOBAL_FUNCTIONS.len(),
        methods = PRIMITIVE_METHODS.len(),
        "installed builtins"
    );
    Ok(())
}

// Argument helpers shared by functions and methods.

#[cold]
fn wrong_type(expected: Primitive, got: &Value) -> EsError {
    EsError::expected_type(expected.name(), &got.type_name(), &got.repr())
}

fn require_string(call: &NativeCall, index: usize) -> Result<Rc<str>, EsError> {
    match call.arg(index) {
        Value::String(s) => Ok(s),
        other => Err(wrong_type(Primitive::String, &other)),
    }
}

fn require_number(call: &NativeCall, index: usize) -> Result<f64, EsError> {
    match call.arg(index) {
        Value::Number(n) => Ok(n),
        other => Err(wrong_type(Primitive::Number, &other)),
    }
}

/// The argument if it can be called, `None` when it is undefined.
fn optional_callable(call: &NativeCall, index: usize) -> Result<Option<Value>, EsError> {
    match call.arg(index) {
        Value::Undefined => Ok(None),
        callable @ (Value::Function(_) | Value::Type(_)) => Ok(Some(callable)),
        other => Err(wrong_type(Primitive::Function, &other)),
    }
}

fn require_callable(call: &NativeCall, index: usize) -> Result<Value, EsError> {
    match call.arg(index) {
        callable @ (Value::Function(_) | Value::Type(_)) => Ok(callable),
        other => Err(wrong_type(Primitive::Function, &other)),
    }
}
