//! Runtime values.
//!
//! [`Value`] is a closed enum. Scalars are stored inline, arrays and objects in
//! shared [`Heap`] cells so that copies alias, and functions, types, namespaces
//! and errors behind `Rc` since they are immutable once created.
//!
//! Operator support is expressed per variant through the capability traits in
//! [`ops`]; identity comparisons use pointer equality.

mod display;
mod function;
mod namespace;
mod object;
pub mod ops;
mod types;

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use es_diagnostic::EsError;
use es_stack::ensure_sufficient_stack;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::shared::Heap;

pub use function::{Function, NativeCall, NativeFn, ParamSpec};
pub(crate) use function::{FunctionKind, UserFunction};
pub use namespace::Namespace;
pub use object::{Fields, Object};
pub use types::{BuiltinTypes, Primitive, Type};
pub(crate) use types::{Property, StaticField};

/// Metadata every value can report: name, description, source file, documentation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Info {
    pub name: Rc<str>,
    pub description: Rc<str>,
    pub file: Option<Arc<str>>,
    pub documentation: Option<Rc<str>>,
}

impl Info {
    pub fn named(name: impl Into<Rc<str>>) -> Self {
        Info {
            name: name.into(),
            ..Info::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<Rc<str>>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: Option<Arc<str>>) -> Self {
        self.file = file;
        self
    }
}

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Number(f64),
    Boolean(bool),
    String(Rc<str>),
    Array(Heap<Vec<Value>>),
    /// Plain objects and class instances.
    Object(Heap<Object>),
    Function(Rc<Function>),
    Type(Rc<Type>),
    Namespace(Rc<Namespace>),
    Error(Rc<EsError>),
}

impl Value {
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Heap::new(items))
    }

    pub fn object(fields: Fields) -> Self {
        Value::Object(Heap::new(Object::plain(fields)))
    }

    pub fn function(function: Function) -> Self {
        Value::Function(Rc::new(function))
    }

    pub fn error(error: EsError) -> Self {
        Value::Error(Rc::new(error))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Truthiness without operator overloads: positive numbers, non-empty
    /// strings and arrays, and every object-like value are true.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Undefined => false,
            Value::Number(n) => *n > 0.0,
            Value::Boolean(b) => *b,
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.borrow().is_empty(),
            Value::Object(_)
            | Value::Function(_)
            | Value::Type(_)
            | Value::Namespace(_)
            | Value::Error(_) => true,
        }
    }

    /// Name of the value's type; the class name for instances.
    pub fn type_name(&self) -> Rc<str> {
        match self {
            Value::Object(obj) => match &obj.borrow().class {
                Some(class) => Rc::clone(&class.info.name),
                None => Rc::from(Primitive::Object.name()),
            },
            other => Rc::from(other.primitive().name()),
        }
    }

    /// The builtin type this value belongs to, ignoring classes.
    pub fn primitive(&self) -> Primitive {
        match self {
            Value::Undefined => Primitive::Undefined,
            Value::Number(_) => Primitive::Number,
            Value::Boolean(_) => Primitive::Boolean,
            Value::String(_) => Primitive::String,
            Value::Array(_) => Primitive::Array,
            Value::Object(_) => Primitive::Object,
            Value::Function(_) => Primitive::Function,
            Value::Type(_) => Primitive::Type,
            Value::Namespace(_) => Primitive::Namespace,
            Value::Error(_) => Primitive::Error,
        }
    }

    /// Class of an instance.
    pub fn class(&self) -> Option<Rc<Type>> {
        match self {
            Value::Object(obj) => obj.borrow().class.clone(),
            _ => None,
        }
    }

    pub fn info(&self) -> Info {
        match self {
            Value::Function(f) => f.info.clone(),
            Value::Type(t) => t.info.clone(),
            Value::Namespace(ns) => ns.info.clone(),
            Value::Error(e) => Info::named(e.name()).with_description(e.details.as_str()),
            other => Info::named(other.type_name()),
        }
    }

    /// Structural equality for data, identity for everything with behaviour.
    /// Values of different variants are never equal. Cyclic structures are
    /// equal when they unfold the same way.
    pub fn equals(&self, other: &Value) -> bool {
        self.equals_with(other, &mut FxHashSet::default())
    }

    fn equals_with(&self, other: &Value, seen: &mut FxHashSet<(usize, usize)>) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                if a.ptr_eq(b) || !seen.insert((a.addr(), b.addr())) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|(x, y)| ensure_sufficient_stack(|| x.equals_with(y, seen)))
            }
            (Value::Object(a), Value::Object(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                if a.borrow().class.is_some() || b.borrow().class.is_some() {
                    return false;
                }
                if !seen.insert((a.addr(), b.addr())) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.fields.len() == b.fields.len()
                    && a.fields.iter().all(|(key, value)| {
                        b.fields.get(key).is_some_and(|other| {
                            ensure_sufficient_stack(|| value.equals_with(other, seen))
                        })
                    })
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b) || a.same_target(b),
            (Value::Type(a), Value::Type(b)) => Rc::ptr_eq(a, b),
            (Value::Namespace(a), Value::Namespace(b)) => Rc::ptr_eq(a, b),
            (Value::Error(a), Value::Error(b)) => Rc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }

    /// Copy arrays and objects all the way down, keeping shared and cyclic
    /// structure intact. Other values are shared as-is.
    #[must_use]
    pub fn deep_copy(&self) -> Value {
        self.deep_copy_with(&mut FxHashMap::default())
    }

    fn deep_copy_with(&self, seen: &mut FxHashMap<usize, Value>) -> Value {
        match self {
            Value::Array(items) => {
                if let Some(copy) = seen.get(&items.addr()) {
                    return copy.clone();
                }
                let copy = Heap::new(Vec::new());
                seen.insert(items.addr(), Value::Array(copy.clone()));
                let copied: Vec<Value> = items
                    .borrow()
                    .iter()
                    .map(|item| ensure_sufficient_stack(|| item.deep_copy_with(seen)))
                    .collect();
                *copy.borrow_mut() = copied;
                Value::Array(copy)
            }
            Value::Object(obj) => {
                if let Some(copy) = seen.get(&obj.addr()) {
                    return copy.clone();
                }
                let class = obj.borrow().class.clone();
                let copy = Heap::new(Object {
                    fields: Fields::new(),
                    class,
                });
                seen.insert(obj.addr(), Value::Object(copy.clone()));
                let fields: Fields = obj
                    .borrow()
                    .fields
                    .iter()
                    .map(|(key, value)| {
                        let copy = ensure_sufficient_stack(|| value.deep_copy_with(seen));
                        (Rc::clone(key), copy)
                    })
                    .collect();
                copy.borrow_mut().fields = fields;
                Value::Object(copy)
            }
            other => other.clone(),
        }
    }

    /// Whether `item` is an element of an array, a substring of a string or
    /// a key of an object.
    pub fn contains(&self, item: &Value) -> Result<bool, EsError> {
        match (self, item) {
            (Value::Array(items), _) => Ok(items.borrow().iter().any(|x| x.equals(item))),
            (Value::String(s), Value::String(needle)) => Ok(s.contains(&**needle)),
            (Value::Object(obj), Value::String(key)) => Ok(obj.borrow().fields.contains_key(&**key)),
            (Value::String(_) | Value::Object(_), other) => Err(EsError::expected_type(
                Primitive::String.name(),
                &other.type_name(),
                &other.repr(),
            )),
            (other, _) => Err(EsError::invalid_operation(format!(
                "Cannot use 'in' on {}",
                other.type_name()
            ))),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repr())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

#[cfg(test)]
mod tests;
