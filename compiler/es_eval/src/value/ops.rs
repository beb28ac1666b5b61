//! Operator capabilities.
//!
//! Each trait covers one family of operators. Default methods reject the
//! operation, so a variant implements only what it supports; [`Value`] hands
//! out trait objects for the variants that implement each family.

use std::rc::Rc;

use es_diagnostic::EsError;
use es_ir::{BinaryOp, UnaryOp};

use crate::shared::Heap;

use super::{Fields, Object, Primitive, Value};

#[cold]
fn unsupported(op: &str, ty: &str) -> EsError {
    EsError::invalid_operation(format!("Operator '{op}' is not supported on {ty}"))
}

#[cold]
fn expected(primitive: Primitive, got: &Value) -> EsError {
    EsError::expected_type(primitive.name(), &got.type_name(), &got.repr())
}

fn number(rhs: &Value) -> Result<f64, EsError> {
    match rhs {
        Value::Number(n) => Ok(*n),
        other => Err(expected(Primitive::Number, other)),
    }
}

pub trait Addable {
    fn add(&self, rhs: &Value) -> Result<Value, EsError>;
}

pub trait Arithmetic {
    fn type_label(&self) -> &'static str;

    fn subtract(&self, _rhs: &Value) -> Result<Value, EsError> {
        Err(unsupported("-", self.type_label()))
    }

    fn multiply(&self, _rhs: &Value) -> Result<Value, EsError> {
        Err(unsupported("*", self.type_label()))
    }

    fn divide(&self, _rhs: &Value) -> Result<Value, EsError> {
        Err(unsupported("/", self.type_label()))
    }

    fn power(&self, _rhs: &Value) -> Result<Value, EsError> {
        Err(unsupported("^", self.type_label()))
    }

    fn modulo(&self, _rhs: &Value) -> Result<Value, EsError> {
        Err(unsupported("%", self.type_label()))
    }
}

pub trait Comparable {
    fn less_than(&self, rhs: &Value) -> Result<bool, EsError>;
    fn greater_than(&self, rhs: &Value) -> Result<bool, EsError>;
}

pub trait Indexable {
    fn get_index(&self, index: &Value) -> Result<Value, EsError>;

    fn set_index(&self, _index: &Value, _value: Value) -> Result<(), EsError> {
        Err(EsError::type_error("Cannot assign to an index of this value"))
    }
}

impl Addable for f64 {
    fn add(&self, rhs: &Value) -> Result<Value, EsError> {
        Ok(Value::Number(self + number(rhs)?))
    }
}

impl Arithmetic for f64 {
    fn type_label(&self) -> &'static str {
        "Number"
    }

    fn subtract(&self, rhs: &Value) -> Result<Value, EsError> {
        Ok(Value::Number(self - number(rhs)?))
    }

    fn multiply(&self, rhs: &Value) -> Result<Value, EsError> {
        Ok(Value::Number(self * number(rhs)?))
    }

    fn divide(&self, rhs: &Value) -> Result<Value, EsError> {
        Ok(Value::Number(self / number(rhs)?))
    }

    fn power(&self, rhs: &Value) -> Result<Value, EsError> {
        Ok(Value::Number(self.powf(number(rhs)?)))
    }

    fn modulo(&self, rhs: &Value) -> Result<Value, EsError> {
        Ok(Value::Number(self % number(rhs)?))
    }
}

impl Comparable for f64 {
    fn less_than(&self, rhs: &Value) -> Result<bool, EsError> {
        Ok(*self < number(rhs)?)
    }

    fn greater_than(&self, rhs: &Value) -> Result<bool, EsError> {
        Ok(*self > number(rhs)?)
    }
}

impl Addable for Rc<str> {
    fn add(&self, rhs: &Value) -> Result<Value, EsError> {
        Ok(Value::string(format!("{self}{rhs}")))
    }
}

impl Arithmetic for Rc<str> {
    fn type_label(&self) -> &'static str {
        "String"
    }

    /// Repetition; fractional counts round down and negative ones give `''`.
    fn multiply(&self, rhs: &Value) -> Result<Value, EsError> {
        let times = number(rhs)?;
        if self.is_empty() || times.is_nan() || times < 1.0 {
            return Ok(Value::string(""));
        }
        let times = times.floor();
        if times * self.len() as f64 > MAX_REPEAT_BYTES as f64 {
            return Err(EsError::user(
                "RangeError",
                format!(
                    "Cannot repeat a string of length {} {} times",
                    self.chars().count(),
                    super::display::format_number(times)
                ),
            ));
        }
        Ok(Value::string(self.repeat(times as usize)))
    }
}

/// Largest string `*` may build.
pub const MAX_REPEAT_BYTES: usize = 1 << 30;

fn string_len(rhs: &Value) -> Result<usize, EsError> {
    match rhs {
        Value::String(s) => Ok(s.chars().count()),
        other => Err(expected(Primitive::String, other)),
    }
}

/// Strings order by length.
impl Comparable for Rc<str> {
    fn less_than(&self, rhs: &Value) -> Result<bool, EsError> {
        Ok(self.chars().count() < string_len(rhs)?)
    }

    fn greater_than(&self, rhs: &Value) -> Result<bool, EsError> {
        Ok(self.chars().count() > string_len(rhs)?)
    }
}

/// Character at a (possibly negative) position.
impl Indexable for Rc<str> {
    fn get_index(&self, index: &Value) -> Result<Value, EsError> {
        let len = self.chars().count();
        Ok(resolve_index(number(index)?, len)
            .and_then(|i| self.chars().nth(i))
            .map_or(Value::Undefined, |ch| Value::string(ch.to_string())))
    }
}

/// Map a script index onto `0..len`. Negative indices count from the end.
fn resolve_index(index: f64, len: usize) -> Option<usize> {
    if !index.is_finite() || index.fract() != 0.0 {
        return None;
    }
    let index = if index < 0.0 { len as f64 + index } else { index };
    (index >= 0.0 && index < len as f64).then_some(index as usize)
}

impl Addable for Heap<Vec<Value>> {
    fn add(&self, rhs: &Value) -> Result<Value, EsError> {
        match rhs {
            Value::Array(other) => {
                let mut items = self.borrow().clone();
                items.extend(other.borrow().iter().cloned());
                Ok(Value::array(items))
            }
            other => Err(expected(Primitive::Array, other)),
        }
    }
}

impl Indexable for Heap<Vec<Value>> {
    fn get_index(&self, index: &Value) -> Result<Value, EsError> {
        let items = self.borrow();
        Ok(resolve_index(number(index)?, items.len())
            .and_then(|i| items.get(i).cloned())
            .unwrap_or_default())
    }

    /// Writing one past the end appends.
    fn set_index(&self, index: &Value, value: Value) -> Result<(), EsError> {
        let raw = number(index)?;
        let len = self.borrow().len();
        if let Some(i) = resolve_index(raw, len) {
            let old = std::mem::replace(&mut self.borrow_mut()[i], value);
            drop(old);
            Ok(())
        } else if raw == len as f64 {
            self.borrow_mut().push(value);
            Ok(())
        } else {
            Err(EsError::type_error(format!(
                "Index {} is out of bounds for array of length {len}",
                super::display::format_number(raw)
            )))
        }
    }
}

/// `+` on objects merges; fields of the right operand win.
impl Addable for Heap<Object> {
    fn add(&self, rhs: &Value) -> Result<Value, EsError> {
        match rhs {
            Value::Object(other) => {
                let mut fields: Fields = self.borrow().fields.clone();
                for (key, value) in other.borrow().fields.iter() {
                    fields.insert(Rc::clone(key), value.clone());
                }
                Ok(Value::object(fields))
            }
            other => Err(expected(Primitive::Object, other)),
        }
    }
}

/// Field access by string key; missing fields read as `undefined`.
impl Indexable for Heap<Object> {
    fn get_index(&self, index: &Value) -> Result<Value, EsError> {
        match index {
            Value::String(key) => Ok(self.borrow().fields.get(&**key).cloned().unwrap_or_default()),
            other => Err(expected(Primitive::String, other)),
        }
    }

    fn set_index(&self, index: &Value, value: Value) -> Result<(), EsError> {
        match index {
            Value::String(key) => {
                let old = self.borrow_mut().fields.insert(Rc::clone(key), value);
                drop(old);
                Ok(())
            }
            other => Err(expected(Primitive::String, other)),
        }
    }
}

impl Value {
    pub fn as_addable(&self) -> Option<&dyn Addable> {
        match self {
            Value::Number(n) => Some(n),
            Value::String(s) => Some(s),
            Value::Array(items) => Some(items),
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_arithmetic(&self) -> Option<&dyn Arithmetic> {
        match self {
            Value::Number(n) => Some(n),
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_comparable(&self) -> Option<&dyn Comparable> {
        match self {
            Value::Number(n) => Some(n),
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_indexable(&self) -> Option<&dyn Indexable> {
        match self {
            Value::String(s) => Some(s),
            Value::Array(items) => Some(items),
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

fn arithmetic<'a>(left: &'a Value, symbol: &str) -> Result<&'a dyn Arithmetic, EsError> {
    left.as_arithmetic()
        .ok_or_else(|| unsupported(symbol, &left.type_name()))
}

fn comparable<'a>(left: &'a Value, symbol: &str) -> Result<&'a dyn Comparable, EsError> {
    left.as_comparable()
        .ok_or_else(|| unsupported(symbol, &left.type_name()))
}

/// Apply a binary operator that needs no interpreter support. The logical
/// operators and overloads are resolved before this is reached.
pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EsError> {
    let symbol = op.as_symbol();
    match op {
        BinaryOp::Add => match (left, right) {
            (Value::String(_), _) | (_, Value::String(_)) => {
                Ok(Value::string(format!("{left}{right}")))
            }
            _ => left
                .as_addable()
                .ok_or_else(|| unsupported(symbol, &left.type_name()))?
                .add(right),
        },
        BinaryOp::Subtract => arithmetic(left, symbol)?.subtract(right),
        BinaryOp::Multiply => arithmetic(left, symbol)?.multiply(right),
        BinaryOp::Divide => arithmetic(left, symbol)?.divide(right),
        BinaryOp::Power => arithmetic(left, symbol)?.power(right),
        BinaryOp::Modulo => arithmetic(left, symbol)?.modulo(right),
        BinaryOp::Eq => Ok(Value::Boolean(left.equals(right))),
        BinaryOp::NotEq => Ok(Value::Boolean(!left.equals(right))),
        BinaryOp::Lt => Ok(Value::Boolean(comparable(left, symbol)?.less_than(right)?)),
        BinaryOp::Gt => Ok(Value::Boolean(comparable(left, symbol)?.greater_than(right)?)),
        BinaryOp::LtEq => Ok(Value::Boolean(
            left.equals(right) || comparable(left, symbol)?.less_than(right)?,
        )),
        BinaryOp::GtEq => Ok(Value::Boolean(
            left.equals(right) || comparable(left, symbol)?.greater_than(right)?,
        )),
        BinaryOp::And => Ok(Value::Boolean(left.truthy() && right.truthy())),
        BinaryOp::Or => Ok(Value::Boolean(left.truthy() || right.truthy())),
        BinaryOp::Coalesce => Ok(if left.is_undefined() {
            right.clone()
        } else {
            left.clone()
        }),
        BinaryOp::In => Ok(Value::Boolean(right.contains(left)?)),
    }
}

/// Apply a unary operator. Unary `+` is absolute value.
pub fn unary(op: UnaryOp, operand: &Value) -> Result<Value, EsError> {
    match (op, operand) {
        (UnaryOp::Negate, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnaryOp::Plus, Value::Number(n)) => Ok(Value::Number(n.abs())),
        (UnaryOp::Not, value) => Ok(Value::Boolean(!value.truthy())),
        (op, other) => Err(unsupported(op.as_symbol(), &other.type_name())),
    }
}
