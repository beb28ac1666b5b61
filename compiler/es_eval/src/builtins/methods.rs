//! Methods on builtin values. The receiver arrives as `call.this`.

use std::rc::Rc;

use es_diagnostic::EsError;

use super::{require_callable, require_string, wrong_type};
use crate::interpreter::{EvalResult, Interpreter};
use crate::shared::Heap;
use crate::value::{NativeCall, Primitive, Value};

fn this_array(call: &NativeCall) -> Result<Heap<Vec<Value>>, EsError> {
    match &call.this {
        Some(Value::Array(items)) => Ok(items.clone()),
        other => Err(wrong_type(Primitive::Array, other.as_ref().unwrap_or(&Value::Undefined))),
    }
}

fn this_string(call: &NativeCall) -> Result<Rc<str>, EsError> {
    match &call.this {
        Some(Value::String(s)) => Ok(Rc::clone(s)),
        other => Err(wrong_type(Primitive::String, other.as_ref().unwrap_or(&Value::Undefined))),
    }
}

pub(super) fn array_push(_interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let items = this_array(&call)?;
    let mut items = items.borrow_mut();
    items.extend(call.args);
    Ok(Value::Number(items.len() as f64))
}

pub(super) fn array_pop(_interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let items = this_array(&call)?;
    let last = items.borrow_mut().pop();
    Ok(last.unwrap_or_default())
}

pub(super) fn array_contains(_interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let items = this_array(&call)?;
    let needle = call.arg(0);
    let found = items.borrow().iter().any(|item| item.equals(&needle));
    Ok(Value::Boolean(found))
}

/// Separator defaults to `,`.
pub(super) fn array_join(interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let items = this_array(&call)?.borrow().clone();
    let separator = match call.arg(0) {
        Value::Undefined => Rc::from(","),
        _ => require_string(&call, 0)?,
    };
    let mut parts = Vec::with_capacity(items.len());
    for item in &items {
        parts.push(interp.display(item, call.ctx)?);
    }
    Ok(Value::string(parts.join(&separator)))
}

pub(super) fn array_map(interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let items = this_array(&call)?.borrow().clone();
    let callback = require_callable(&call, 0)?;
    let mut mapped = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let args = [item, Value::Number(i as f64)];
        mapped.push(interp.call_value(&callback, None, &args, call.ctx, &call.position)?);
    }
    Ok(Value::array(mapped))
}

pub(super) fn array_filter(interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let items = this_array(&call)?.borrow().clone();
    let callback = require_callable(&call, 0)?;
    let mut kept = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        let args = [item, Value::Number(i as f64)];
        let keep = interp.call_value(&callback, None, &args, call.ctx, &call.position)?;
        if interp.truthy(&keep, call.ctx)? {
            let [item, _] = args;
            kept.push(item);
        }
    }
    Ok(Value::array(kept))
}

/// An empty or missing separator splits into characters.
pub(super) fn string_split(_interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let text = this_string(&call)?;
    let separator = match call.arg(0) {
        Value::Undefined => Rc::from(""),
        _ => require_string(&call, 0)?,
    };
    let parts: Vec<Value> = if separator.is_empty() {
        text.chars().map(|ch| Value::string(ch.to_string())).collect()
    } else {
        text.split(&*separator).map(Value::from).collect()
    };
    Ok(Value::array(parts))
}

pub(super) fn string_upper(_interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    Ok(Value::string(this_string(&call)?.to_uppercase()))
}

pub(super) fn string_lower(_interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    Ok(Value::string(this_string(&call)?.to_lowercase()))
}

pub(super) fn string_contains(_interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let text = this_string(&call)?;
    let needle = require_string(&call, 0)?;
    Ok(Value::Boolean(text.contains(&*needle)))
}

pub(super) fn object_keys(_interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    match &call.this {
        Some(Value::Object(obj)) => {
            let keys = obj
                .borrow()
                .fields
                .keys()
                .map(|key| Value::String(Rc::clone(key)))
                .collect();
            Ok(Value::array(keys))
        }
        other => Err(wrong_type(Primitive::Object, other.as_ref().unwrap_or(&Value::Undefined)).into()),
    }
}
