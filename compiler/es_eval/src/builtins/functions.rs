use std::fmt::Write as _;
use std::rc::Rc;
use std::time::Duration;

use es_diagnostic::EsError;
use es_ir::{BinaryOp, StringInterner};

use super::{optional_callable, require_number, require_string, wrong_type};
use crate::context::Symbol;
use crate::interpreter::{parse_number, EvalResult, Interpreter};
use crate::value::{FunctionKind, NativeCall, Primitive, Value};

pub(super) fn print(interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let mut out = String::new();
    for arg in &call.args {
        out.push_str(&interp.display(arg, call.ctx)?);
    }
    interp.runtime().print_handler().println(&out);
    Ok(Value::Undefined)
}

pub(super) fn input(interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let message = call.arg(0);
    if !message.is_undefined() {
        let prompt = interp.display(&message, call.ctx)?;
        interp.runtime().print_handler().print(&prompt);
    }
    let line = interp
        .runtime()
        .input_handler()
        .read_line()
        .map_or(Value::Undefined, Value::string);
    match optional_callable(&call, 1)? {
        Some(callback) => {
            interp.call_value(&callback, None, &[line], call.ctx, &call.position)?;
            Ok(Value::Undefined)
        }
        None => Ok(line),
    }
}

pub(super) fn range(_interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let Value::Number(first) = call.arg(0) else {
        return Ok(Value::array(Vec::new()));
    };
    if call.arg(1).is_undefined() {
        if !first.is_finite() || first < 0.0 || first.fract() != 0.0 {
            return Err(range_error(format!(
                "Cannot make range of length '{}'",
                Value::Number(first)
            )));
        }
        let mut items = allocate_range(first)?;
        items.extend((0..first as u64).map(|n| Value::Number(n as f64)));
        return Ok(Value::array(items));
    }

    let max = require_number(&call, 1)?;
    let step = match call.arg(2) {
        Value::Undefined => 1.0,
        _ => require_number(&call, 2)?,
    };
    if step.is_nan() || step <= 0.0 || step.is_infinite() {
        return Err(range_error(format!("Range step must be positive, got '{}'", Value::Number(step))));
    }
    if !max.is_finite() {
        return Err(range_error(format!("Cannot make range up to '{}'", Value::Number(max))));
    }
    let mut items = allocate_range(((max - first) / step).ceil().max(0.0))?;
    let mut current = first;
    while current < max {
        items.push(Value::Number(current));
        current += step;
    }
    Ok(Value::array(items))
}

/// Reserve room for `len` items up front so an impossible range fails as a
/// script error rather than aborting mid-fill.
fn allocate_range(len: f64) -> Result<Vec<Value>, crate::interpreter::ControlAction> {
    let mut items = Vec::new();
    let fits = len <= usize::MAX as f64 && items.try_reserve_exact(len as usize).is_ok();
    if !fits {
        return Err(range_error(format!(
            "Cannot make range of length '{}'",
            Value::Number(len)
        )));
    }
    Ok(items)
}

#[cold]
fn range_error(details: String) -> crate::interpreter::ControlAction {
    EsError::user("RangeError", details).into()
}

pub(super) fn len(_interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let length = match call.arg(0) {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.borrow().len(),
        Value::Object(obj) => obj.borrow().fields.len(),
        other => {
            return Err(EsError::type_error(format!(
                "Cannot get the length of a value of type '{}'",
                other.type_name()
            ))
            .into())
        }
    };
    Ok(Value::Number(length as f64))
}

/// Declared type of the named symbol, or its value's type when undeclared.
pub(super) fn type_of(interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let text = require_string(&call, 0)?;
    let Some(name) = interp.interner().get(&text) else {
        return Err(EsError::reference(&text).into());
    };
    let symbol = interp.contexts().symbol(call.ctx, name)?;
    let ty = symbol.ty.unwrap_or_else(|| interp.types().of(&symbol.value));
    Ok(Value::Type(ty))
}

pub(super) fn parse_num(interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let text = interp.display(&call.arg(0), call.ctx)?;
    match parse_number(&text) {
        Some(n) => Ok(Value::Number(n)),
        None => Err(EsError::type_error(format!("Cannot convert '{text}' to a number")).into()),
    }
}

pub(super) fn throw(interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    if let Value::Error(e) = call.arg(0) {
        return Err(EsError::clone(&e).into());
    }
    let name = interp.display(&call.arg(0), call.ctx)?;
    let details = match call.arg(1) {
        Value::Undefined => String::new(),
        details => interp.display(&details, call.ctx)?,
    };
    Err(EsError::user(name, details).into())
}

pub(super) fn assert(interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    if interp.truthy(&call.arg(0), call.ctx)? {
        return Ok(Value::Undefined);
    }
    let message = match call.arg(1) {
        Value::Undefined => "Assertion failed".to_owned(),
        message => interp.display(&message, call.ctx)?,
    };
    Err(EsError::test_failed(message).into())
}

pub(super) fn assert_eq(interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let (left, right) = (call.arg(0), call.arg(1));
    let equal = interp.binary(BinaryOp::Eq, left.clone(), right.clone(), call.ctx, &call.position)?;
    if interp.truthy(&equal, call.ctx)? {
        return Ok(Value::Undefined);
    }
    Err(EsError::test_failed(format!("Expected {} to equal {}", left.repr(), right.repr())).into())
}

pub(super) fn import(interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let path = require_string(&call, 0)?;
    interp.import(&path, call.ctx)
}

/// Copy accessible members into the calling scope, or the root when the
/// second argument is truthy. Existing bindings are overwritten unless
/// constant.
pub(super) fn using(interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let store = interp.contexts();
    let names = interp.names();
    let members: Vec<(es_ir::Name, Symbol)> = match call.arg(0) {
        Value::Namespace(ns) => store
            .bindings(ns.context.id())?
            .into_iter()
            .filter(|(name, symbol)| symbol.accessible && *name != names.main && *name != names.path)
            .collect(),
        Value::Object(obj) => obj
            .borrow()
            .fields
            .iter()
            .map(|(key, value)| (interp.interner().intern(key), Symbol::variable(value.clone())))
            .collect(),
        other => return Err(wrong_type(Primitive::Namespace, &other).into()),
    };

    let global = call.arg(1);
    let target = if interp.truthy(&global, call.ctx)? {
        store.root(call.ctx)?
    } else {
        call.ctx
    };
    for (name, symbol) in members {
        match store.own_symbol(target, name)? {
            Some(_) => store.rebind(target, name, symbol.value)?,
            None => store.declare(target, name, symbol)?,
        }
    }
    Ok(Value::Undefined)
}

pub(super) fn delete(interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let text = require_string(&call, 0)?;
    let Some(name) = interp.interner().get(&text) else {
        return Err(EsError::reference(&text).into());
    };
    interp.contexts().remove(call.ctx, name)?;
    Ok(Value::Undefined)
}

pub(super) fn symbols(interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let recursive = interp.truthy(&call.arg(0), call.ctx)?;
    let store = interp.contexts();
    let mut names: Vec<Value> = Vec::new();
    let mut seen = rustc_hash::FxHashSet::default();
    let mut current = Some(call.ctx);
    while let Some(id) = current {
        for (name, _) in store.bindings(id)? {
            if seen.insert(name) {
                names.push(Value::string(interp.interner().lookup(name)));
            }
        }
        current = if recursive { store.parent(id)? } else { None };
    }
    Ok(Value::array(names))
}

pub(super) fn help(interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    if call.args.is_empty() {
        return Ok(Value::string(
            "Try 'help(<anything>)' for help about a particular value.",
        ));
    }
    let mut out = String::new();
    for value in &call.args {
        describe(interp.interner(), &mut out, value);
    }
    Ok(Value::string(out))
}

fn describe(interner: &StringInterner, out: &mut String, value: &Value) {
    let info = value.info();
    let name = if info.name.is_empty() { "(anonymous)" } else { &info.name };
    let description = if info.description.is_empty() {
        "No description."
    } else {
        &info.description
    };
    // Writing into a String cannot fail.
    let _ = writeln!(out, "Help on '{name}':");
    let _ = writeln!(out, "    Value: {}", value.repr());
    let _ = writeln!(out, "    Type: '{}'", value.type_name());
    let _ = writeln!(out, "    Location: {}", info.file.as_deref().unwrap_or("(unknown)"));
    let _ = writeln!(out, "    {description}");

    match value {
        Value::Function(f) => {
            if let FunctionKind::User(user) = &f.kind {
                let _ = writeln!(out, "    Arguments ({}):", user.params.len());
                for (i, param) in user.params.iter().enumerate() {
                    let ty = param.ty.as_ref().map_or("Any", |ty| ty.name());
                    let optional = if param.default.is_some() { " (optional)" } else { "" };
                    let name = interner.lookup(param.name);
                    let _ = writeln!(out, "        {}. {name}{optional} {{{ty}}}", i + 1);
                }
            }
        }
        Value::Type(ty) => {
            if ty.is_abstract() {
                let _ = writeln!(out, "    Abstract");
            }
            let methods = ty.method_names();
            if !methods.is_empty() {
                let shown: Vec<&str> = methods.iter().map(Rc::as_ref).collect();
                let _ = writeln!(out, "    Methods: {}", shown.join(", "));
            }
            let statics = ty.static_names();
            if !statics.is_empty() {
                let shown: Vec<&str> = statics.iter().map(Rc::as_ref).collect();
                let _ = writeln!(out, "    Static: {}", shown.join(", "));
            }
        }
        _ => {}
    }
}

pub(super) fn sleep(interp: &mut Interpreter<'_>, call: NativeCall) -> EvalResult {
    let ms = require_number(&call, 0)?;
    if ms.is_finite() && ms > 0.0 {
        std::thread::sleep(Duration::from_secs_f64(ms / 1000.0));
    }
    if let Some(callback) = optional_callable(&call, 1)? {
        interp.call_value(&callback, None, &[], call.ctx, &call.position)?;
    }
    Ok(Value::Undefined)
}
