//! Calls.
//!
//! A user function runs in a fresh frame whose parent is the scope it closed
//! over. The frame binds the parameters, a constant `args` array, `this` for
//! method calls and `super` inside constructors. Errors leaving a call pick
//! up a traceback frame naming the callee and its arguments.

use std::rc::Rc;

use es_diagnostic::EsError;
use es_ir::{Node, NodeKind, Position};

use super::expr::Member;
use super::{ControlAction, EvalResult, Interpreter};
use crate::context::{ContextError, ContextId, Symbol};
use crate::shared::Heap;
use crate::value::{
    Fields, Function, FunctionKind, NativeCall, Object, Primitive, Type, UserFunction, Value,
};

impl Interpreter<'_> {
    pub(super) fn eval_call(
        &mut self,
        callee: &Node,
        args: &[Node],
        optional: bool,
        ctx: ContextId,
        position: &Position,
    ) -> EvalResult {
        // `a.b(...)` passes `a` as the receiver instead of binding a copy of `b`.
        let (target, receiver) = match &callee.kind {
            NodeKind::Member {
                base,
                name,
                optional: optional_base,
            } => {
                let base = self.eval(base, ctx)?;
                if *optional_base && base.is_undefined() {
                    return Ok(Value::Undefined);
                }
                let key = self.interner().lookup(*name);
                match self
                    .lookup_member(&base, key)
                    .map_err(|action| action.at(&callee.position))?
                {
                    Member::Field(value) => (value, None),
                    Member::Method(method) => (Value::Function(method), Some(base)),
                }
            }
            _ => (self.eval(callee, ctx)?, None),
        };
        if optional && target.is_undefined() {
            return Ok(Value::Undefined);
        }
        let args = self.eval_list(args, ctx)?;
        self.call_value(&target, receiver, &args, ctx, position)
    }

    /// Call a function or type. Failures gain a traceback frame at `position`.
    pub fn call_value(
        &mut self,
        target: &Value,
        receiver: Option<Value>,
        args: &[Value],
        ctx: ContextId,
        position: &Position,
    ) -> EvalResult {
        let result = match target {
            Value::Function(f) => self.call_function(f, receiver, args, ctx, position),
            Value::Type(ty) => self.call_type(ty, args, ctx, position),
            other => {
                return Err(EsError::type_error(format!(
                    "'{}' is not callable",
                    other.repr()
                ))
                .into())
            }
        };
        result.map_err(|action| match action {
            ControlAction::Error(mut e) => {
                let shown: Vec<String> = args.iter().map(Value::repr).collect();
                let name = target.info().name;
                e.push_frame(position.clone(), format!("{name}({})", shown.join(", ")));
                ControlAction::Error(e)
            }
            other => other,
        })
    }

    /// Call `function`. An explicit `receiver` wins over a bound `this`.
    pub fn call_function(
        &mut self,
        function: &Rc<Function>,
        receiver: Option<Value>,
        args: &[Value],
        ctx: ContextId,
        position: &Position,
    ) -> EvalResult {
        let this = receiver.or_else(|| function.this.clone());
        match &function.kind {
            FunctionKind::Native(f) => f(
                self,
                NativeCall {
                    ctx,
                    this,
                    args: args.to_vec(),
                    position: position.clone(),
                },
            ),
            FunctionKind::User(user) => self.call_user(function, user, this, None, args),
            FunctionKind::SuperInit(parent) => {
                let Some(this) = this else {
                    return Err(EsError::invalid_operation("'super' called without an instance").into());
                };
                if let Some((owner, init)) = parent.find_init() {
                    self.run_init(&owner, &init, &this, args)?;
                }
                Ok(Value::Undefined)
            }
        }
    }

    fn call_user(
        &mut self,
        function: &Function,
        user: &UserFunction,
        this: Option<Value>,
        super_init: Option<Value>,
        args: &[Value],
    ) -> EvalResult {
        if let Err(exceeded) = self.depth.enter() {
            return Err(EsError::limit_exceeded(format!(
                "Maximum call depth of {} exceeded",
                exceeded.limit
            ))
            .into());
        }
        let result = self.run_frame(function, user, this, super_init, args);
        self.depth.exit();
        result
    }

    fn run_frame(
        &mut self,
        function: &Function,
        user: &UserFunction,
        this: Option<Value>,
        super_init: Option<Value>,
        args: &[Value],
    ) -> EvalResult {
        let store = self.contexts();
        let names = self.names();
        let frame = store.create(Some(user.closure.id()), None)?;
        let id = frame.id();

        for (i, param) in user.params.iter().enumerate() {
            let value = args.get(i).cloned().or_else(|| param.default.clone());
            if let (Some(ty), Some(value)) = (&param.ty, &value) {
                if !self.conforms(ty, value) {
                    return Err(EsError::type_error(format!(
                        "Argument '{}' of '{}' expected type '{}', got type '{}'",
                        self.interner().lookup(param.name),
                        function.name(),
                        ty.name(),
                        value.type_name()
                    ))
                    .into());
                }
            }
            store.declare(id, param.name, Symbol::variable(value.unwrap_or_default()))?;
        }
        declare_implicit(self, id, names.args, Value::array(args.to_vec()))?;
        if let Some(this) = this {
            declare_implicit(self, id, names.this, this)?;
        }
        if let Some(super_init) = super_init {
            declare_implicit(self, id, names.super_, super_init)?;
        }

        let value = match self.eval(&user.def.body, id) {
            Ok(value) | Err(ControlAction::Return(value)) => value,
            Err(other) => return Err(other),
        };
        if let Some(ty) = &user.return_type {
            if !self.conforms(ty, &value) {
                return Err(EsError::type_error(format!(
                    "Function '{}' expected to return type '{}', got type '{}'",
                    function.name(),
                    ty.name(),
                    value.type_name()
                ))
                .into());
            }
        }
        Ok(value)
    }

    /// Calling a type: conversion for builtins, instantiation for classes.
    pub fn call_type(
        &mut self,
        ty: &Rc<Type>,
        args: &[Value],
        ctx: ContextId,
        position: &Position,
    ) -> EvalResult {
        match ty.primitive_kind() {
            Some(primitive) => self.convert(primitive, args, ctx, position),
            None if ty.is_abstract() => {
                Err(EsError::type_error("Cannot construct abstract class").into())
            }
            None => self.instantiate(ty, args, true),
        }
    }

    fn convert(
        &mut self,
        primitive: Primitive,
        args: &[Value],
        ctx: ContextId,
        position: &Position,
    ) -> EvalResult {
        let first = args.first().cloned().unwrap_or_default();
        let value = match primitive {
            Primitive::Any | Primitive::Undefined => first,
            Primitive::Number => to_number(&first)?,
            Primitive::String => Value::string(self.display(&first, ctx)?),
            Primitive::Boolean => Value::Boolean(self.truthy(&first, ctx)?),
            Primitive::Array => Value::array(args.to_vec()),
            Primitive::Object => match first {
                Value::Object(obj) => Value::object(obj.borrow().fields.clone()),
                Value::Undefined => Value::object(Fields::new()),
                other => {
                    return Err(EsError::type_error(format!(
                        "Cannot convert type '{}' to Object",
                        other.type_name()
                    ))
                    .into())
                }
            },
            Primitive::Type => Value::Type(self.types().of(&first)),
            Primitive::Error => {
                let details = self.display(&first, ctx)?;
                Value::error(EsError::user("UserError", details).at(position.clone()))
            }
            Primitive::Function | Primitive::Namespace => {
                return Err(EsError::type_error(format!(
                    "Cannot construct a value of type '{}'",
                    primitive.name()
                ))
                .into())
            }
        };
        Ok(value)
    }

    /// Create an instance of `class`, running the nearest `init` unless
    /// `run_init` is false. Once `init` returns, every typed property declared
    /// up the chain must hold a value of its type.
    pub fn instantiate(&mut self, class: &Rc<Type>, args: &[Value], run_init: bool) -> EvalResult {
        let object = Heap::new(Object::instance(Rc::clone(class)));
        class.register_instance(&object);
        let instance = Value::Object(object.clone());
        if run_init {
            if let Some((owner, init)) = class.find_init() {
                self.run_init(&owner, &init, &instance, args)?;
            }
            for (name, expected) in class.typed_properties() {
                let value = object.borrow().fields.get(&name).cloned().unwrap_or_default();
                if !self.conforms(&expected, &value) {
                    return Err(EsError::type_error(format!(
                        "Initializer incorrectly assigned properties: '{name}' expected type '{}', got type '{}'",
                        expected.name(),
                        value.type_name()
                    ))
                    .into());
                }
            }
        }
        Ok(instance)
    }

    /// Run the `init` defined on `owner` against `this`, with `super` bound to
    /// the constructor above `owner`.
    fn run_init(
        &mut self,
        owner: &Rc<Type>,
        init: &Rc<Function>,
        this: &Value,
        args: &[Value],
    ) -> EvalResult<()> {
        let FunctionKind::User(user) = &init.kind else {
            return Err(EsError::invalid_operation("Constructors must be script functions").into());
        };
        let super_init = owner
            .extends()
            .map(|parent| Value::function(Function::super_init(Rc::clone(parent), this.clone())));
        self.call_user(init, user, Some(this.clone()), super_init, args)?;
        Ok(())
    }
}

/// Bind an implicit name unless a parameter already claimed it.
fn declare_implicit(
    interp: &Interpreter<'_>,
    frame: ContextId,
    name: es_ir::Name,
    value: Value,
) -> EvalResult<()> {
    match interp.contexts().declare(frame, name, Symbol::constant(value)) {
        Ok(()) | Err(ContextError::AlreadyDeclared(_)) => Ok(()),
        Err(other) => Err(other.into()),
    }
}

pub(crate) fn to_number(value: &Value) -> Result<Value, EsError> {
    match value {
        Value::Number(_) => Ok(value.clone()),
        Value::Boolean(b) => Ok(Value::Number(if *b { 1.0 } else { 0.0 })),
        Value::Undefined => Ok(Value::Number(0.0)),
        Value::String(s) => parse_number(s)
            .map(Value::Number)
            .ok_or_else(|| EsError::type_error("This string is not a valid number")),
        other => Err(EsError::type_error(format!(
            "Cannot convert type '{}' to Number",
            other.type_name()
        ))),
    }
}

/// Parse a leading decimal number, ignoring surrounding whitespace.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    match text {
        "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => {
            let end = text
                .char_indices()
                .take_while(|&(i, c)| {
                    c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0)
                })
                .map(|(i, c)| i + c.len_utf8())
                .last()?;
            text[..end].parse().ok()
        }
    }
}
