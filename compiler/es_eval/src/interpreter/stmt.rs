//! Declarations, assignment and control flow.
//!
//! Branches, loop iterations and `try`/`catch` blocks each run in a fresh
//! child scope, so declarations inside them never leak out or survive into
//! the next iteration.
//!
//! `var [a, b] = value` binds fields of a plain object by name, and otherwise
//! walks an array or the characters of a string in order.

use es_diagnostic::{EsError, ErrorKind};
use es_ir::{AssignOp, AssignTarget, Declaration, Destructure, ForLoop, Node, Position};

use super::{ControlAction, EvalResult, Interpreter};
use crate::context::{ContextError, ContextId, Symbol};
use crate::value::Value;

/// What a `for` loop walks over.
enum ForItems {
    /// `0, 1, ...` while below `end`.
    Count { next: f64, end: f64 },
    Values(std::vec::IntoIter<Value>),
}

impl Iterator for ForItems {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match self {
            ForItems::Count { next, end } => {
                if *next >= *end {
                    return None;
                }
                let current = *next;
                *next += 1.0;
                Some(Value::Number(current))
            }
            ForItems::Values(values) => values.next(),
        }
    }
}

impl Interpreter<'_> {
    pub(super) fn eval_declaration(&mut self, decl: &Declaration, ctx: ContextId) -> EvalResult {
        let ty = match &decl.ty {
            Some(node) => Some(self.eval_type(node, ctx)?),
            None => None,
        };
        let value = match &decl.value {
            Some(node) => self.eval(node, ctx)?,
            None => Value::Undefined,
        };
        if let (Some(ty), Some(_)) = (&ty, &decl.value) {
            self.check_type(ty, &value)?;
        }

        let store = self.contexts();
        let target = if decl.modifiers.global {
            store.root(ctx)?
        } else {
            ctx
        };
        let symbol = Symbol {
            value: value.clone(),
            constant: decl.modifiers.constant,
            accessible: !decl.modifiers.local,
            ty,
        };
        store.declare(target, decl.name, symbol)?;
        Ok(value)
    }

    pub(super) fn eval_destructure(
        &mut self,
        destructure: &Destructure,
        ctx: ContextId,
    ) -> EvalResult {
        let store = self.contexts();
        let target = if destructure.modifiers.global {
            store.root(ctx)?
        } else {
            ctx
        };
        for (i, binding) in destructure.targets.iter().enumerate() {
            let repeated = destructure.targets[..i]
                .iter()
                .any(|earlier| earlier.name == binding.name);
            if repeated || store.own_symbol(target, binding.name)?.is_some() {
                return Err(
                    ContextError::AlreadyDeclared(self.interner().lookup(binding.name)).into(),
                );
            }
        }

        let value = self.eval(&destructure.value, ctx)?;
        let parts = self.destructure_parts(destructure, &value)?;
        for (binding, part) in destructure.targets.iter().zip(parts) {
            let ty = match &binding.ty {
                Some(node) => Some(self.eval_type(node, ctx)?),
                None => None,
            };
            if let Some(ty) = &ty {
                self.check_type(ty, &part)?;
            }
            let symbol = Symbol {
                value: part,
                constant: destructure.modifiers.constant,
                accessible: !destructure.modifiers.local,
                ty,
            };
            self.contexts().declare(target, binding.name, symbol)?;
        }
        Ok(value)
    }

    /// One value per target, in order.
    fn destructure_parts(&self, destructure: &Destructure, value: &Value) -> EvalResult<Vec<Value>> {
        let wanted = destructure.targets.len();
        let parts: Vec<Value> = match value {
            Value::Object(obj) if obj.borrow().class.is_none() => {
                let obj = obj.borrow();
                return Ok(destructure
                    .targets
                    .iter()
                    .map(|binding| {
                        let key = self.interner().lookup(binding.name);
                        obj.fields.get(key).cloned().unwrap_or_default()
                    })
                    .collect());
            }
            Value::Array(items) => items.borrow().iter().take(wanted).cloned().collect(),
            Value::String(s) => s.chars().take(wanted).map(|c| Value::string(c.to_string())).collect(),
            _ => {
                return Err(
                    EsError::type_error("Expected iterable in destructure assignment").into(),
                )
            }
        };
        if parts.len() < wanted {
            return Err(EsError::user(
                "IndexError",
                "Iterator ended unexpectedly - not enough elements to destruct",
            )
            .into());
        }
        Ok(parts)
    }

    pub(super) fn eval_assign(
        &mut self,
        target: &AssignTarget,
        op: AssignOp,
        value: &Node,
        ctx: ContextId,
        position: &Position,
    ) -> EvalResult {
        match target {
            AssignTarget::Variable(name) => {
                let rhs = self.eval(value, ctx)?;
                let store = self.contexts();
                let owner = store.resolve_owner(ctx, *name, false)?;
                let symbol = store.symbol(owner, *name)?;
                if symbol.constant {
                    return Err(ContextError::Constant(self.interner().lookup(*name)).into());
                }
                let new = match op.binary() {
                    Some(bin) => self.binary(bin, symbol.value.clone(), rhs, ctx, position)?,
                    None => rhs,
                };
                if let Some(ty) = &symbol.ty {
                    self.check_type(ty, &new)?;
                }
                store.rebind(owner, *name, new.clone())?;
                Ok(new)
            }
            AssignTarget::Member { base, name } => {
                let base = self.eval(base, ctx)?;
                let rhs = self.eval(value, ctx)?;
                let key = self.interner().lookup(*name);
                let new = match op.binary() {
                    Some(bin) => {
                        let current = self.get_member(&base, key)?;
                        self.binary(bin, current, rhs, ctx, position)?
                    }
                    None => rhs,
                };
                self.set_member(&base, key, new.clone())?;
                Ok(new)
            }
            AssignTarget::Index { base, index } => {
                let base = self.eval(base, ctx)?;
                let index = self.eval(index, ctx)?;
                let rhs = self.eval(value, ctx)?;
                let new = match op.binary() {
                    Some(bin) => {
                        let current = self.get_index(&base, &index)?;
                        self.binary(bin, current, rhs, ctx, position)?
                    }
                    None => rhs,
                };
                self.set_index(&base, &index, new.clone())?;
                Ok(new)
            }
        }
    }

    pub(super) fn eval_if(
        &mut self,
        condition: &Node,
        then_branch: &Node,
        else_branch: Option<&Node>,
        ctx: ContextId,
    ) -> EvalResult {
        let condition = self.eval(condition, ctx)?;
        let branch = if self.truthy(&condition, ctx)? {
            Some(then_branch)
        } else {
            else_branch
        };
        if let Some(branch) = branch {
            let scope = self.contexts().create(Some(ctx), None)?;
            self.eval(branch, scope.id())?;
        }
        Ok(Value::Undefined)
    }

    pub(super) fn eval_while(&mut self, condition: &Node, body: &Node, ctx: ContextId) -> EvalResult {
        loop {
            let test = self.eval(condition, ctx)?;
            if !self.truthy(&test, ctx)? {
                break;
            }
            let scope = self.contexts().create(Some(ctx), None)?;
            match self.eval(body, scope.id()) {
                Ok(_) | Err(ControlAction::Continue) => {}
                Err(ControlAction::Break) => break,
                Err(other) => return Err(other),
            }
        }
        Ok(Value::Undefined)
    }

    pub(super) fn eval_for(&mut self, for_loop: &ForLoop, ctx: ContextId) -> EvalResult {
        let iterable = self.eval(&for_loop.iterable, ctx)?;
        let items = match &iterable {
            Value::Number(n) => ForItems::Count { next: 0.0, end: *n },
            Value::Array(items) => ForItems::Values(items.borrow().clone().into_iter()),
            Value::Object(obj) => ForItems::Values(
                obj.borrow()
                    .fields
                    .keys()
                    .map(|key| Value::String(key.clone()))
                    .collect::<Vec<_>>()
                    .into_iter(),
            ),
            other => {
                return Err(EsError::type_error(format!(
                    "Cannot iterate over value of type '{}'",
                    other.type_name()
                ))
                .with_position(&for_loop.iterable.position)
                .into())
            }
        };

        let store = self.contexts();
        let binding = for_loop.binding;
        for item in items {
            let scope = store.create(Some(ctx), None)?;
            if for_loop.modifiers.global {
                let root = store.root(ctx)?;
                if store.own_symbol(root, binding)?.is_some() {
                    store.rebind(root, binding, item)?;
                } else {
                    store.declare(root, binding, Symbol::variable(item))?;
                }
            } else {
                let symbol = Symbol {
                    constant: for_loop.modifiers.constant,
                    ..Symbol::variable(item)
                };
                store.declare(scope.id(), binding, symbol)?;
            }
            match self.eval(&for_loop.body, scope.id()) {
                Ok(_) | Err(ControlAction::Continue) => {}
                Err(ControlAction::Break) => break,
                Err(other) => return Err(other),
            }
        }
        Ok(Value::Undefined)
    }

    /// Statements in order; the block's value is its last statement's.
    pub(super) fn eval_block(&mut self, statements: &[Node], ctx: ContextId) -> EvalResult {
        let mut last = Value::Undefined;
        for statement in statements {
            last = self.eval(statement, ctx)?;
        }
        Ok(last)
    }

    /// Run `body`; on error run `handler` with the error bound to `err`.
    /// Limit errors are not catchable.
    pub(super) fn eval_try(&mut self, body: &Node, handler: &Node, ctx: ContextId) -> EvalResult {
        let store = self.contexts();
        let scope = store.create(Some(ctx), None)?;
        let outcome = self.eval(body, scope.id());
        drop(scope);
        match outcome {
            Ok(_) => Ok(Value::Undefined),
            Err(ControlAction::Error(e)) if e.kind != ErrorKind::LimitExceeded => {
                tracing::debug!(error = %e.summary(), "caught");
                let scope = store.create(Some(ctx), None)?;
                store.declare(scope.id(), self.names().err, Symbol::constant(Value::error(*e)))?;
                self.eval(handler, scope.id())?;
                Ok(Value::Undefined)
            }
            Err(other) => Err(other),
        }
    }
}
