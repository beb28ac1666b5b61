//! Tree-walking interpreter.
//!
//! All evaluation goes through [`Interpreter::eval`], which counts steps,
//! enforces the runtime's limits, grows the native stack on deep recursion and
//! stamps position-less errors with the node being evaluated. The node kinds
//! are handled in:
//!
//! - `expr` - literals, variables, operators, member and index reads
//! - `stmt` - declarations, assignment, conditionals, loops, try/catch
//! - `call` - calls, parameter binding, tracebacks, constructors
//! - `item` - function, class and namespace definitions, namespace members
//!
//! Non-local exits (`return`, `break`, `continue`) and errors travel as the
//! `Err` side of [`EvalResult`].

mod call;
mod expr;
mod item;
mod stmt;

pub(crate) use call::parse_number;

use std::rc::Rc;
use std::time::Instant;

use es_diagnostic::EsError;
use es_ir::{Name, Node, NodeKind, Position, Program, StringInterner};
use es_stack::{ensure_sufficient_stack, CallDepth};

use crate::context::{ContextError, ContextId, ContextStore};
use crate::runtime::Runtime;
use crate::value::{BuiltinTypes, Primitive, Type, Value};

/// Why evaluation of a node stopped early.
#[derive(Debug)]
pub enum ControlAction {
    Error(Box<EsError>),
    Return(Value),
    Break,
    Continue,
}

impl ControlAction {
    /// Give a position-less error the position of `node`.
    #[must_use]
    fn at(self, position: &Position) -> Self {
        match self {
            ControlAction::Error(e) if e.position.is_unknown() => {
                ControlAction::Error(Box::new(e.with_position(position)))
            }
            other => other,
        }
    }

    /// Collapse into an error at a boundary where control flow cannot escape.
    pub fn into_error(self) -> EsError {
        match self {
            ControlAction::Error(e) => *e,
            ControlAction::Return(_) => EsError::invalid_syntax("'return' outside of a function"),
            ControlAction::Break => EsError::invalid_syntax("'break' outside of a loop"),
            ControlAction::Continue => EsError::invalid_syntax("'continue' outside of a loop"),
        }
    }
}

impl From<EsError> for ControlAction {
    fn from(e: EsError) -> Self {
        ControlAction::Error(Box::new(e))
    }
}

impl From<ContextError> for ControlAction {
    fn from(e: ContextError) -> Self {
        ControlAction::from(EsError::from(e))
    }
}

pub type EvalResult<T = Value> = Result<T, ControlAction>;

/// Names the interpreter binds implicitly, interned once per runtime.
#[derive(Clone, Copy)]
pub(crate) struct Names {
    pub this: Name,
    pub args: Name,
    pub super_: Name,
    pub err: Name,
    pub main: Name,
    pub path: Name,
}

impl Names {
    pub(crate) fn new(interner: &StringInterner) -> Self {
        Names {
            this: interner.intern("this"),
            args: interner.intern("args"),
            super_: interner.intern("super"),
            err: interner.intern("err"),
            main: interner.intern("__main__"),
            path: interner.intern("__path__"),
        }
    }
}

/// Step and wall-clock budget for one run.
struct Budget {
    steps: u64,
    max_steps: Option<u64>,
    deadline: Option<Instant>,
}

impl Budget {
    /// Clock reads are spread out; steps are exact.
    const CLOCK_INTERVAL: u64 = 256;

    fn tick(&mut self) -> Result<(), EsError> {
        self.steps += 1;
        if let Some(max) = self.max_steps {
            if self.steps > max {
                return Err(EsError::limit_exceeded(format!(
                    "Exceeded the limit of {max} evaluation steps"
                )));
            }
        }
        if let Some(deadline) = self.deadline {
            if self.steps % Self::CLOCK_INTERVAL == 0 && Instant::now() >= deadline {
                return Err(EsError::limit_exceeded("Exceeded the time limit"));
            }
        }
        Ok(())
    }
}

pub struct Interpreter<'rt> {
    rt: &'rt Runtime,
    depth: CallDepth,
    budget: Budget,
}

impl<'rt> Interpreter<'rt> {
    pub(crate) fn new(rt: &'rt Runtime) -> Self {
        let limits = rt.limits();
        Interpreter {
            rt,
            depth: CallDepth::new(limits.max_call_depth),
            budget: Budget {
                steps: 0,
                max_steps: limits.max_steps,
                deadline: limits.timeout.map(|timeout| Instant::now() + timeout),
            },
        }
    }

    pub fn runtime(&self) -> &'rt Runtime {
        self.rt
    }

    pub fn interner(&self) -> &'rt StringInterner {
        self.rt.interner()
    }

    pub fn contexts(&self) -> &'rt ContextStore {
        self.rt.contexts()
    }

    pub fn types(&self) -> &'rt BuiltinTypes {
        self.rt.types()
    }

    pub(crate) fn names(&self) -> Names {
        self.rt.names()
    }

    /// Nodes evaluated so far.
    pub fn steps(&self) -> u64 {
        self.budget.steps
    }

    /// Evaluate every top-level statement of `program` in `ctx`, collecting
    /// each statement's value.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
    pub fn run_program(&mut self, program: &Program, ctx: ContextId) -> Result<Vec<Value>, EsError> {
        let mut values = Vec::with_capacity(program.statements.len());
        for statement in &program.statements {
            let value = self.eval(statement, ctx).map_err(ControlAction::into_error)?;
            values.push(value);
        }
        Ok(values)
    }

    /// Evaluate one node.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn eval(&mut self, node: &Node, ctx: ContextId) -> EvalResult {
        if let Err(e) = self.budget.tick() {
            return Err(ControlAction::from(e.with_position(&node.position)));
        }
        ensure_sufficient_stack(|| self.eval_inner(node, ctx))
            .map_err(|action| action.at(&node.position))
    }

    fn eval_inner(&mut self, node: &Node, ctx: ContextId) -> EvalResult {
        match &node.kind {
            NodeKind::Number(n) => Ok(Value::Number(*n)),
            NodeKind::String(s) => Ok(Value::String(Rc::clone(s))),
            NodeKind::Undefined => Ok(Value::Undefined),
            NodeKind::Variable(name) => Ok(self.contexts().lookup(ctx, *name)?),
            NodeKind::Break => Err(ControlAction::Break),
            NodeKind::Continue => Err(ControlAction::Continue),

            NodeKind::Array(items) => {
                let items = self.eval_list(items, ctx)?;
                Ok(Value::array(items))
            }
            NodeKind::Object(entries) => self.eval_object(entries, ctx),
            NodeKind::Unary { op, operand } => self.eval_unary(*op, operand, ctx),
            NodeKind::Binary { op, left, right } => {
                let left = self.eval(left, ctx)?;
                let right = self.eval(right, ctx)?;
                self.binary(*op, left, right, ctx, &node.position)
            }

            NodeKind::Declare(decl) => self.eval_declaration(decl, ctx),
            NodeKind::Destructure(destructure) => self.eval_destructure(destructure, ctx),
            NodeKind::Assign { target, op, value } => {
                self.eval_assign(target, *op, value, ctx, &node.position)
            }
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.eval_if(condition, then_branch, else_branch.as_deref(), ctx),
            NodeKind::While { condition, body } => self.eval_while(condition, body, ctx),
            NodeKind::For(for_loop) => self.eval_for(for_loop, ctx),
            NodeKind::Block(statements) => self.eval_block(statements, ctx),
            NodeKind::Try { body, handler } => self.eval_try(body, handler, ctx),

            NodeKind::Call {
                callee,
                args,
                optional,
            } => self.eval_call(callee, args, *optional, ctx, &node.position),
            NodeKind::Index {
                base,
                index,
                optional,
            } => {
                let base = self.eval(base, ctx)?;
                if *optional && base.is_undefined() {
                    return Ok(Value::Undefined);
                }
                let index = self.eval(index, ctx)?;
                self.get_index(&base, &index)
            }
            NodeKind::Member {
                base,
                name,
                optional,
            } => {
                let base = self.eval(base, ctx)?;
                if *optional && base.is_undefined() {
                    return Ok(Value::Undefined);
                }
                let key = self.interner().lookup(*name);
                self.get_member(&base, key)
            }

            NodeKind::Function(def) => self.eval_function(def, ctx),
            NodeKind::Class(def) => self.eval_class(def, ctx),
            NodeKind::Namespace(def) => self.eval_namespace(def, ctx),

            NodeKind::Return(value) => {
                let value = self.eval(value, ctx)?;
                Err(ControlAction::Return(value))
            }
            NodeKind::Yield(value) => {
                let value = self.eval(value, ctx)?;
                if self.truthy(&value, ctx)? {
                    Err(ControlAction::Return(value))
                } else {
                    Ok(Value::Undefined)
                }
            }
        }
    }

    fn eval_list(&mut self, nodes: &[Node], ctx: ContextId) -> EvalResult<Vec<Value>> {
        nodes.iter().map(|node| self.eval(node, ctx)).collect()
    }

    /// Truthiness, honouring `__bool__`.
    pub fn truthy(&mut self, value: &Value, ctx: ContextId) -> EvalResult<bool> {
        match self.overload(value, "__bool__") {
            Some(method) => {
                let result = self.call_function(&method, Some(value.clone()), &[], ctx, &Position::UNKNOWN)?;
                Ok(result.truthy())
            }
            None => Ok(value.truthy()),
        }
    }

    /// Display form, honouring `__str__`.
    pub fn display(&mut self, value: &Value, ctx: ContextId) -> EvalResult<String> {
        match self.overload(value, "__str__") {
            Some(method) => {
                let result = self.call_function(&method, Some(value.clone()), &[], ctx, &Position::UNKNOWN)?;
                Ok(result.to_string())
            }
            None => Ok(value.to_string()),
        }
    }

    /// Class method `name` of an instance, for operator dispatch.
    fn overload(&self, value: &Value, name: &str) -> Option<Rc<crate::value::Function>> {
        value.class().and_then(|class| class.find_method(name))
    }

    /// Whether `value` is acceptable where `expected` is declared.
    pub fn conforms(&self, expected: &Rc<Type>, value: &Value) -> bool {
        expected.includes(&self.types().of(value))
    }

    /// Fail with the standard type mismatch message unless `value` conforms.
    pub(crate) fn check_type(&self, expected: &Rc<Type>, value: &Value) -> Result<(), EsError> {
        if self.conforms(expected, value) {
            Ok(())
        } else {
            Err(EsError::expected_type(
                expected.name(),
                &value.type_name(),
                &value.to_string(),
            ))
        }
    }

    /// Evaluate a type annotation.
    pub(crate) fn eval_type(&mut self, node: &Node, ctx: ContextId) -> EvalResult<Rc<Type>> {
        match self.eval(node, ctx)? {
            Value::Type(ty) => Ok(ty),
            other => Err(EsError::type_error(format!("'{}' is not a type", other.repr()))
                .with_position(&node.position)
                .into()),
        }
    }

    pub(crate) fn primitive_type(&self, primitive: Primitive) -> Rc<Type> {
        Rc::clone(self.types().get(primitive))
    }
}

#[cfg(test)]
mod tests;
