use std::rc::Rc;

use es_ir::{FunctionDef, Name, Position};

use crate::context::{ContextId, ContextRef};
use crate::interpreter::{EvalResult, Interpreter};

use super::{Info, Type, Value};

/// Signature of host functions callable from scripts.
pub type NativeFn = fn(&mut Interpreter<'_>, NativeCall) -> EvalResult;

/// Everything a host function is called with.
pub struct NativeCall {
    /// Scope of the call site.
    pub ctx: ContextId,
    /// Receiver for method calls.
    pub this: Option<Value>,
    pub args: Vec<Value>,
    pub position: Position,
}

impl NativeCall {
    /// Argument `index`, or `undefined` past the end.
    pub fn arg(&self, index: usize) -> Value {
        self.args.get(index).cloned().unwrap_or_default()
    }
}

/// A parameter after its type annotation and default have been evaluated.
#[derive(Clone)]
pub struct ParamSpec {
    pub name: Name,
    pub ty: Option<Rc<Type>>,
    pub default: Option<Value>,
}

#[derive(Clone)]
pub(crate) struct UserFunction {
    pub def: Rc<FunctionDef>,
    pub params: Rc<[ParamSpec]>,
    pub return_type: Option<Rc<Type>>,
    /// Scope the function was created in; each call's frame nests in it.
    pub closure: ContextRef,
}

#[derive(Clone)]
pub(crate) enum FunctionKind {
    User(UserFunction),
    Native(NativeFn),
    /// `super` inside an `init`: runs the nearest constructor above this class
    /// on the same instance.
    SuperInit(Rc<Type>),
}

/// A callable value. `this` is set on functions produced by reading a method
/// off a value; method calls pass the receiver directly instead.
#[derive(Clone)]
pub struct Function {
    pub info: Info,
    pub(crate) kind: FunctionKind,
    pub(crate) this: Option<Value>,
}

impl Function {
    pub fn native(name: &str, description: &str, f: NativeFn) -> Self {
        Function {
            info: Info::named(name).with_description(description),
            kind: FunctionKind::Native(f),
            this: None,
        }
    }

    pub(crate) fn user(info: Info, user: UserFunction) -> Self {
        Function {
            info,
            kind: FunctionKind::User(user),
            this: None,
        }
    }

    pub(crate) fn super_init(parent: Rc<Type>, this: Value) -> Self {
        Function {
            info: Info::named("super"),
            kind: FunctionKind::SuperInit(parent),
            this: Some(this),
        }
    }

    /// Copy of this function with `this` fixed to `receiver`.
    #[must_use]
    pub fn bind(&self, receiver: Value) -> Function {
        Function {
            this: Some(receiver),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn this(&self) -> Option<&Value> {
        self.this.as_ref()
    }

    pub fn is_native(&self) -> bool {
        matches!(self.kind, FunctionKind::Native(_))
    }

    /// Two bindings of the same function to the same receiver.
    pub(crate) fn same_target(&self, other: &Function) -> bool {
        let same_code = match (&self.kind, &other.kind) {
            (FunctionKind::User(a), FunctionKind::User(b)) => {
                Rc::ptr_eq(&a.def, &b.def) && a.closure.id() == b.closure.id()
            }
            (FunctionKind::Native(a), FunctionKind::Native(b)) => *a as usize == *b as usize,
            _ => false,
        };
        same_code
            && match (&self.this, &other.this) {
                (Some(a), Some(b)) => a.equals(b),
                (None, None) => true,
                _ => false,
            }
    }
}
