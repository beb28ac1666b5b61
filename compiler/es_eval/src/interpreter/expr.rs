//! Operators, literals, and member/index reads and writes.

use std::rc::Rc;

use es_diagnostic::EsError;
use es_ir::{BinaryOp, Node, ObjectEntry, ObjectKey, Position, UnaryOp};

use super::{EvalResult, Interpreter};
use crate::context::ContextId;
use crate::value::{ops, Fields, Function, Primitive, Type, Value};

/// Result of resolving `base.key`.
pub(crate) enum Member {
    /// A stored or computed value.
    Field(Value),
    /// A class or builtin method, still unbound.
    Method(Rc<Function>),
}

impl Interpreter<'_> {
    pub(super) fn eval_object(&mut self, entries: &[ObjectEntry], ctx: ContextId) -> EvalResult {
        let mut fields = Fields::new();
        for entry in entries {
            let key: Rc<str> = match &entry.key {
                ObjectKey::Static(key) => Rc::clone(key),
                ObjectKey::Computed(node) => match self.eval(node, ctx)? {
                    Value::String(key) => key,
                    Value::Number(n) => Rc::from(Value::Number(n).to_string()),
                    other => {
                        return Err(EsError::type_error(format!(
                            "Object keys must be strings, got type '{}'",
                            other.type_name()
                        ))
                        .with_position(&node.position)
                        .into())
                    }
                },
            };
            let value = self.eval(&entry.value, ctx)?;
            fields.insert(key, value);
        }
        Ok(Value::object(fields))
    }

    pub(super) fn eval_unary(&mut self, op: UnaryOp, operand: &Node, ctx: ContextId) -> EvalResult {
        let value = self.eval(operand, ctx)?;
        if op == UnaryOp::Not {
            return Ok(Value::Boolean(!self.truthy(&value, ctx)?));
        }
        Ok(ops::unary(op, &value)?)
    }

    /// Apply a binary operator, dispatching to `__add__` and friends on instances.
    /// On instances `<=` and `>=` combine the strict comparison with `==`.
    pub fn binary(
        &mut self,
        op: BinaryOp,
        left: Value,
        right: Value,
        ctx: ContextId,
        position: &Position,
    ) -> EvalResult {
        if let (BinaryOp::LtEq | BinaryOp::GtEq, Some(_)) = (op, left.class()) {
            let strict = if op == BinaryOp::LtEq { BinaryOp::Lt } else { BinaryOp::Gt };
            let ordered = self.binary(strict, left.clone(), right.clone(), ctx, position)?;
            if self.truthy(&ordered, ctx)? {
                return Ok(Value::Boolean(true));
            }
            let equal = self.binary(BinaryOp::Eq, left, right, ctx, position)?;
            return Ok(Value::Boolean(self.truthy(&equal, ctx)?));
        }
        let overload = match op {
            BinaryOp::NotEq => BinaryOp::Eq.overload_method(),
            _ => op.overload_method(),
        };
        if let Some(method) = overload.and_then(|name| self.overload(&left, name)) {
            let result = self.call_function(&method, Some(left), &[right], ctx, position)?;
            return Ok(if op == BinaryOp::NotEq {
                Value::Boolean(!result.truthy())
            } else {
                result
            });
        }
        match op {
            BinaryOp::And => {
                let both = self.truthy(&left, ctx)? & self.truthy(&right, ctx)?;
                Ok(Value::Boolean(both))
            }
            BinaryOp::Or => {
                let either = self.truthy(&left, ctx)? | self.truthy(&right, ctx)?;
                Ok(Value::Boolean(either))
            }
            BinaryOp::Add
                if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) =>
            {
                let mut text = self.display(&left, ctx)?;
                text.push_str(&self.display(&right, ctx)?);
                Ok(Value::string(text))
            }
            BinaryOp::In => match &right {
                Value::Namespace(ns) => match &left {
                    Value::String(key) => Ok(Value::Boolean(self.namespace_has(ns, key)?)),
                    other => Err(EsError::expected_type(
                        Primitive::String.name(),
                        &other.type_name(),
                        &other.repr(),
                    )
                    .into()),
                },
                _ => Ok(ops::binary(op, &left, &right)?),
            },
            _ => Ok(ops::binary(op, &left, &right)?),
        }
    }

    /// Resolve `base.key`: own fields, then class methods up the `extends`
    /// chain, then builtin properties.
    pub(crate) fn lookup_member(&mut self, base: &Value, key: &str) -> EvalResult<Member> {
        let rt = self.runtime();
        let builtin = |primitive: Primitive| {
            rt.builtin_method(primitive, key)
                .map_or(Member::Field(Value::Undefined), Member::Method)
        };
        let member = match base {
            Value::Object(obj) => {
                let (field, class) = {
                    let obj = obj.borrow();
                    (obj.fields.get(key).cloned(), obj.class.clone())
                };
                if let Some(field) = field {
                    return Ok(Member::Field(field));
                }
                if let Some(method) = class.as_ref().and_then(|class| class.find_method(key)) {
                    return Ok(Member::Method(method));
                }
                if key == "constructor" {
                    let class = class.unwrap_or_else(|| self.primitive_type(Primitive::Object));
                    return Ok(Member::Field(Value::Type(class)));
                }
                builtin(Primitive::Object)
            }
            Value::Array(items) if key == "length" => {
                Member::Field(Value::Number(items.borrow().len() as f64))
            }
            Value::String(s) if key == "length" => Member::Field(Value::Number(s.chars().count() as f64)),
            Value::Type(ty) => match key {
                "name" => Member::Field(Value::String(Rc::clone(&ty.info.name))),
                "extends" => Member::Field(ty.extends().map_or(Value::Undefined, |parent| {
                    Value::Type(Rc::clone(parent))
                })),
                "instances" => Member::Field(Value::array(ty.instances())),
                _ => Member::Field(
                    ty.find_static(key)
                        .or_else(|| ty.find_method(key).map(Value::Function))
                        .unwrap_or_default(),
                ),
            },
            Value::Namespace(ns) => Member::Field(self.namespace_get(ns, key)?),
            Value::Error(e) => match key {
                "name" => Member::Field(Value::string(e.name())),
                "details" => Member::Field(Value::string(e.details.as_str())),
                _ => Member::Field(Value::Undefined),
            },
            Value::Function(f) if key == "name" => Member::Field(Value::String(Rc::clone(&f.info.name))),
            Value::Undefined => {
                return Err(EsError::type_error(format!(
                    "Cannot read property '{key}' of undefined"
                ))
                .into())
            }
            other => builtin(other.primitive()),
        };
        Ok(member)
    }

    /// `base.key` as a value; methods come back bound to `base`.
    pub fn get_member(&mut self, base: &Value, key: &str) -> EvalResult {
        Ok(match self.lookup_member(base, key)? {
            Member::Field(value) => value,
            Member::Method(method) => Value::function(method.bind(base.clone())),
        })
    }

    pub fn get_index(&mut self, base: &Value, index: &Value) -> EvalResult {
        if let Value::String(key) = index {
            let key = Rc::clone(key);
            return self.get_member(base, &key);
        }
        match base.as_indexable() {
            Some(indexable) => Ok(indexable.get_index(index)?),
            None => Err(cannot_index(base).into()),
        }
    }

    pub fn set_member(&mut self, base: &Value, key: &str, value: Value) -> EvalResult<()> {
        match base {
            Value::Object(obj) => {
                let old = obj.borrow_mut().fields.insert(Rc::from(key), value);
                drop(old);
                Ok(())
            }
            Value::Namespace(ns) => self.namespace_set(ns, key, value),
            Value::Type(ty) => self.set_static(ty, key, value),
            other => Err(EsError::type_error(format!(
                "Cannot set property '{key}' of {}",
                other.type_name()
            ))
            .into()),
        }
    }

    /// Only static fields a class declares can be assigned through it.
    fn set_static(&self, ty: &Rc<Type>, key: &str, value: Value) -> EvalResult<()> {
        let Some((owner, declared)) = ty.static_field_owner(key) else {
            return Err(EsError::type_error(format!(
                "Class '{}' has no static field '{key}'",
                ty.name()
            ))
            .into());
        };
        if let Some(declared) = &declared {
            self.check_type(declared, &value)?;
        }
        owner.store_static(key, value);
        Ok(())
    }

    pub fn set_index(&mut self, base: &Value, index: &Value, value: Value) -> EvalResult<()> {
        match (base, index) {
            (Value::Namespace(ns), Value::String(key)) => return self.namespace_set(ns, key, value),
            (Value::Type(ty), Value::String(key)) => return self.set_static(ty, key, value),
            _ => {}
        }
        match base.as_indexable() {
            Some(indexable) => Ok(indexable.set_index(index, value)?),
            None => Err(EsError::type_error(format!(
                "Cannot assign to an index of {}",
                base.type_name()
            ))
            .into()),
        }
    }
}

#[cold]
fn cannot_index(base: &Value) -> EsError {
    EsError::type_error(format!("Cannot index into {}", base.type_name()))
}
