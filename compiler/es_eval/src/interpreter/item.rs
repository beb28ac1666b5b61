//! Function, class and namespace definitions, and namespace member access.
//!
//! Class members all close over one scope nested in the defining scope.
//! Static field initialisers run there once, when the class is built.

use std::rc::Rc;

use es_diagnostic::EsError;
use es_ir::{ClassDef, FunctionDef, NamespaceDef, Position};

use super::{EvalResult, Interpreter};
use crate::context::{ContextError, ContextId, Symbol};
use crate::map::OrderedMap;
use crate::value::{
    Function, Info, Namespace, ParamSpec, Primitive, Property, StaticField, Type, UserFunction,
    Value,
};

impl Interpreter<'_> {
    pub(super) fn eval_function(&mut self, def: &Rc<FunctionDef>, ctx: ContextId) -> EvalResult {
        let function = Rc::new(self.make_function(def, ctx)?);
        let value = Value::Function(function);
        if def.declares {
            self.declare_item(def.name, value.clone(), ctx)?;
        }
        Ok(value)
    }

    /// Build a closure over `ctx`. Parameter types, defaults and the return
    /// type are evaluated now, in `ctx`.
    fn make_function(&mut self, def: &Rc<FunctionDef>, ctx: ContextId) -> EvalResult<Function> {
        let mut params = Vec::with_capacity(def.params.len());
        for param in &def.params {
            let ty = match &param.ty {
                Some(node) => Some(self.eval_type(node, ctx)?),
                None => None,
            };
            let default = match &param.default {
                Some(node) => Some(self.eval(node, ctx)?),
                None => None,
            };
            params.push(ParamSpec {
                name: param.name,
                ty,
                default,
            });
        }
        let return_type = match &def.return_type {
            Some(node) => Some(self.eval_type(node, ctx)?),
            None => None,
        };
        let name = def
            .name
            .map_or("(anonymous)", |name| self.interner().lookup(name));
        Ok(Function::user(
            self.item_info(name, &def.position),
            UserFunction {
                def: Rc::clone(def),
                params: params.into(),
                return_type,
                closure: self.contexts().retain(ctx)?,
            },
        ))
    }

    pub(super) fn eval_class(&mut self, def: &Rc<ClassDef>, ctx: ContextId) -> EvalResult {
        let extends = match &def.extends {
            Some(node) => match self.eval(node, ctx)? {
                Value::Type(parent) => parent,
                other => {
                    return Err(EsError::type_error(format!(
                        "Classes can only extend a Type, got '{}'",
                        other.repr()
                    ))
                    .with_position(&node.position)
                    .into())
                }
            },
            None => self.primitive_type(Primitive::Object),
        };

        // Methods close over a scope of their own nested in the defining one.
        let body = self.contexts().create(Some(ctx), None)?;
        let mut methods = OrderedMap::new();
        for method in &def.methods {
            let function = self.make_function(method, body.id())?;
            methods.insert(Rc::from(function.name()), Rc::new(function));
        }
        let init = match &def.init {
            Some(init) => Some(Rc::new(self.make_function(init, body.id())?)),
            None => None,
        };
        let mut static_methods = OrderedMap::new();
        for method in &def.static_methods {
            let function = self.make_function(method, body.id())?;
            static_methods.insert(Rc::from(function.name()), Rc::new(function));
        }
        let mut static_fields = OrderedMap::new();
        for field in &def.static_fields {
            let ty = match &field.ty {
                Some(node) => Some(self.eval_type(node, body.id())?),
                None => None,
            };
            let value = match &field.value {
                Some(node) => self.eval(node, body.id())?,
                None => Value::Undefined,
            };
            if let (Some(ty), Some(_)) = (&ty, &field.value) {
                self.check_type(ty, &value)?;
            }
            let key: Rc<str> = Rc::from(self.interner().lookup(field.name));
            static_fields.insert(key, StaticField { value, ty });
        }
        let mut properties = Vec::with_capacity(def.properties.len());
        for property in &def.properties {
            let ty = match &property.ty {
                Some(node) => Some(self.eval_type(node, body.id())?),
                None => None,
            };
            let name: Rc<str> = Rc::from(self.interner().lookup(property.name));
            properties.push(Property { name, ty });
        }

        let name = def
            .name
            .map_or("(anonymous)", |name| self.interner().lookup(name));
        let mut class = Type::class(self.item_info(name, &def.position), extends, init, methods)
            .with_statics(static_methods, static_fields)
            .with_properties(properties);
        if def.is_abstract {
            class = class.into_abstract();
        }
        let value = Value::Type(Rc::new(class));
        if def.declares {
            self.declare_item(def.name, value.clone(), ctx)?;
        }
        Ok(value)
    }

    /// Run the body in a child scope and expose that scope as a namespace.
    pub(super) fn eval_namespace(&mut self, def: &Rc<NamespaceDef>, ctx: ContextId) -> EvalResult {
        let scope = self.contexts().create(Some(ctx), None)?;
        for statement in &def.body {
            self.eval(statement, scope.id())?;
        }
        let name = def
            .name
            .map_or("(anonymous)", |name| self.interner().lookup(name));
        let namespace = Namespace::new(Info::named(name), def.mutable, scope);
        let value = Value::Namespace(Rc::new(namespace));
        if def.declares {
            self.declare_item(def.name, value.clone(), ctx)?;
        }
        Ok(value)
    }

    fn declare_item(&self, name: Option<es_ir::Name>, value: Value, ctx: ContextId) -> EvalResult<()> {
        if let Some(name) = name {
            self.contexts().declare(ctx, name, Symbol::constant(value))?;
        }
        Ok(())
    }

    fn item_info(&self, name: &str, position: &Position) -> Info {
        Info::named(name).with_file(position.file.clone())
    }

    /// Read an accessible member; missing members are `undefined`.
    pub(crate) fn namespace_get(&self, ns: &Namespace, key: &str) -> EvalResult {
        let Some(name) = self.interner().get(key) else {
            return Ok(Value::Undefined);
        };
        match self.contexts().own_symbol(ns.context.id(), name)? {
            Some(symbol) if !symbol.accessible => {
                Err(ContextError::Inaccessible(self.interner().lookup(name)).into())
            }
            Some(symbol) => Ok(symbol.value),
            None => Ok(Value::Undefined),
        }
    }

    pub(crate) fn namespace_has(&self, ns: &Namespace, key: &str) -> EvalResult<bool> {
        let Some(name) = self.interner().get(key) else {
            return Ok(false);
        };
        Ok(self
            .contexts()
            .own_symbol(ns.context.id(), name)?
            .is_some_and(|symbol| symbol.accessible))
    }

    /// Write through a namespace. Only mutable namespaces accept writes, and
    /// only to existing, accessible, non-constant members.
    pub(crate) fn namespace_set(&self, ns: &Namespace, key: &str, value: Value) -> EvalResult<()> {
        if !ns.is_mutable() {
            return Err(EsError::type_error(format!(
                "Cannot set '{key}' on immutable namespace '{}'",
                ns.name()
            ))
            .into());
        }
        let store = self.contexts();
        let symbol = match self.interner().get(key) {
            Some(name) => store.own_symbol(ns.context.id(), name)?.map(|symbol| (name, symbol)),
            None => None,
        };
        let Some((name, symbol)) = symbol else {
            return Err(EsError::reference(key).into());
        };
        if !symbol.accessible {
            return Err(ContextError::Inaccessible(self.interner().lookup(name)).into());
        }
        if let Some(ty) = &symbol.ty {
            self.check_type(ty, &value)?;
        }
        store.rebind(ns.context.id(), name, value)?;
        Ok(())
    }
}
