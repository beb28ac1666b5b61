use std::cell::RefCell;
use std::rc::Rc;

use crate::map::OrderedMap;
use crate::shared::{Heap, WeakHeap};

use super::{Function, Info, Object, Value};

/// The builtin types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Any,
    Number,
    String,
    Boolean,
    Array,
    Object,
    Function,
    Type,
    Undefined,
    Error,
    Namespace,
}

impl Primitive {
    pub const ALL: [Primitive; 11] = [
        Primitive::Any,
        Primitive::Number,
        Primitive::String,
        Primitive::Boolean,
        Primitive::Array,
        Primitive::Object,
        Primitive::Function,
        Primitive::Type,
        Primitive::Undefined,
        Primitive::Error,
        Primitive::Namespace,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Any => "Any",
            Primitive::Number => "Number",
            Primitive::String => "String",
            Primitive::Boolean => "Boolean",
            Primitive::Array => "Array",
            Primitive::Object => "Object",
            Primitive::Function => "Function",
            Primitive::Type => "Type",
            Primitive::Undefined => "Undefined",
            Primitive::Error => "Error",
            Primitive::Namespace => "Namespace",
        }
    }

    /// Extra global names bound to the same type.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Primitive::Any | Primitive::Namespace => &[],
            Primitive::Number => &["Num", "number"],
            Primitive::String => &["Str", "string"],
            Primitive::Boolean => &["Bool", "bool", "boolean"],
            Primitive::Array => &["Arr", "array"],
            Primitive::Object => &["Obj", "object"],
            Primitive::Function => &["Func", "function"],
            Primitive::Type => &["type"],
            Primitive::Undefined => &["Null"],
            Primitive::Error => &["Err", "error"],
        }
    }

    fn description(self) -> &'static str {
        match self {
            Primitive::Any => "Matches every value",
            Primitive::Number => "64-bit floating point number",
            Primitive::String => "Immutable text",
            Primitive::Boolean => "true or false",
            Primitive::Array => "Ordered, growable list of values",
            Primitive::Object => "String-keyed record; the base of every class",
            Primitive::Function => "Callable value",
            Primitive::Type => "A type, builtin or class",
            Primitive::Undefined => "The absent value",
            Primitive::Error => "A caught or constructed error",
            Primitive::Namespace => "Named group of symbols",
        }
    }
}

/// A static field and the type it was declared with.
pub(crate) struct StaticField {
    pub value: Value,
    pub ty: Option<Rc<Type>>,
}

/// An instance property every constructed object must hold.
pub(crate) struct Property {
    pub name: Rc<str>,
    pub ty: Option<Rc<Type>>,
}

pub(crate) struct ClassBody {
    pub methods: OrderedMap<Rc<str>, Rc<Function>>,
    pub init: Option<Rc<Function>>,
    pub static_methods: OrderedMap<Rc<str>, Rc<Function>>,
    pub static_fields: RefCell<OrderedMap<Rc<str>, StaticField>>,
    pub properties: Vec<Property>,
    pub is_abstract: bool,
    instances: RefCell<Vec<WeakHeap<Object>>>,
}

pub(crate) enum TypeKind {
    Primitive(Primitive),
    Class(ClassBody),
}

/// A builtin type or a class.
///
/// Types are immutable once built and `extends` is fixed at creation, so an
/// inheritance chain always ends.
pub struct Type {
    pub info: Info,
    pub(crate) kind: TypeKind,
    pub(crate) extends: Option<Rc<Type>>,
}

impl Type {
    fn primitive(primitive: Primitive) -> Self {
        Type {
            info: Info::named(primitive.name()).with_description(primitive.description()),
            kind: TypeKind::Primitive(primitive),
            extends: None,
        }
    }

    pub(crate) fn class(
        info: Info,
        extends: Rc<Type>,
        init: Option<Rc<Function>>,
        methods: OrderedMap<Rc<str>, Rc<Function>>,
    ) -> Self {
        Type {
            info,
            kind: TypeKind::Class(ClassBody {
                methods,
                init,
                static_methods: OrderedMap::new(),
                static_fields: RefCell::new(OrderedMap::new()),
                properties: Vec::new(),
                is_abstract: false,
                instances: RefCell::new(Vec::new()),
            }),
            extends: Some(extends),
        }
    }

    pub(crate) fn with_statics(
        mut self,
        methods: OrderedMap<Rc<str>, Rc<Function>>,
        fields: OrderedMap<Rc<str>, StaticField>,
    ) -> Self {
        if let TypeKind::Class(body) = &mut self.kind {
            body.static_methods = methods;
            body.static_fields = RefCell::new(fields);
        }
        self
    }

    pub(crate) fn with_properties(mut self, properties: Vec<Property>) -> Self {
        if let TypeKind::Class(body) = &mut self.kind {
            body.properties = properties;
        }
        self
    }

    pub(crate) fn into_abstract(mut self) -> Self {
        if let TypeKind::Class(body) = &mut self.kind {
            body.is_abstract = true;
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn extends(&self) -> Option<&Rc<Type>> {
        self.extends.as_ref()
    }

    pub fn primitive_kind(&self) -> Option<Primitive> {
        match self.kind {
            TypeKind::Primitive(p) => Some(p),
            TypeKind::Class(_) => None,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class(_))
    }

    pub fn is_any(&self) -> bool {
        self.primitive_kind() == Some(Primitive::Any)
    }

    fn body(&self) -> Option<&ClassBody> {
        match &self.kind {
            TypeKind::Class(body) => Some(body),
            TypeKind::Primitive(_) => None,
        }
    }

    /// Abstract classes cannot be called, only extended.
    pub fn is_abstract(&self) -> bool {
        self.body().is_some_and(|body| body.is_abstract)
    }

    /// Methods, static methods and `init` declared on this class itself.
    pub(crate) fn class_functions(&self) -> impl Iterator<Item = &Rc<Function>> {
        self.body().into_iter().flat_map(|body| {
            body.methods
                .values()
                .chain(body.static_methods.values())
                .chain(body.init.as_ref())
        })
    }

    /// Types declared for this class's own properties.
    pub(crate) fn declared_types(&self) -> impl Iterator<Item = &Rc<Type>> {
        self.body()
            .into_iter()
            .flat_map(|body| body.properties.iter().filter_map(|p| p.ty.as_ref()))
    }

    pub(crate) fn static_fields(&self) -> Option<&RefCell<OrderedMap<Rc<str>, StaticField>>> {
        self.body().map(|body| &body.static_fields)
    }

    /// Static method or field `key` on this class or the nearest ancestor
    /// declaring it.
    pub(crate) fn find_static(self: &Rc<Self>, key: &str) -> Option<Value> {
        let mut current = Some(self);
        while let Some(ty) = current {
            if let Some(body) = ty.body() {
                if let Some(method) = body.static_methods.get(key) {
                    return Some(Value::Function(Rc::clone(method)));
                }
                if let Some(field) = body.static_fields.borrow().get(key) {
                    return Some(field.value.clone());
                }
            }
            current = ty.extends.as_ref();
        }
        None
    }

    /// The class declaring static field `key`, with the field's declared type.
    pub(crate) fn static_field_owner(
        self: &Rc<Self>,
        key: &str,
    ) -> Option<(Rc<Type>, Option<Rc<Type>>)> {
        let mut current = Some(self);
        while let Some(ty) = current {
            if let Some(body) = ty.body() {
                if let Some(field) = body.static_fields.borrow().get(key) {
                    return Some((Rc::clone(ty), field.ty.clone()));
                }
            }
            current = ty.extends.as_ref();
        }
        None
    }

    /// Replace the value of this class's own static field `key`.
    pub(crate) fn store_static(&self, key: &str, value: Value) {
        let Some(fields) = self.static_fields() else {
            return;
        };
        let old = fields
            .borrow_mut()
            .get_mut(key)
            .map(|field| std::mem::replace(&mut field.value, value));
        drop(old);
    }

    /// Typed properties of this class and its ancestors. A redeclaration
    /// nearer the instance's class wins.
    pub(crate) fn typed_properties(self: &Rc<Self>) -> Vec<(Rc<str>, Rc<Type>)> {
        let mut seen: Vec<&str> = Vec::new();
        let mut typed = Vec::new();
        let mut current = Some(self);
        while let Some(ty) = current {
            for property in ty.body().into_iter().flat_map(|body| &body.properties) {
                if seen.contains(&&*property.name) {
                    continue;
                }
                seen.push(&property.name);
                if let Some(expected) = &property.ty {
                    typed.push((Rc::clone(&property.name), Rc::clone(expected)));
                }
            }
            current = ty.extends.as_ref();
        }
        typed
    }

    /// Names of the static methods and fields declared on this class itself.
    pub fn static_names(&self) -> Vec<Rc<str>> {
        self.body()
            .map(|body| {
                body.static_methods
                    .keys()
                    .chain(body.static_fields.borrow().keys())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether `ancestor` is `self` or somewhere up its `extends` chain.
    pub fn descends_from(self: &Rc<Self>, ancestor: &Rc<Type>) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if Rc::ptr_eq(ty, ancestor) {
                return true;
            }
            current = ty.extends.as_ref();
        }
        false
    }

    /// Type compatibility. `Any` on either side matches, and otherwise
    /// either type may sit on the other's inheritance chain.
    pub fn includes(self: &Rc<Self>, other: &Rc<Type>) -> bool {
        self.is_any() || other.is_any() || other.descends_from(self) || self.descends_from(other)
    }

    /// Method `key` on this class or the nearest ancestor defining it.
    pub(crate) fn find_method(self: &Rc<Self>, key: &str) -> Option<Rc<Function>> {
        let mut current = Some(self);
        while let Some(ty) = current {
            if let Some(method) = ty.body().and_then(|body| body.methods.get(key)) {
                return Some(Rc::clone(method));
            }
            current = ty.extends.as_ref();
        }
        None
    }

    /// Nearest `init`, searching from this class upward, with its owning class.
    pub(crate) fn find_init(self: &Rc<Self>) -> Option<(Rc<Type>, Rc<Function>)> {
        let mut current = Some(self);
        while let Some(ty) = current {
            if let Some(init) = ty.body().and_then(|body| body.init.as_ref()) {
                return Some((Rc::clone(ty), Rc::clone(init)));
            }
            current = ty.extends.as_ref();
        }
        None
    }

    /// Method names of this class and its ancestors, nearest first.
    pub fn method_names(self: &Rc<Self>) -> Vec<Rc<str>> {
        let mut names: Vec<Rc<str>> = Vec::new();
        let mut current = Some(self);
        while let Some(ty) = current {
            if let Some(body) = ty.body() {
                for key in body.methods.keys() {
                    if !names.contains(key) {
                        names.push(Rc::clone(key));
                    }
                }
            }
            current = ty.extends.as_ref();
        }
        names
    }

    pub(crate) fn register_instance(&self, instance: &Heap<Object>) {
        if let Some(body) = self.body() {
            let mut instances = body.instances.borrow_mut();
            instances.retain(WeakHeap::is_alive);
            instances.push(instance.downgrade());
        }
    }

    /// Live instances created directly from this class.
    pub fn instances(&self) -> Vec<Value> {
        self.body()
            .map(|body| {
                body.instances
                    .borrow()
                    .iter()
                    .filter_map(WeakHeap::upgrade)
                    .map(Value::Object)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One shared `Rc<Type>` per builtin, so identity comparisons work.
pub struct BuiltinTypes {
    types: Vec<Rc<Type>>,
}

impl BuiltinTypes {
    pub fn new() -> Self {
        BuiltinTypes {
            types: Primitive::ALL
                .iter()
                .map(|&p| Rc::new(Type::primitive(p)))
                .collect(),
        }
    }

    pub fn get(&self, primitive: Primitive) -> &Rc<Type> {
        // `types` is built from `Primitive::ALL`, which lists variants in
        // declaration order.
        &self.types[primitive as usize]
    }

    /// The type of `value`: its class for instances.
    pub fn of(&self, value: &Value) -> Rc<Type> {
        value
            .class()
            .unwrap_or_else(|| Rc::clone(self.get(value.primitive())))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Type>> {
        self.types.iter()
    }
}

impl Default for BuiltinTypes {
    fn default() -> Self {
        Self::new()
    }
}
