//! Cycle collection for scopes.
//!
//! A function declared in a scope holds that scope through its closure, so a
//! call frame that declares a named function never loses its last handle.
//! The collector finds such islands by comparing the reference count of every
//! scope and shared value reachable from the arena with the references the
//! arena itself accounts for. Anything holding more than that is referenced
//! from outside and is a root. Scopes no root reaches are garbage.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::{ContextArena, ContextId, ContextRef};
use crate::shared::Heap;
use crate::value::{Function, FunctionKind, Namespace, Object, ParamSpec, Type, Value};

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
enum Key {
    Scope(ContextId),
    Shared(usize),
}

struct Node {
    /// Strong references in total.
    total: usize,
    /// Strong references found while walking the arena.
    internal: usize,
    /// Contents could not be inspected, so the node is treated as a root.
    pinned: bool,
    edges: Vec<usize>,
}

/// A shared value waiting to have its contents walked.
enum Item {
    Scope(ContextId),
    Array(Heap<Vec<Value>>),
    Object(Heap<Object>),
    Function(Rc<Function>),
    Params(Rc<[ParamSpec]>),
    Type(Rc<Type>),
    Namespace(Rc<Namespace>),
}

struct Walker<'a> {
    arena: &'a ContextArena,
    index: FxHashMap<Key, usize>,
    nodes: Vec<Node>,
    queue: Vec<(usize, Item)>,
}

impl Walker<'_> {
    /// Record an edge `from -> key`, returning the new node the first time
    /// `key` is seen.
    fn link(&mut self, from: usize, key: Key, total: usize) -> Option<usize> {
        let (to, fresh) = match self.index.get(&key) {
            Some(&to) => (to, false),
            None => {
                let to = self.nodes.len();
                self.nodes.push(Node {
                    total,
                    internal: 0,
                    pinned: false,
                    edges: Vec::new(),
                });
                self.index.insert(key, to);
                (to, true)
            }
        };
        self.nodes[to].internal += 1;
        self.nodes[from].edges.push(to);
        fresh.then_some(to)
    }

    fn scope(&mut self, from: usize, handle: &ContextRef) {
        self.link(from, Key::Scope(handle.id()), 0);
    }

    fn shared<T: ?Sized>(&mut self, from: usize, rc: &Rc<T>, item: fn(Rc<T>) -> Item) {
        let key = Key::Shared(Rc::as_ptr(rc).cast::<()>() as usize);
        if let Some(to) = self.link(from, key, Rc::strong_count(rc)) {
            self.queue.push((to, item(Rc::clone(rc))));
        }
    }

    fn heap<T>(&mut self, from: usize, heap: &Heap<T>, item: fn(Heap<T>) -> Item) {
        if let Some(to) = self.link(from, Key::Shared(heap.addr()), heap.strong_count()) {
            self.queue.push((to, item(heap.clone())));
        }
    }

    fn value(&mut self, from: usize, value: &Value) {
        match value {
            Value::Array(items) => self.heap(from, items, Item::Array),
            Value::Object(obj) => self.heap(from, obj, Item::Object),
            Value::Function(f) => self.shared(from, f, Item::Function),
            Value::Type(ty) => self.shared(from, ty, Item::Type),
            Value::Namespace(ns) => self.shared(from, ns, Item::Namespace),
            Value::Undefined
            | Value::Number(_)
            | Value::Boolean(_)
            | Value::String(_)
            | Value::Error(_) => {}
        }
    }

    fn expand(&mut self, at: usize, item: Item) {
        match item {
            Item::Scope(id) => {
                let arena = self.arena;
                let Ok(context) = arena.get(id) else {
                    self.nodes[at].pinned = true;
                    return;
                };
                if let Some(parent) = &context.parent {
                    self.scope(at, parent);
                }
                for symbol in context.symbols.values() {
                    self.value(at, &symbol.value);
                    if let Some(ty) = &symbol.ty {
                        self.shared(at, ty, Item::Type);
                    }
                }
            }
            Item::Array(items) => match items.try_borrow() {
                Ok(items) => {
                    for item in items.iter() {
                        self.value(at, item);
                    }
                }
                Err(_) => self.nodes[at].pinned = true,
            },
            Item::Object(obj) => match obj.try_borrow() {
                Ok(obj) => {
                    for field in obj.fields.values() {
                        self.value(at, field);
                    }
                    if let Some(class) = &obj.class {
                        self.shared(at, class, Item::Type);
                    }
                }
                Err(_) => self.nodes[at].pinned = true,
            },
            Item::Function(f) => {
                if let Some(this) = &f.this {
                    self.value(at, this);
                }
                match &f.kind {
                    FunctionKind::User(user) => {
                        self.scope(at, &user.closure);
                        self.shared(at, &user.params, Item::Params);
                        if let Some(ty) = &user.return_type {
                            self.shared(at, ty, Item::Type);
                        }
                    }
                    FunctionKind::SuperInit(parent) => self.shared(at, parent, Item::Type),
                    FunctionKind::Native(_) => {}
                }
            }
            Item::Params(params) => {
                for param in params.iter() {
                    if let Some(ty) = &param.ty {
                        self.shared(at, ty, Item::Type);
                    }
                    if let Some(default) = &param.default {
                        self.value(at, default);
                    }
                }
            }
            Item::Type(ty) => {
                if let Some(parent) = ty.extends() {
                    self.shared(at, parent, Item::Type);
                }
                for method in ty.class_functions() {
                    self.shared(at, method, Item::Function);
                }
                for declared in ty.declared_types() {
                    self.shared(at, declared, Item::Type);
                }
                if let Some(fields) = ty.static_fields() {
                    match fields.try_borrow() {
                        Ok(fields) => {
                            for field in fields.values() {
                                self.value(at, &field.value);
                                if let Some(declared) = &field.ty {
                                    self.shared(at, declared, Item::Type);
                                }
                            }
                        }
                        Err(_) => self.nodes[at].pinned = true,
                    }
                }
            }
            Item::Namespace(ns) => self.scope(at, &ns.context),
        }
    }
}

/// Live scopes that nothing outside the arena can reach.
pub(super) fn unreachable_scopes(arena: &ContextArena) -> Vec<ContextId> {
    let mut walker = Walker {
        arena,
        index: FxHashMap::default(),
        nodes: Vec::new(),
        queue: Vec::new(),
    };
    for (index, slot) in arena.slots.iter().enumerate() {
        if slot.context.is_none() {
            continue;
        }
        let id = ContextId {
            index: u32::try_from(index).unwrap_or(u32::MAX),
            generation: slot.generation,
        };
        let at = walker.nodes.len();
        walker.nodes.push(Node {
            total: slot.refs as usize,
            internal: 0,
            pinned: false,
            edges: Vec::new(),
        });
        walker.index.insert(Key::Scope(id), at);
        walker.queue.push((at, Item::Scope(id)));
    }
    while let Some((at, item)) = walker.queue.pop() {
        walker.expand(at, item);
    }

    let nodes = walker.nodes;
    let mut live = vec![false; nodes.len()];
    let mut stack: Vec<usize> = (0..nodes.len())
        .filter(|&i| nodes[i].pinned || nodes[i].total > nodes[i].internal)
        .collect();
    while let Some(i) = stack.pop() {
        if live[i] {
            continue;
        }
        live[i] = true;
        stack.extend(nodes[i].edges.iter().copied().filter(|&j| !live[j]));
    }

    walker
        .index
        .into_iter()
        .filter_map(|(key, i)| match key {
            Key::Scope(id) if !live[i] => Some(id),
            _ => None,
        })
        .collect()
}
