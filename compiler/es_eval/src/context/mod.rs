//! Lexical scopes.
//!
//! Every scope (module body, call frame, loop iteration, class body) is a
//! `Context` stored in an arena owned by the runtime's [`ContextStore`] and
//! addressed by a generation-checked [`ContextId`]. Ownership is expressed with
//! [`ContextRef`] handles: a child holds one for its parent, a closure holds one
//! for the scope it was created in, and the interpreter holds one for each frame
//! it is executing. When the last handle goes away the slot is freed and its id
//! goes stale.
//!
//! Handles can be dropped while the arena is borrowed (a symbol's old value may
//! own the last closure over some scope). Those releases are queued and applied
//! by the next store operation.
//!
//! Handles alone cannot free a scope that reaches itself, as when a call frame
//! declares a named function. [`ContextStore::collect_cycles`] clears such
//! scopes; it runs after every top-level run and whenever the arena doubles.

mod collect;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::path::Path;
use std::rc::{Rc, Weak};

use es_diagnostic::EsError;
use es_ir::{Name, SharedInterner};

use crate::map::OrderedMap;
use crate::value::{Type, Value};

/// Generation-checked index of a scope in the arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContextId {
    index: u32,
    generation: u32,
}

/// A bound name.
#[derive(Clone)]
pub struct Symbol {
    pub value: Value,
    pub constant: bool,
    /// `false` for `local` symbols, which namespaces do not expose.
    pub accessible: bool,
    /// Declared type, checked on every rebinding.
    pub ty: Option<Rc<Type>>,
}

impl Symbol {
    pub fn variable(value: Value) -> Self {
        Symbol {
            value,
            constant: false,
            accessible: true,
            ty: None,
        }
    }

    pub fn constant(value: Value) -> Self {
        Symbol {
            constant: true,
            ..Symbol::variable(value)
        }
    }

    #[must_use]
    pub fn with_type(mut self, ty: Option<Rc<Type>>) -> Self {
        self.ty = ty;
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.accessible = false;
        self
    }
}

/// Scope-level failures. Names are already resolved to text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("Symbol '{0}' already exists, and cannot be redeclared")]
    AlreadyDeclared(&'static str),
    #[error("{0} is not defined")]
    Undefined(&'static str),
    #[error("Cannot assign to constant '{0}'")]
    Constant(&'static str),
    #[error("Symbol '{0}' is not accessible")]
    Inaccessible(&'static str),
    #[error("scope is no longer alive")]
    Stale,
}

impl From<ContextError> for EsError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::AlreadyDeclared(_) => EsError::invalid_syntax(err.to_string()),
            ContextError::Undefined(name) => EsError::reference(name),
            ContextError::Constant(_) | ContextError::Inaccessible(_) => {
                EsError::type_error(err.to_string())
            }
            ContextError::Stale => EsError::invalid_operation(err.to_string()),
        }
    }
}

struct Context {
    symbols: OrderedMap<Name, Symbol>,
    parent: Option<ContextRef>,
    path: Option<Rc<Path>>,
    initialised: bool,
}

struct Slot {
    generation: u32,
    refs: u32,
    context: Option<Context>,
}

/// Slot storage. Never runs script-visible drops itself: anything it frees is
/// handed back to the caller.
#[derive(Default)]
struct ContextArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl ContextArena {
    fn alloc(&mut self, context: Context) -> ContextId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.refs = 1;
            slot.context = Some(context);
            return ContextId {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            refs: 1,
            context: Some(context),
        });
        ContextId {
            index,
            generation: 0,
        }
    }

    fn slot(&self, id: ContextId) -> Option<&Slot> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation && slot.context.is_some())
    }

    fn get(&self, id: ContextId) -> Result<&Context, ContextError> {
        self.slot(id)
            .and_then(|slot| slot.context.as_ref())
            .ok_or(ContextError::Stale)
    }

    fn get_mut(&mut self, id: ContextId) -> Result<&mut Context, ContextError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.context.as_mut())
            .ok_or(ContextError::Stale)
    }

    fn retain(&mut self, id: ContextId) -> bool {
        match self.slots.get_mut(id.index as usize) {
            Some(slot) if slot.generation == id.generation && slot.context.is_some() => {
                slot.refs += 1;
                true
            }
            _ => false,
        }
    }

    /// Drop one reference, returning the context if it was the last.
    fn release(&mut self, id: ContextId) -> Option<Context> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation || slot.context.is_none() {
            return None;
        }
        slot.refs -= 1;
        if slot.refs > 0 {
            return None;
        }
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        slot.context.take()
    }

    fn parent_id(&self, id: ContextId) -> Result<Option<ContextId>, ContextError> {
        Ok(self.get(id)?.parent.as_ref().map(ContextRef::id))
    }

    fn owner_of(&self, mut id: ContextId, name: Name) -> Result<Option<ContextId>, ContextError> {
        loop {
            let context = self.get(id)?;
            if context.symbols.contains_key(&name) {
                return Ok(Some(id));
            }
            match &context.parent {
                Some(parent) => id = parent.id(),
                None => return Ok(None),
            }
        }
    }

    fn root_of(&self, mut id: ContextId) -> Result<ContextId, ContextError> {
        while let Some(parent) = self.parent_id(id)? {
            id = parent;
        }
        Ok(id)
    }
}

enum Pending {
    Retain(ContextId),
    Release(ContextId),
}

/// Live scope count below which allocation never triggers a collection.
const MIN_COLLECTION_THRESHOLD: usize = 256;

struct Contexts {
    arena: RefCell<ContextArena>,
    pending: RefCell<Vec<Pending>>,
    /// Live scope count at which the next allocation collects cycles.
    next_collection: Cell<usize>,
    interner: SharedInterner,
}

impl Contexts {
    fn retain(&self, id: ContextId) {
        match self.arena.try_borrow_mut() {
            Ok(mut arena) => {
                arena.retain(id);
            }
            Err(_) => self.pending.borrow_mut().push(Pending::Retain(id)),
        }
    }

    fn release(&self, id: ContextId) {
        let freed = match self.arena.try_borrow_mut() {
            Ok(mut arena) => arena.release(id),
            Err(_) => {
                self.pending.borrow_mut().push(Pending::Release(id));
                return;
            }
        };
        drop(freed);
    }

    /// Apply queued reference changes. Retains go first so a queued
    /// retain/release pair never frees a live scope.
    fn settle(&self) {
        loop {
            let mut pending = std::mem::take(&mut *self.pending.borrow_mut());
            if pending.is_empty() {
                return;
            }
            pending.sort_by_key(|p| matches!(p, Pending::Release(_)));
            let mut freed = Vec::new();
            {
                let mut arena = self.arena.borrow_mut();
                for p in pending {
                    match p {
                        Pending::Retain(id) => {
                            arena.retain(id);
                        }
                        Pending::Release(id) => freed.extend(arena.release(id)),
                    }
                }
            }
            drop(freed);
        }
    }

    fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }
}

/// Owning handle to a scope. Cloning retains, dropping releases.
pub struct ContextRef {
    id: ContextId,
    store: Weak<Contexts>,
}

impl ContextRef {
    pub fn id(&self) -> ContextId {
        self.id
    }
}

impl Clone for ContextRef {
    fn clone(&self) -> Self {
        if let Some(store) = self.store.upgrade() {
            store.retain(self.id);
        }
        ContextRef {
            id: self.id,
            store: Weak::clone(&self.store),
        }
    }
}

impl Drop for ContextRef {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store.release(self.id);
        }
    }
}

impl fmt::Debug for ContextRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextRef({}@{})", self.id.index, self.id.generation)
    }
}

/// The runtime's scope arena.
#[derive(Clone)]
pub struct ContextStore(Rc<Contexts>);

impl ContextStore {
    pub fn new(interner: SharedInterner) -> Self {
        ContextStore(Rc::new(Contexts {
            arena: RefCell::new(ContextArena::default()),
            pending: RefCell::new(Vec::new()),
            next_collection: Cell::new(MIN_COLLECTION_THRESHOLD),
            interner,
        }))
    }

    /// Create a scope, optionally nested in `parent`.
    pub fn create(
        &self,
        parent: Option<ContextId>,
        path: Option<Rc<Path>>,
    ) -> Result<ContextRef, ContextError> {
        let parent = parent.map(|id| self.retain(id)).transpose()?;
        Ok(self.alloc(parent, path))
    }

    /// Create a scope with no parent.
    pub fn create_root(&self, path: Option<Rc<Path>>) -> ContextRef {
        self.alloc(None, path)
    }

    fn alloc(&self, parent: Option<ContextRef>, path: Option<Rc<Path>>) -> ContextRef {
        self.0.settle();
        if self.0.arena.borrow().live >= self.0.next_collection.get() {
            self.collect_cycles();
            let live = self.0.arena.borrow().live;
            self.0
                .next_collection
                .set((live * 2).max(MIN_COLLECTION_THRESHOLD));
        }
        let id = self.0.arena.borrow_mut().alloc(Context {
            symbols: OrderedMap::new(),
            parent,
            path,
            initialised: false,
        });
        self.handle(id)
    }

    /// A new handle to a live scope.
    pub fn retain(&self, id: ContextId) -> Result<ContextRef, ContextError> {
        if self.0.arena.borrow_mut().retain(id) {
            Ok(self.handle(id))
        } else {
            Err(ContextError::Stale)
        }
    }

    fn handle(&self, id: ContextId) -> ContextRef {
        ContextRef {
            id,
            store: Rc::downgrade(&self.0),
        }
    }

    /// Bind `name` in `id` itself.
    pub fn declare(&self, id: ContextId, name: Name, symbol: Symbol) -> Result<(), ContextError> {
        let mut arena = self.0.arena.borrow_mut();
        let context = arena.get_mut(id)?;
        if context.symbols.contains_key(&name) {
            drop(arena);
            return Err(ContextError::AlreadyDeclared(self.0.name(name)));
        }
        context.symbols.insert(name, symbol);
        Ok(())
    }

    /// Nearest scope from `id` outward that binds `name`; with `global`, the
    /// root scope only.
    pub fn resolve_owner(
        &self,
        id: ContextId,
        name: Name,
        global: bool,
    ) -> Result<ContextId, ContextError> {
        let arena = self.0.arena.borrow();
        let start = if global { arena.root_of(id)? } else { id };
        let owner = if global {
            arena
                .get(start)?
                .symbols
                .contains_key(&name)
                .then_some(start)
        } else {
            arena.owner_of(start, name)?
        };
        owner.ok_or_else(|| ContextError::Undefined(self.0.name(name)))
    }

    /// The symbol bound to `name`, searching outward from `id`.
    pub fn symbol(&self, id: ContextId, name: Name) -> Result<Symbol, ContextError> {
        let arena = self.0.arena.borrow();
        let owner = arena
            .owner_of(id, name)?
            .ok_or_else(|| ContextError::Undefined(self.0.name(name)))?;
        arena
            .get(owner)?
            .symbols
            .get(&name)
            .cloned()
            .ok_or_else(|| ContextError::Undefined(self.0.name(name)))
    }

    pub fn lookup(&self, id: ContextId, name: Name) -> Result<Value, ContextError> {
        self.symbol(id, name).map(|symbol| symbol.value)
    }

    /// The symbol bound in `id` itself, if any.
    pub fn own_symbol(&self, id: ContextId, name: Name) -> Result<Option<Symbol>, ContextError> {
        Ok(self.0.arena.borrow().get(id)?.symbols.get(&name).cloned())
    }

    /// Replace the value bound to `name` in `owner`. Constants refuse.
    pub fn rebind(&self, owner: ContextId, name: Name, value: Value) -> Result<(), ContextError> {
        let old = {
            let mut arena = self.0.arena.borrow_mut();
            let symbol = arena
                .get_mut(owner)?
                .symbols
                .get_mut(&name)
                .ok_or_else(|| ContextError::Undefined(self.0.name(name)))?;
            if symbol.constant {
                return Err(ContextError::Constant(self.0.name(name)));
            }
            std::mem::replace(&mut symbol.value, value)
        };
        drop(old);
        self.0.settle();
        Ok(())
    }

    /// Rebind `name` wherever it resolves from `id` (or in the root with `global`).
    pub fn assign(
        &self,
        id: ContextId,
        name: Name,
        value: Value,
        global: bool,
    ) -> Result<(), ContextError> {
        let owner = self.resolve_owner(id, name, global)?;
        self.rebind(owner, name, value)
    }

    /// Unbind `name` from the nearest scope that binds it.
    pub fn remove(&self, id: ContextId, name: Name) -> Result<Symbol, ContextError> {
        let owner = self.resolve_owner(id, name, false)?;
        let removed = self
            .0
            .arena
            .borrow_mut()
            .get_mut(owner)?
            .symbols
            .remove(&name);
        removed.ok_or_else(|| ContextError::Undefined(self.0.name(name)))
    }

    /// Bindings of `id` itself, in declaration order.
    pub fn bindings(&self, id: ContextId) -> Result<Vec<(Name, Symbol)>, ContextError> {
        Ok(self
            .0
            .arena
            .borrow()
            .get(id)?
            .symbols
            .iter()
            .map(|(name, symbol)| (*name, symbol.clone()))
            .collect())
    }

    pub fn parent(&self, id: ContextId) -> Result<Option<ContextId>, ContextError> {
        self.0.arena.borrow().parent_id(id)
    }

    pub fn root(&self, id: ContextId) -> Result<ContextId, ContextError> {
        self.0.arena.borrow().root_of(id)
    }

    /// Directory of the nearest enclosing scope that records one.
    pub fn path(&self, mut id: ContextId) -> Result<Option<Rc<Path>>, ContextError> {
        let arena = self.0.arena.borrow();
        loop {
            let context = arena.get(id)?;
            if let Some(path) = &context.path {
                return Ok(Some(Rc::clone(path)));
            }
            match &context.parent {
                Some(parent) => id = parent.id(),
                None => return Ok(None),
            }
        }
    }

    /// Whether the root above `id` has had its builtins installed.
    pub fn is_initialised(&self, id: ContextId) -> Result<bool, ContextError> {
        let arena = self.0.arena.borrow();
        let root = arena.root_of(id)?;
        Ok(arena.get(root)?.initialised)
    }

    pub fn mark_initialised(&self, id: ContextId) -> Result<(), ContextError> {
        self.0.arena.borrow_mut().get_mut(id)?.initialised = true;
        Ok(())
    }

    pub fn is_alive(&self, id: ContextId) -> bool {
        self.0.arena.borrow().slot(id).is_some()
    }

    /// Free scopes kept alive only by references from inside the arena,
    /// returning how many were freed.
    ///
    /// Every handle, value and borrow the host holds counts as a root, so this
    /// is safe to call between any two store operations.
    pub fn collect_cycles(&self) -> usize {
        self.0.settle();
        let before = self.0.arena.borrow().live;
        let garbage = collect::unreachable_scopes(&self.0.arena.borrow());
        if garbage.is_empty() {
            return 0;
        }
        let mut cleared: Vec<OrderedMap<Name, Symbol>> = Vec::with_capacity(garbage.len());
        {
            let mut arena = self.0.arena.borrow_mut();
            for &id in &garbage {
                if let Ok(context) = arena.get_mut(id) {
                    cleared.push(std::mem::take(&mut context.symbols));
                }
            }
        }
        drop(cleared);
        self.0.settle();
        let after = self.0.arena.borrow().live;
        let freed = before.saturating_sub(after);
        tracing::debug!(freed, live = after, "collected scope cycles");
        freed
    }

    /// Number of scopes currently allocated.
    pub fn live_count(&self) -> usize {
        self.0.settle();
        self.0.arena.borrow().live
    }
}

impl fmt::Debug for ContextStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextStore")
            .field("live", &self.0.arena.borrow().live)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
