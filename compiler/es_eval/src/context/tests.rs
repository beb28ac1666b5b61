#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::*;
use crate::value::{Info, Namespace};

fn store() -> (ContextStore, SharedInterner) {
    let interner = SharedInterner::new();
    (ContextStore::new(interner.clone()), interner)
}

fn number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => *n,
        other => panic!("expected a number, got {other:?}"),
    }
}

#[test]
fn lookup_walks_outward() {
    let (store, interner) = store();
    let a = interner.intern("a");
    let root = store.create_root(None);
    store.declare(root.id(), a, Symbol::variable(Value::Number(1.0))).unwrap();
    let child = store.create(Some(root.id()), None).unwrap();
    let grandchild = store.create(Some(child.id()), None).unwrap();

    assert_eq!(number(&store.lookup(grandchild.id(), a).unwrap()), 1.0);
    assert_eq!(store.resolve_owner(grandchild.id(), a, false).unwrap(), root.id());
}

#[test]
fn inner_declarations_shadow() {
    let (store, interner) = store();
    let a = interner.intern("a");
    let root = store.create_root(None);
    let child = store.create(Some(root.id()), None).unwrap();
    store.declare(root.id(), a, Symbol::variable(Value::Number(1.0))).unwrap();
    store.declare(child.id(), a, Symbol::variable(Value::Number(2.0))).unwrap();

    assert_eq!(number(&store.lookup(child.id(), a).unwrap()), 2.0);
    assert_eq!(number(&store.lookup(root.id(), a).unwrap()), 1.0);
}

#[test]
fn redeclaring_in_the_same_scope_fails() {
    let (store, interner) = store();
    let a = interner.intern("a");
    let root = store.create_root(None);
    store.declare(root.id(), a, Symbol::variable(Value::Undefined)).unwrap();
    assert_eq!(
        store.declare(root.id(), a, Symbol::variable(Value::Undefined)),
        Err(ContextError::AlreadyDeclared("a"))
    );
}

#[test]
fn unknown_names_are_undefined() {
    let (store, interner) = store();
    let root = store.create_root(None);
    let missing = interner.intern("missing");
    assert!(matches!(
        store.lookup(root.id(), missing),
        Err(ContextError::Undefined("missing"))
    ));
    let e = EsError::from(ContextError::Undefined("missing"));
    assert_eq!(e.summary(), "ReferenceError: missing is not defined");
}

#[test]
fn assign_updates_the_owner() {
    let (store, interner) = store();
    let a = interner.intern("a");
    let root = store.create_root(None);
    let child = store.create(Some(root.id()), None).unwrap();
    store.declare(root.id(), a, Symbol::variable(Value::Number(1.0))).unwrap();

    store.assign(child.id(), a, Value::Number(5.0), false).unwrap();
    assert_eq!(number(&store.lookup(root.id(), a).unwrap()), 5.0);
    assert!(store.own_symbol(child.id(), a).unwrap().is_none());
}

#[test]
fn constants_refuse_rebinding() {
    let (store, interner) = store();
    let a = interner.intern("a");
    let root = store.create_root(None);
    store.declare(root.id(), a, Symbol::constant(Value::Number(1.0))).unwrap();

    assert_eq!(
        store.assign(root.id(), a, Value::Number(2.0), false),
        Err(ContextError::Constant("a"))
    );
    assert_eq!(number(&store.lookup(root.id(), a).unwrap()), 1.0);
}

#[test]
fn global_assignment_only_sees_the_root() {
    let (store, interner) = store();
    let a = interner.intern("a");
    let root = store.create_root(None);
    let child = store.create(Some(root.id()), None).unwrap();
    store.declare(child.id(), a, Symbol::variable(Value::Number(1.0))).unwrap();

    assert_eq!(
        store.assign(child.id(), a, Value::Number(2.0), true),
        Err(ContextError::Undefined("a"))
    );
    assert_eq!(store.root(child.id()).unwrap(), root.id());
}

#[test]
fn remove_unbinds_the_nearest() {
    let (store, interner) = store();
    let a = interner.intern("a");
    let root = store.create_root(None);
    store.declare(root.id(), a, Symbol::variable(Value::Number(1.0))).unwrap();
    let removed = store.remove(root.id(), a).unwrap();
    assert_eq!(number(&removed.value), 1.0);
    assert!(store.lookup(root.id(), a).is_err());
}

#[test]
fn bindings_keep_declaration_order() {
    let (store, interner) = store();
    let root = store.create_root(None);
    for name in ["z", "a", "m"] {
        store
            .declare(root.id(), interner.intern(name), Symbol::variable(Value::Undefined))
            .unwrap();
    }
    let names: Vec<&str> = store
        .bindings(root.id())
        .unwrap()
        .into_iter()
        .map(|(name, _)| interner.lookup(name))
        .collect();
    assert_eq!(names, vec!["z", "a", "m"]);
}

#[test]
fn dropping_the_last_handle_frees_the_scope() {
    let (store, _) = store();
    let root = store.create_root(None);
    let child = store.create(Some(root.id()), None).unwrap();
    let id = child.id();
    assert_eq!(store.live_count(), 2);

    drop(child);
    assert!(!store.is_alive(id));
    assert_eq!(store.live_count(), 1);
    assert!(matches!(store.lookup(id, es_ir::Name::EMPTY), Err(ContextError::Stale)));
}

#[test]
fn children_keep_parents_alive() {
    let (store, _) = store();
    let root = store.create_root(None);
    let child = store.create(Some(root.id()), None).unwrap();
    let root_id = root.id();

    drop(root);
    assert!(store.is_alive(root_id));
    drop(child);
    assert!(!store.is_alive(root_id));
    assert_eq!(store.live_count(), 0);
}

#[test]
fn freed_slots_get_a_new_generation() {
    let (store, _) = store();
    let first = store.create_root(None);
    let stale = first.id();
    drop(first);
    let second = store.create_root(None);

    assert_ne!(second.id(), stale);
    assert!(store.retain(stale).is_err());
}

#[test]
fn cloned_handles_retain() {
    let (store, _) = store();
    let root = store.create_root(None);
    let copy = root.clone();
    let id = root.id();
    drop(root);
    assert!(store.is_alive(id));
    drop(copy);
    assert!(!store.is_alive(id));
}

#[test]
fn paths_are_inherited() {
    let (store, _) = store();
    let dir: Rc<Path> = Rc::from(Path::new("/scripts"));
    let module = store.create_root(Some(Rc::clone(&dir)));
    let frame = store.create(Some(module.id()), None).unwrap();
    assert_eq!(store.path(frame.id()).unwrap(), Some(dir));
}

#[test]
fn initialisation_is_read_from_the_root() {
    let (store, _) = store();
    let root = store.create_root(None);
    let child = store.create(Some(root.id()), None).unwrap();
    assert!(!store.is_initialised(child.id()).unwrap());
    store.mark_initialised(root.id()).unwrap();
    assert!(store.is_initialised(child.id()).unwrap());
}

/// A scope whose own binding holds a namespace over that scope.
fn self_referencing(store: &ContextStore, interner: &SharedInterner, parent: ContextId) -> (ContextId, Value) {
    let frame = store.create(Some(parent), None).unwrap();
    let ns = Value::Namespace(Rc::new(Namespace::new(Info::named("n"), false, frame.clone())));
    store
        .declare(frame.id(), interner.intern("n"), Symbol::variable(ns.clone()))
        .unwrap();
    (frame.id(), ns)
}

#[test]
fn collection_frees_scopes_only_they_reach() {
    let (store, interner) = store();
    let root = store.create_root(None);
    let (id, ns) = self_referencing(&store, &interner, root.id());
    drop(ns);
    assert!(store.is_alive(id));

    assert_eq!(store.collect_cycles(), 1);
    assert!(!store.is_alive(id));
    assert!(store.is_alive(root.id()));
    assert_eq!(store.live_count(), 1);
}

#[test]
fn collection_keeps_what_the_host_holds() {
    let (store, interner) = store();
    let root = store.create_root(None);
    let (id, ns) = self_referencing(&store, &interner, root.id());
    assert_eq!(store.collect_cycles(), 0);
    assert!(store.is_alive(id));

    let held = store.retain(id).unwrap();
    drop(ns);
    assert_eq!(store.collect_cycles(), 0);
    drop(held);
    assert_eq!(store.collect_cycles(), 1);
}

#[test]
fn collection_keeps_scopes_reachable_from_held_values() {
    let (store, interner) = store();
    let root = store.create_root(None);
    let (id, ns) = self_referencing(&store, &interner, root.id());
    let child = store.create(Some(id), None).unwrap();
    let items = Value::array(vec![ns.clone()]);
    drop(ns);
    drop(child);
    store
        .declare(root.id(), interner.intern("items"), Symbol::variable(items.clone()))
        .unwrap();
    assert_eq!(store.collect_cycles(), 0);
    assert!(store.is_alive(id));

    drop(items);
    store.remove(root.id(), interner.intern("items")).unwrap();
    assert_eq!(store.collect_cycles(), 1);
}
