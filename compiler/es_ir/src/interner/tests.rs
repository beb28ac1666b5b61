use pretty_assertions::assert_eq;

use super::*;

#[test]
fn interning_is_idempotent() {
    let interner = StringInterner::new();

    let a = interner.intern("alpha");
    let b = interner.intern("beta");

    assert_eq!(interner.intern("alpha"), a);
    assert_ne!(a, b);
    assert_eq!(interner.lookup(a), "alpha");
    assert_eq!(interner.lookup(b), "beta");
}

#[test]
fn empty_string_is_reserved() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.lookup(Name::EMPTY), "");
}

#[test]
fn runtime_names_are_pre_interned() {
    let interner = StringInterner::new();
    let before = interner.len();

    interner.intern("this");
    interner.intern("args");

    assert_eq!(interner.len(), before);
    assert!(!interner.is_empty());
}

#[test]
fn unknown_name_resolves_to_empty() {
    let interner = StringInterner::new();
    assert_eq!(interner.lookup(Name::from_raw(9_999)), "");
}

#[test]
fn shared_interner_clones_share_the_table() {
    let first = SharedInterner::new();
    let second = first.clone();

    let x = first.intern("shared");
    assert_eq!(second.intern("shared"), x);
    assert_eq!(second.lookup(x), "shared");
}

#[test]
fn get_never_interns() {
    let interner = StringInterner::new();
    let before = interner.len();
    assert_eq!(interner.get("gamma"), None);
    assert_eq!(interner.len(), before);

    let gamma = interner.intern("gamma");
    assert_eq!(interner.get("gamma"), Some(gamma));
}
