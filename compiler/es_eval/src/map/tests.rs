use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::OrderedMap;

#[test]
fn keeps_insertion_order() {
    let mut map = OrderedMap::new();
    map.insert("b", 1);
    map.insert("a", 2);
    map.insert("c", 3);
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["b", "a", "c"]);
}

#[test]
fn replacing_keeps_position() {
    let mut map = OrderedMap::new();
    map.insert("x", 1);
    map.insert("y", 2);
    assert_eq!(map.insert("x", 10), Some(1));
    assert_eq!(map.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(), vec![("x", 10), ("y", 2)]);
}

#[test]
fn remove_reindexes() {
    let mut map: OrderedMap<&str, i32> = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
    assert_eq!(map.remove("a"), Some(1));
    assert_eq!(map.get("c"), Some(&3));
    assert_eq!(map.len(), 2);
    assert_eq!(map.remove("a"), None);
}

#[test]
fn borrowed_lookup_with_rc_keys() {
    let mut map: OrderedMap<Rc<str>, i32> = OrderedMap::new();
    map.insert(Rc::from("key"), 7);
    assert!(map.contains_key("key"));
    if let Some(v) = map.get_mut("key") {
        *v += 1;
    }
    assert_eq!(map.get("key"), Some(&8));
}

#[test]
fn clear_empties_entries_and_index() {
    let mut map: OrderedMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
    map.clear();
    assert!(map.is_empty());
    assert!(!map.contains_key("a"));
    map.insert("b", 3);
    assert_eq!(map.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(), vec![("b", 3)]);
}
