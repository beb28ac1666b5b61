#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::display::format_number;
use super::*;
use crate::map::OrderedMap;

fn fields(pairs: &[(&str, Value)]) -> Fields {
    pairs
        .iter()
        .map(|(key, value)| (Rc::from(*key), value.clone()))
        .collect()
}

#[test]
fn truthiness() {
    assert!(!Value::Undefined.truthy());
    assert!(!Value::Number(0.0).truthy());
    assert!(!Value::Number(-3.0).truthy());
    assert!(Value::Number(0.5).truthy());
    assert!(!Value::from("").truthy());
    assert!(Value::from("x").truthy());
    assert!(!Value::array(Vec::new()).truthy());
    assert!(Value::array(vec![Value::Undefined]).truthy());
    assert!(Value::object(Fields::new()).truthy());
}

#[test]
fn data_compares_structurally() {
    let a = Value::array(vec![Value::from(1.0), Value::from("x")]);
    let b = Value::array(vec![Value::from(1.0), Value::from("x")]);
    assert!(a.equals(&b));

    let a = Value::object(fields(&[("k", Value::from(true))]));
    let b = Value::object(fields(&[("k", Value::from(true))]));
    let c = Value::object(fields(&[("k", Value::from(false))]));
    assert!(a.equals(&b));
    assert!(!a.equals(&c));
}

#[test]
fn different_variants_never_compare_equal() {
    assert!(!Value::from(1.0).equals(&Value::from("1")));
    assert!(!Value::from(true).equals(&Value::from(1.0)));
    assert!(!Value::Undefined.equals(&Value::from(0.0)));
}

#[test]
fn nan_is_not_equal_to_itself() {
    assert!(!Value::from(f64::NAN).equals(&Value::from(f64::NAN)));
}

#[test]
fn numbers_format_without_trailing_zeroes() {
    assert_eq!(format_number(3.0), "3");
    assert_eq!(format_number(-0.0), "0");
    assert_eq!(format_number(2.5), "2.5");
    assert_eq!(format_number(f64::INFINITY), "Infinity");
    assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    assert_eq!(format_number(f64::NAN), "NaN");
}

#[test]
fn display_and_repr() {
    let value = Value::array(vec![
        Value::from(1.0),
        Value::from("two"),
        Value::object(fields(&[("a", Value::Undefined)])),
    ]);
    assert_eq!(value.to_string(), "[1, 'two', {a: undefined}]");
    assert_eq!(Value::from("two").to_string(), "two");
    assert_eq!(Value::from("two").repr(), "'two'");
}

#[test]
fn cyclic_values_print() {
    let items = Heap::new(Vec::new());
    items.borrow_mut().push(Value::Array(items.clone()));
    assert_eq!(Value::Array(items.clone()).to_string(), "[[...]]");
    items.borrow_mut().clear();
}

#[test]
fn deep_copy_detaches() {
    let inner = Value::array(vec![Value::from(1.0)]);
    let outer = Value::array(vec![inner.clone(), inner.clone()]);
    let copy = outer.deep_copy();
    assert!(copy.equals(&outer));

    let Value::Array(items) = &copy else { panic!("expected an array") };
    let (first, second) = {
        let items = items.borrow();
        (items[0].clone(), items[1].clone())
    };
    let (Value::Array(first), Value::Array(second)) = (first, second) else {
        panic!("expected nested arrays");
    };
    assert!(first.ptr_eq(&second), "shared structure survives the copy");
    let Value::Array(original) = &inner else { unreachable!() };
    assert!(!first.ptr_eq(original));

    first.borrow_mut().push(Value::from(2.0));
    assert_eq!(inner.to_string(), "[1]");
}

#[test]
fn deep_copy_keeps_cycles() {
    let obj = Heap::new(Object::plain(Fields::new()));
    obj.borrow_mut()
        .fields
        .insert(Rc::from("me"), Value::Object(obj.clone()));
    let copy = Value::Object(obj.clone()).deep_copy();

    let Value::Object(copied) = &copy else { panic!("expected an object") };
    let me = copied.borrow().fields.get("me").cloned();
    let Some(Value::Object(me)) = me else { panic!("expected the self reference") };
    assert!(me.ptr_eq(copied));
    assert!(!me.ptr_eq(&obj));

    obj.borrow_mut().fields.clear();
    copied.borrow_mut().fields.clear();
}

#[test]
fn contains_checks_membership() {
    let array = Value::array(vec![Value::from(1.0), Value::from("a")]);
    assert_eq!(array.contains(&Value::from("a")), Ok(true));
    assert_eq!(array.contains(&Value::from(2.0)), Ok(false));
    assert_eq!(Value::from("hello").contains(&Value::from("ell")), Ok(true));

    let obj = Value::object(fields(&[("k", Value::Undefined)]));
    assert_eq!(obj.contains(&Value::from("k")), Ok(true));
    assert!(Value::from(1.0).contains(&Value::from(1.0)).is_err());
}

#[test]
fn builtin_types_are_shared() {
    let types = BuiltinTypes::new();
    let number = types.of(&Value::from(4.0));
    assert!(Rc::ptr_eq(&number, types.get(Primitive::Number)));
    assert_eq!(number.name(), "Number");
    assert_eq!(Value::from(4.0).type_name().as_ref(), "Number");
}

#[test]
fn any_includes_everything() {
    let types = BuiltinTypes::new();
    let any = types.get(Primitive::Any);
    for ty in types.iter() {
        assert!(any.includes(ty));
        assert!(ty.includes(any));
    }
    assert!(!types
        .get(Primitive::Number)
        .includes(types.get(Primitive::String)));
}

#[test]
fn class_chains() {
    let types = BuiltinTypes::new();
    let object = Rc::clone(types.get(Primitive::Object));
    let animal = Rc::new(Type::class(Info::named("Animal"), Rc::clone(&object), None, OrderedMap::new()));
    let dog = Rc::new(Type::class(Info::named("Dog"), Rc::clone(&animal), None, OrderedMap::new()));

    assert!(dog.descends_from(&animal));
    assert!(dog.descends_from(&object));
    assert!(!animal.descends_from(&dog));
    assert!(animal.includes(&dog));
    assert!(dog.includes(&animal));
    assert!(dog.is_class());
    assert_eq!(dog.extends().map(|ty| ty.name()), Some("Animal"));
}

#[test]
fn instances_are_tracked_weakly() {
    let types = BuiltinTypes::new();
    let class = Rc::new(Type::class(
        Info::named("Point"),
        Rc::clone(types.get(Primitive::Object)),
        None,
        OrderedMap::new(),
    ));
    let instance = Heap::new(Object {
        fields: Fields::new(),
        class: Some(Rc::clone(&class)),
    });
    class.register_instance(&instance);
    assert_eq!(class.instances().len(), 1);
    assert_eq!(Value::Object(instance.clone()).type_name().as_ref(), "Point");

    drop(instance);
    assert_eq!(class.instances().len(), 0);
}
