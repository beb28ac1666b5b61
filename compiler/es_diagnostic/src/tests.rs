use std::sync::Arc;

use es_ir::Position;
use pretty_assertions::assert_eq;

use crate::{ErrorCode, ErrorKind, EsError};

fn pos(line: u32, column: u32) -> Position {
    Position::new(0, line, column, Some(Arc::from("main.es")))
}

#[test]
fn renders_kind_details_and_position() {
    let err = EsError::reference("a").at(pos(0, 0));
    assert_eq!(err.to_string(), "ReferenceError: a is not defined \n at main.es:1:1");
}

#[test]
fn with_position_keeps_existing_position() {
    let err = EsError::type_error("bad").at(pos(2, 3)).with_position(&pos(9, 9));
    assert_eq!(err.position, pos(2, 3));

    let err = EsError::type_error("bad").with_position(&pos(4, 0));
    assert_eq!(err.position, pos(4, 0));
}

#[test]
fn traceback_renders_outermost_first() {
    let mut err = EsError::user("Oops", "failed").at(pos(0, 4));
    err.push_frame(pos(1, 0), "inner()".to_string());
    err.push_frame(pos(5, 0), "outer()".to_string());

    assert_eq!(
        err.to_string(),
        "Traceback (most recent call last):\n\
         main.es:6:1:\n    outer()\n\
         main.es:2:1:\n    inner()\n\
         Oops: failed \n at main.es:1:5"
    );
}

#[test]
fn kinds_have_names_and_codes() {
    assert_eq!(EsError::illegal_char('#').summary(), "IllegalCharError: '#'");
    assert_eq!(ErrorKind::Type.code(), ErrorCode::E2002);
    assert_eq!(ErrorKind::User("Custom".into()).name(), "Custom");
    assert_eq!(EsError::import("x.es", "not found").details, "Could not import x.es: not found");
    assert_eq!(ErrorCode::E6005.to_string(), "E6005");
}

#[test]
fn expected_type_message() {
    let err = EsError::expected_type("Number", "Array", "[1]");
    assert_eq!(err.details, "Expected type 'Number', got type 'Array' on value '[1]'");
}
