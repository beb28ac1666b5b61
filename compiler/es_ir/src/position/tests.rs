use pretty_assertions::assert_eq;

use super::*;

#[test]
fn unknown_is_default() {
    assert!(Position::default().is_unknown());
    assert_eq!(Position::UNKNOWN.to_string(), "<unknown>");
}

#[test]
fn advance_tracks_lines_and_columns() {
    let mut pos = Position::start_of(Some(Arc::from("main.es")));
    for ch in "ab\nc".chars() {
        pos.advance(ch);
    }
    assert_eq!((pos.index, pos.line, pos.column), (4, 1, 1));
    assert!(!pos.is_unknown());
}

#[test]
fn display_is_one_based() {
    let pos = Position::new(10, 2, 4, Some(Arc::from("lib.es")));
    assert_eq!(pos.to_string(), "lib.es:3:5");
}

#[test]
fn anonymous_file_name() {
    let pos = Position::start_of(None);
    assert_eq!(pos.to_string(), "<anonymous>:1:1");
}
