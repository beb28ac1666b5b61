use super::*;

#[test]
fn terminal_nodes() {
    let terminal = Node::new(NodeKind::Number(1.0), Position::UNKNOWN);
    let nested = Node::new(
        NodeKind::Unary {
            op: UnaryOp::Negate,
            operand: Box::new(terminal.clone()),
        },
        Position::UNKNOWN,
    );

    assert!(terminal.is_terminal());
    assert!(Node::new(NodeKind::Break, Position::UNKNOWN).is_terminal());
    assert!(!nested.is_terminal());
}

#[test]
fn compound_assignments_map_to_binary_ops() {
    assert_eq!(AssignOp::Set.binary(), None);
    assert_eq!(AssignOp::Add.binary(), Some(BinaryOp::Add));
    assert_eq!(AssignOp::Divide.binary(), Some(BinaryOp::Divide));
    assert_eq!(AssignOp::Multiply.as_symbol(), "*=");
}

#[test]
fn overloadable_operators() {
    assert_eq!(BinaryOp::Add.overload_method(), Some("__add__"));
    assert_eq!(BinaryOp::Eq.overload_method(), Some("__eq__"));
    assert_eq!(BinaryOp::And.overload_method(), None);
}
