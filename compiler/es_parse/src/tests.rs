#![allow(clippy::unwrap_used, clippy::expect_used)]

use es_diagnostic::{ErrorKind, EsError};
use es_ir::{
    AssignOp, AssignTarget, ClassField, Modifiers, Node, NodeKind, ObjectKey, Program,
    StringInterner,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::parse;

fn try_parse(source: &str, interner: &StringInterner) -> Result<Program, EsError> {
    let tokens = es_lexer::generate(source, None, interner)?;
    parse(&tokens, interner)
}

fn parse_ok(source: &str) -> (Program, StringInterner) {
    let interner = StringInterner::new();
    let program = try_parse(source, &interner).expect("source should parse");
    (program, interner)
}

fn parse_err(source: &str) -> EsError {
    let interner = StringInterner::new();
    try_parse(source, &interner).expect_err("source should not parse")
}

/// Compact prefix rendering for comparing tree shapes.
fn sexpr(node: &Node, interner: &StringInterner) -> String {
    let s = |n: &Node| sexpr(n, interner);
    match &node.kind {
        NodeKind::Number(n) => n.to_string(),
        NodeKind::String(text) => format!("'{text}'"),
        NodeKind::Variable(name) => interner.lookup(*name).to_string(),
        NodeKind::Undefined => "undefined".to_string(),
        NodeKind::Binary { op, left, right } => {
            format!("({} {} {})", op.as_symbol(), s(left), s(right))
        }
        NodeKind::Unary { op, operand } => format!("({} {})", op.as_symbol(), s(operand)),
        NodeKind::Call {
            callee,
            args,
            optional,
        } => {
            let args: Vec<_> = args.iter().map(s).collect();
            let q = if *optional { "?" } else { "" };
            format!("(call{q} {} [{}])", s(callee), args.join(" "))
        }
        NodeKind::Index {
            base,
            index,
            optional,
        } => {
            let q = if *optional { "?" } else { "" };
            format!("(index{q} {} {})", s(base), s(index))
        }
        NodeKind::Member {
            base,
            name,
            optional,
        } => {
            let q = if *optional { "?" } else { "" };
            format!("(.{q} {} {})", s(base), interner.lookup(*name))
        }
        NodeKind::Array(items) => {
            let items: Vec<_> = items.iter().map(s).collect();
            format!("[{}]", items.join(" "))
        }
        other => format!("{other:?}"),
    }
}

fn single_expr(source: &str) -> String {
    let (program, interner) = parse_ok(source);
    assert_eq!(program.statements.len(), 1, "expected one statement");
    sexpr(&program.statements[0], &interner)
}

#[test]
fn precedence_ladder() {
    assert_eq!(single_expr("2 + 4 * 5"), "(+ 2 (* 4 5))");
    assert_eq!(single_expr("(2 + 4) * 5"), "(* (+ 2 4) 5)");
    assert_eq!(single_expr("3 + 4 ^ 2"), "(+ 3 (^ 4 2))");
    assert_eq!(single_expr("1 < 2 & 3 == 3"), "(& (< 1 2) (== 3 3))");
    assert_eq!(single_expr("a ?? b | c"), "(| (?? a b) c)");
}

#[test]
fn binary_operators_fold_left() {
    assert_eq!(single_expr("1 - 2 - 3"), "(- (- 1 2) 3)");
    assert_eq!(single_expr("2 ^ 3 ^ 2"), "(^ (^ 2 3) 2)");
}

#[test]
fn unary_operators() {
    assert_eq!(single_expr("-2 ^ 2"), "(- (^ 2 2))");
    assert_eq!(single_expr("2 ^ -1"), "(^ 2 (- 1))");
    assert_eq!(single_expr("!a == b"), "(! (== a b))");
    assert_eq!(single_expr("a * !b"), "(* a (! b))");
    assert_eq!(single_expr("+-3"), "(+ (- 3))");
}

#[test]
fn postfix_chains() {
    assert_eq!(single_expr("f()[2][1]"), "(index (index (call f []) 2) 1)");
    assert_eq!(single_expr("a.b(1, 2).c"), "(. (call (. a b) [1 2]) c)");
    assert_eq!(single_expr("a?.b?.(1)?.[0]"), "(index? (call? (.? a b) [1]) 0)");
    assert_eq!(single_expr("x.class"), "(. x class)");
}

#[test]
fn array_literal_allows_trailing_comma() {
    assert_eq!(single_expr("[1, 'a', [2],]"), "[1 'a' [2]]");
}

#[test]
fn declarations_collect_modifiers() {
    let (program, interner) = parse_ok("global const x: Number = 1");
    let NodeKind::Declare(decl) = &program.statements[0].kind else {
        panic!("expected a declaration");
    };
    assert_eq!(interner.lookup(decl.name), "x");
    assert_eq!(
        decl.modifiers,
        Modifiers {
            constant: true,
            global: true,
            local: false
        }
    );
    assert_eq!(sexpr(decl.ty.as_ref().unwrap(), &interner), "Number");
    assert_eq!(sexpr(decl.value.as_ref().unwrap(), &interner), "1");
}

#[test]
fn declaration_without_value() {
    let (program, _) = parse_ok("var a;");
    let NodeKind::Declare(decl) = &program.statements[0].kind else {
        panic!("expected a declaration");
    };
    assert!(decl.value.is_none());
    assert_eq!(decl.modifiers, Modifiers::default());
}

#[test]
fn const_requires_initialiser() {
    let err = parse_err("const n;");
    assert_eq!(err.kind, ErrorKind::InvalidSyntax);
    assert!(err.details.starts_with("Constant 'n' must be initialised"));
}

#[test]
fn repeated_modifier_group_is_rejected() {
    let err = parse_err("var let x = 1");
    assert!(err.details.starts_with("Unexpected modifier 'let'"));
}

#[test]
fn statements_need_separators() {
    let (program, _) = parse_ok("var a = 1; a = a + 1;");
    assert_eq!(program.statements.len(), 2);

    let err = parse_err("1 2");
    assert_eq!(err.details, "Expected ';' or end of file, found number 2");
    assert_eq!(err.position.column, 2);
}

#[test]
fn braced_statements_need_no_separator() {
    let (program, _) = parse_ok("if x { 1 } while y { 2 } func f() { 3 } f()");
    assert_eq!(program.statements.len(), 4);
}

#[test]
fn if_with_single_statement_branches() {
    let (program, _) = parse_ok("if (a) b = 1; else b = 2; c");
    assert_eq!(program.statements.len(), 2);
    let NodeKind::If { else_branch, .. } = &program.statements[0].kind else {
        panic!("expected if");
    };
    assert!(else_branch.is_some());
}

#[test]
fn else_if_chains() {
    let (program, _) = parse_ok("if a { 1 } else if b { 2 } else { 3 }");
    let NodeKind::If { else_branch, .. } = &program.statements[0].kind else {
        panic!("expected if");
    };
    assert!(matches!(
        else_branch.as_deref().map(|n| &n.kind),
        Some(NodeKind::If { .. })
    ));
}

#[test]
fn for_loop_forms() {
    let (program, interner) = parse_ok("for i in range(3) { i } for (global j in [0, 1]) j;");
    assert_eq!(program.statements.len(), 2);
    let NodeKind::For(first) = &program.statements[0].kind else {
        panic!("expected for");
    };
    assert_eq!(interner.lookup(first.binding), "i");
    assert_eq!(sexpr(&first.iterable, &interner), "(call range [3])");

    let NodeKind::For(second) = &program.statements[1].kind else {
        panic!("expected for");
    };
    assert!(second.modifiers.global);
}

#[test]
fn loop_control_outside_loops_is_rejected() {
    assert_eq!(parse_err("break").details, "'break' outside of a loop");
    assert_eq!(parse_err("continue").details, "'continue' outside of a loop");
    assert_eq!(
        parse_err("while true { func () { break } }").details,
        "'break' outside of a loop while parsing a block"
    );
}

#[test]
fn return_outside_function_is_rejected() {
    assert_eq!(parse_err("return 1").details, "'return' outside of a function");
    assert_eq!(parse_err("yield 1").details, "'yield' outside of a function");
}

#[test]
fn bare_return_carries_undefined() {
    let (program, _) = parse_ok("func f() { return; }");
    let NodeKind::Function(def) = &program.statements[0].kind else {
        panic!("expected function");
    };
    let NodeKind::Block(body) = &def.body.kind else {
        panic!("expected block body");
    };
    let NodeKind::Return(value) = &body[0].kind else {
        panic!("expected return");
    };
    assert_eq!(value.kind, NodeKind::Undefined);
}

#[test]
fn assignment_targets() {
    let (program, interner) = parse_ok("a = 1; a.b += 2; a[0] *= 3;");
    let targets: Vec<_> = program
        .statements
        .iter()
        .map(|stmt| match &stmt.kind {
            NodeKind::Assign { target, op, .. } => (target.as_ref().clone(), *op),
            other => panic!("expected assignment, got {other:?}"),
        })
        .collect();

    assert!(matches!(targets[0], (AssignTarget::Variable(_), AssignOp::Set)));
    let (AssignTarget::Member { name, .. }, AssignOp::Add) = &targets[1] else {
        panic!("expected member target");
    };
    assert_eq!(interner.lookup(*name), "b");
    assert!(matches!(targets[2], (AssignTarget::Index { .. }, AssignOp::Multiply)));
}

#[test]
fn invalid_assignment_target() {
    let err = parse_err("f() = 1");
    assert_eq!(err.kind, ErrorKind::InvalidSyntax);
    assert_eq!(err.details, "Cannot assign to this value");
}

#[test]
fn object_literal_keys() {
    let (program, interner) = parse_ok("var o = { a, b: 1, 'c d': 2, [k]: 3 }");
    let NodeKind::Declare(decl) = &program.statements[0].kind else {
        panic!("expected declaration");
    };
    let Some(NodeKind::Object(entries)) = decl.value.as_ref().map(|v| &v.kind) else {
        panic!("expected object literal");
    };
    let keys: Vec<String> = entries
        .iter()
        .map(|e| match &e.key {
            ObjectKey::Static(k) => k.to_string(),
            ObjectKey::Computed(node) => format!("[{}]", sexpr(node, &interner)),
        })
        .collect();
    assert_eq!(keys, vec!["a", "b", "c d", "[k]"]);
    assert_eq!(sexpr(&entries[0].value, &interner), "a");
}

#[test]
fn anonymous_functions_take_the_declared_name() {
    let (program, interner) = parse_ok("var add = func (a, b = 2): Number a + b");
    let NodeKind::Declare(decl) = &program.statements[0].kind else {
        panic!("expected declaration");
    };
    let Some(NodeKind::Function(def)) = decl.value.as_ref().map(|v| &v.kind) else {
        panic!("expected function");
    };
    assert_eq!(def.name.map(|n| interner.lookup(n)), Some("add"));
    assert!(!def.declares);
    assert_eq!(def.params.len(), 2);
    assert!(def.params[1].default.is_some());
    assert_eq!(sexpr(&def.body, &interner), "(+ a b)");
}

#[test]
fn named_function_declares() {
    let (program, _) = parse_ok("func f(x: Number) { return x }");
    let NodeKind::Function(def) = &program.statements[0].kind else {
        panic!("expected function");
    };
    assert!(def.declares);
    assert!(def.params[0].ty.is_some());
}

#[test]
fn class_members() {
    let (program, interner) = parse_ok(
        "class Child extends Parent { init(a) { super(a); } get() { return this.a } ; other() 1 }",
    );
    let NodeKind::Class(def) = &program.statements[0].kind else {
        panic!("expected class");
    };
    assert!(def.declares);
    assert!(def.init.is_some());
    assert_eq!(sexpr(def.extends.as_ref().unwrap(), &interner), "Parent");
    let names: Vec<_> = def
        .methods
        .iter()
        .map(|m| m.name.map(|n| interner.lookup(n)))
        .collect();
    assert_eq!(names, vec![Some("get"), Some("other")]);
}

#[test]
fn class_properties_and_statics() {
    let (program, interner) = parse_ok(
        "abstract class Shape { sides: Number; label; static count: Number = 0; static unit() Shape; area() 0 }",
    );
    let NodeKind::Class(def) = &program.statements[0].kind else {
        panic!("expected class");
    };
    assert!(def.is_abstract);
    assert!(def.declares);
    let names = |fields: &[ClassField]| -> Vec<&'static str> {
        fields.iter().map(|f| interner.lookup(f.name)).collect()
    };
    assert_eq!(names(&def.properties), vec!["sides", "label"]);
    assert_eq!(sexpr(def.properties[0].ty.as_ref().unwrap(), &interner), "Number");
    assert!(def.properties[1].ty.is_none());
    assert_eq!(names(&def.static_fields), vec!["count"]);
    assert_eq!(sexpr(def.static_fields[0].value.as_ref().unwrap(), &interner), "0");
    assert_eq!(def.static_methods.len(), 1);
    assert_eq!(def.methods.len(), 1);
}

#[test]
fn static_and_abstract_stay_ordinary_names() {
    let (program, interner) = parse_ok("class A { static() 1 } var abstract = 2; abstract");
    let NodeKind::Class(def) = &program.statements[0].kind else {
        panic!("expected class");
    };
    assert!(!def.is_abstract);
    assert!(def.static_methods.is_empty());
    assert_eq!(def.methods[0].name.map(|n| interner.lookup(n)), Some("static"));
    assert_eq!(sexpr(&program.statements[2], &interner), "abstract");

    let (program, _) = parse_ok("var B = abstract class {}");
    let NodeKind::Declare(decl) = &program.statements[0].kind else {
        panic!("expected a declaration");
    };
    assert!(matches!(&decl.value.as_ref().unwrap().kind, NodeKind::Class(def) if def.is_abstract));
}

#[test]
fn instance_properties_take_no_value() {
    let err = parse_err("class A { x: Number = 1; }");
    assert_eq!(err.kind, ErrorKind::InvalidSyntax);
}

#[test]
fn destructuring_declarations() {
    let (program, interner) = parse_ok("const [a, b: String] = pair; var [] = 1");
    let NodeKind::Destructure(destructure) = &program.statements[0].kind else {
        panic!("expected a destructuring declaration");
    };
    assert!(destructure.modifiers.constant);
    let names: Vec<_> = destructure
        .targets
        .iter()
        .map(|t| interner.lookup(t.name))
        .collect();
    assert_eq!(names, vec!["a", "b"]);
    assert!(destructure.targets[0].ty.is_none());
    assert_eq!(sexpr(destructure.targets[1].ty.as_ref().unwrap(), &interner), "String");
    assert_eq!(sexpr(&destructure.value, &interner), "pair");

    let NodeKind::Destructure(empty) = &program.statements[1].kind else {
        panic!("expected a destructuring declaration");
    };
    assert!(empty.targets.is_empty());

    assert_eq!(parse_err("var [a, b]").kind, ErrorKind::InvalidSyntax);
}

#[test]
fn class_with_two_inits_is_rejected() {
    let err = parse_err("class A { init() {} init() {} }");
    assert!(err.details.starts_with("Class already has an 'init' method"));
}

#[test]
fn namespaces() {
    let (program, interner) = parse_ok("mutable namespace N { var a = 1; local b = 2 } N.a");
    assert_eq!(program.statements.len(), 2);
    let NodeKind::Namespace(def) = &program.statements[0].kind else {
        panic!("expected namespace");
    };
    assert!(def.mutable);
    assert!(def.declares);
    assert_eq!(def.name.map(|n| interner.lookup(n)), Some("N"));
    assert_eq!(def.body.len(), 2);
}

#[test]
fn try_catch() {
    let (program, _) = parse_ok("try { throw('E', 'x') } catch { err } 1");
    assert_eq!(program.statements.len(), 2);
    assert!(matches!(program.statements[0].kind, NodeKind::Try { .. }));
}

#[test]
fn errors_name_the_construct() {
    let err = parse_err("var = 1");
    assert_eq!(
        err.details,
        "Expected identifier, found '=' while parsing a declaration"
    );
    assert_eq!(err.position.column, 4);
}

#[test]
fn unclosed_block_reports_expected_brace() {
    let err = parse_err("if a { 1 ");
    assert_eq!(err.details, "Expected '}', found end of file while parsing a block");
}

#[test]
fn empty_program() {
    let (program, _) = parse_ok(" ; ; ");
    assert!(program.statements.is_empty());
}

proptest! {
    #[test]
    fn subtraction_chains_nest_left(values in proptest::collection::vec(0u16..1000, 2..8)) {
        let source = values
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(" - ");
        let mut expected = values[0].to_string();
        for v in &values[1..] {
            expected = format!("(- {expected} {v})");
        }
        prop_assert_eq!(single_expr(&source), expected);
    }

    #[test]
    fn multiplication_binds_tighter_than_addition(a in 0u16..100, b in 0u16..100, c in 0u16..100) {
        prop_assert_eq!(
            single_expr(&format!("{a} + {b} * {c}")),
            format!("(+ {a} (* {b} {c}))")
        );
        prop_assert_eq!(
            single_expr(&format!("{a} * {b} + {c}")),
            format!("(+ (* {a} {b}) {c})")
        );
    }
}
