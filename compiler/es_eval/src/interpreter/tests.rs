#![allow(clippy::unwrap_used, clippy::expect_used)]

use es_diagnostic::ErrorKind;
use pretty_assertions::assert_eq;

use super::*;
use crate::context::ContextRef;
use crate::io::silent_handler;

fn runtime() -> Runtime {
    Runtime::builder().print_handler(silent_handler()).build()
}

fn parse(rt: &Runtime, source: &str) -> Program {
    let tokens = es_lexer::generate(source, None, rt.interner()).unwrap();
    es_parse::parse(&tokens, rt.interner()).unwrap()
}

fn module(rt: &Runtime) -> ContextRef {
    rt.new_module_context(None).unwrap()
}

fn lookup(rt: &Runtime, ctx: &ContextRef, name: &str) -> Value {
    rt.contexts()
        .lookup(ctx.id(), rt.interner().intern(name))
        .unwrap()
}

const FLAG: &str = "
class Flag {
    init(on) { this.on = on }
    __bool__() this.on;
    __str__() 'Flag(' + this.on + ')'
}
var yes = Flag(true);
var no = Flag(false);
";

#[test]
fn a_parsed_node_can_be_evaluated_repeatedly() {
    let rt = runtime();
    let ctx = module(&rt);
    let setup = parse(&rt, "var count = 0");
    let step = parse(&rt, "count = count + 1");

    let mut interp = Interpreter::new(&rt);
    interp.run_program(&setup, ctx.id()).unwrap();
    for _ in 0..3 {
        interp.eval(&step.statements[0], ctx.id()).map_err(ControlAction::into_error).unwrap();
    }
    assert_eq!(lookup(&rt, &ctx, "count").to_string(), "3");
    assert!(interp.steps() > 3);
}

#[test]
fn overloads_drive_truthiness_and_display() {
    let rt = runtime();
    let ctx = module(&rt);
    let program = parse(&rt, FLAG);
    let mut interp = Interpreter::new(&rt);
    interp.run_program(&program, ctx.id()).unwrap();

    let yes = lookup(&rt, &ctx, "yes");
    let no = lookup(&rt, &ctx, "no");
    assert!(interp.truthy(&yes, ctx.id()).unwrap());
    assert!(!interp.truthy(&no, ctx.id()).unwrap());
    assert_eq!(interp.display(&yes, ctx.id()).unwrap(), "Flag(true)");
    assert_eq!(interp.display(&Value::from(2.5), ctx.id()).unwrap(), "2.5");
}

#[test]
fn conformance_follows_the_class_chain() {
    let rt = runtime();
    let ctx = module(&rt);
    let program = parse(&rt, FLAG);
    let mut interp = Interpreter::new(&rt);
    interp.run_program(&program, ctx.id()).unwrap();

    let Value::Type(flag) = lookup(&rt, &ctx, "Flag") else {
        panic!("expected a class");
    };
    let yes = lookup(&rt, &ctx, "yes");
    let types = rt.types();
    assert!(interp.conforms(&flag, &yes));
    assert!(interp.conforms(types.get(Primitive::Object), &yes));
    assert!(interp.conforms(types.get(Primitive::Any), &yes));
    assert!(!interp.conforms(types.get(Primitive::Number), &yes));
    assert!(!interp.conforms(&flag, &Value::from(1.0)));
    assert!(interp.conforms(types.get(Primitive::Number), &Value::from(1.0)));
}

#[test]
fn class_members() {
    let rt = runtime();
    let ctx = module(&rt);
    let program = parse(&rt, FLAG);
    let mut interp = Interpreter::new(&rt);
    interp.run_program(&program, ctx.id()).unwrap();

    let flag = lookup(&rt, &ctx, "Flag");
    assert_eq!(interp.get_member(&flag, "name").unwrap().to_string(), "Flag");
    let Value::Type(parent) = interp.get_member(&flag, "extends").unwrap() else {
        panic!("expected a parent type");
    };
    assert_eq!(parent.name(), "Object");

    let Value::Array(instances) = interp.get_member(&flag, "instances").unwrap() else {
        panic!("expected an array");
    };
    assert_eq!(instances.borrow().len(), 2);

    let yes = lookup(&rt, &ctx, "yes");
    assert!(matches!(interp.get_member(&yes, "constructor").unwrap(), Value::Type(_)));
    assert_eq!(interp.get_member(&yes, "on").unwrap().to_string(), "true");
    assert!(interp.get_member(&yes, "missing").unwrap().is_undefined());
}

#[test]
fn length_members() {
    let rt = runtime();
    let mut interp = Interpreter::new(&rt);
    let items = Value::array(vec![Value::from(1.0), Value::from(2.0)]);
    assert_eq!(interp.get_member(&items, "length").unwrap().to_string(), "2");
    assert_eq!(interp.get_member(&Value::from("héllo"), "length").unwrap().to_string(), "5");
    assert_eq!(interp.get_index(&items, &Value::from("length")).unwrap().to_string(), "2");
}

#[test]
fn reading_a_member_of_undefined_fails() {
    let rt = runtime();
    let mut interp = Interpreter::new(&rt);
    let e = interp
        .get_member(&Value::Undefined, "x")
        .map_err(ControlAction::into_error)
        .unwrap_err();
    assert_eq!(e.kind, ErrorKind::Type);
    assert_eq!(e.details, "Cannot read property 'x' of undefined");
}

#[test]
fn calling_a_non_callable_value() {
    let rt = runtime();
    let ctx = module(&rt);
    let mut interp = Interpreter::new(&rt);
    let e = interp
        .call_value(&Value::from(1.0), None, &[Value::from("x")], ctx.id(), &Position::UNKNOWN)
        .map_err(ControlAction::into_error)
        .unwrap_err();
    assert_eq!(e.kind, ErrorKind::Type);
    assert_eq!(e.details, "'1' is not callable");
    assert_eq!(e.traceback.len(), 1);
    assert_eq!(e.traceback[0].line, "Number('x')");
}

#[test]
fn stray_control_flow_becomes_syntax_errors() {
    let e = ControlAction::Break.into_error();
    assert_eq!(e.kind, ErrorKind::InvalidSyntax);
    assert_eq!(e.details, "'break' outside of a loop");
    assert_eq!(
        ControlAction::Return(Value::Undefined).into_error().details,
        "'return' outside of a function"
    );
}

#[test]
fn errors_pick_up_the_failing_node_position() {
    let rt = runtime();
    let ctx = module(&rt);
    let mut interp = Interpreter::new(&rt);
    let e = interp
        .run_program(&parse(&rt, "1;\n   nowhere"), ctx.id())
        .unwrap_err();
    assert_eq!(e.kind, ErrorKind::Reference);
    assert_eq!((e.position.line, e.position.column), (1, 3));
}
