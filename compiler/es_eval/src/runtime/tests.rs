#![allow(clippy::unwrap_used, clippy::expect_used)]

use es_diagnostic::ErrorKind;
use pretty_assertions::assert_eq;

use super::*;
use crate::io::{buffer_handler, silent_handler};

fn runtime() -> Runtime {
    Runtime::builder().print_handler(buffer_handler()).build()
}

#[test]
fn default_limits() {
    let limits = Limits::default();
    assert_eq!(limits.max_call_depth, 10_000);
    assert_eq!(limits.max_steps, None);
    assert_eq!(limits.timeout, None);
}

#[test]
fn builder_sets_limits() {
    let rt = Runtime::builder()
        .max_call_depth(12)
        .max_steps(500)
        .timeout(Duration::from_secs(1))
        .print_handler(silent_handler())
        .build();
    assert_eq!(
        rt.limits(),
        &Limits {
            max_call_depth: 12,
            max_steps: Some(500),
            timeout: Some(Duration::from_secs(1)),
        }
    );
}

#[test]
fn root_holds_the_builtins() {
    let rt = runtime();
    let root = rt.root().id();
    assert!(rt.contexts().is_initialised(root).unwrap());
    for name in ["print", "true", "inf", "Number", "num", "__symbols__"] {
        let found = rt.contexts().lookup(root, rt.interner().intern(name));
        assert_eq!(found.is_ok(), name != "num", "{name}");
    }
}

#[test]
fn run_collects_statement_values() {
    let rt = runtime();
    let outcome = rt.run("1; 'two'; [3]", RunOptions::default());
    assert!(outcome.is_ok());
    assert_eq!(outcome.value.repr(), "[1, 'two', [3]]");
    assert_eq!(outcome.last_value().repr(), "[3]");
    assert_eq!(outcome.values().len(), 3);
}

#[test]
fn failed_runs_have_no_value() {
    let rt = runtime();
    let outcome = rt.run("1; nope", RunOptions::default());
    assert!(!outcome.is_ok());
    assert!(outcome.value.is_undefined());
    assert!(outcome.values().is_empty());
    assert_eq!(outcome.error.unwrap().kind, ErrorKind::Reference);
}

#[test]
fn timing_counts_nodes() {
    let rt = runtime();
    let outcome = rt.run("1 + 2", RunOptions::default());
    assert_eq!(outcome.timing.nodes_evaluated, 3);
    assert_eq!(
        outcome.timing.total(),
        outcome.timing.lex + outcome.timing.parse + outcome.timing.interpret
    );
}

#[test]
fn file_names_reach_positions() {
    let rt = runtime();
    let outcome = rt.run(
        "\n  missing",
        RunOptions {
            file_name: Some("script.es".to_owned()),
            ..RunOptions::default()
        },
    );
    let e = outcome.error.unwrap();
    assert_eq!(e.position.to_string(), "script.es:2:3");
}

#[test]
fn module_contexts_expose_main_and_path() {
    let rt = Runtime::builder()
        .print_handler(buffer_handler())
        .base_dir("/srv/scripts")
        .build();
    assert_eq!(rt.base_dir(), Some(Path::new("/srv/scripts")));
    let outcome = rt.run("[__main__, __path__]", RunOptions::default());
    assert_eq!(outcome.last_value().repr(), "[true, '/srv/scripts']");

    let outcome = rt.run(
        "__path__",
        RunOptions {
            current_dir: Some(PathBuf::from("/elsewhere")),
            ..RunOptions::default()
        },
    );
    assert_eq!(outcome.last_value().to_string(), "/elsewhere");
}

#[test]
fn running_in_an_uninitialised_root_is_refused() {
    let rt = runtime();
    let detached = rt.contexts().create_root(None);
    let outcome = rt.run(
        "1",
        RunOptions {
            context: Some(detached),
            ..RunOptions::default()
        },
    );
    assert_eq!(outcome.error.unwrap().kind, ErrorKind::InvalidOperation);
}

#[test]
fn runs_do_not_leak_scopes() {
    let rt = runtime();
    let before = rt.contexts().live_count();
    let outcome = rt.run(
        "var t = 0; for i in range(10) { var y = i; t += y }; [1, 2].map(func (x) x * t)",
        RunOptions::default(),
    );
    assert!(outcome.is_ok());
    drop(outcome);
    assert_eq!(rt.contexts().live_count(), before);
}

#[test]
fn frames_that_declare_functions_are_freed() {
    let rt = runtime();
    let before = rt.contexts().live_count();
    let outcome = rt.run(
        "func outer() { func inner() 1; inner() }; for i in range(1000) { outer() }; 0",
        RunOptions::default(),
    );
    assert!(outcome.is_ok());
    // Only the module survives, through `outer` in the statement values.
    assert_eq!(rt.contexts().live_count(), before + 1);

    drop(outcome);
    assert_eq!(rt.contexts().collect_cycles(), 1);
    assert_eq!(rt.contexts().live_count(), before);
}

#[test]
fn returned_functions_keep_their_module_alive() {
    let rt = runtime();
    let before = rt.contexts().live_count();
    let outcome = rt.run("var k = 5; func f() k; f", RunOptions::default());
    assert!(matches!(outcome.last_value(), Value::Function(_)));
    assert_eq!(rt.contexts().live_count(), before + 1);

    drop(outcome);
    assert_eq!(rt.contexts().collect_cycles(), 1);
    assert_eq!(rt.contexts().live_count(), before);
}

#[test]
fn static_fields_do_not_pin_their_module() {
    let rt = runtime();
    let before = rt.contexts().live_count();
    let outcome = rt.run("class K { static make = func () K() }; K.make(); 0", RunOptions::default());
    assert!(outcome.is_ok());
    // The module and the class body scope, held through `K`.
    assert_eq!(rt.contexts().live_count(), before + 2);

    drop(outcome);
    assert_eq!(rt.contexts().collect_cycles(), 2);
    assert_eq!(rt.contexts().live_count(), before);
}

#[test]
fn computed_names_are_not_interned() {
    let rt = runtime();
    let ctx = rt.new_module_context(None).unwrap();
    let options = || RunOptions {
        context: Some(ctx.clone()),
        ..RunOptions::default()
    };
    assert!(rt.run("mutable namespace N { var a = 1 }", options()).is_ok());
    let before = rt.interner().len();

    let outcome = rt.run("[N['un' + 'seen'], ('mis' + 'sing') in N]", options());
    assert_eq!(outcome.last_value().repr(), "[undefined, false]");
    let e = rt.run("N['ne' + 'w'] = 1", options()).error.unwrap();
    assert_eq!(e.kind, ErrorKind::Reference);
    assert_eq!(e.details, "new is not defined");
    let e = rt.run("delete('gh' + 'ost')", options()).error.unwrap();
    assert_eq!(e.kind, ErrorKind::Reference);
    assert_eq!(rt.interner().len(), before);
}

#[test]
fn output_captures_print() {
    let rt = runtime();
    rt.run("print('a', 1, [2]); print()", RunOptions::default());
    assert_eq!(rt.output(), "a1[2]\n\n");
    rt.print_handler().clear();
    assert_eq!(rt.output(), "");
}

#[test]
fn interner_is_shared_with_the_host() {
    let interner = SharedInterner::new();
    let rt = Runtime::builder()
        .interner(interner.clone())
        .print_handler(silent_handler())
        .build();
    let name = interner.intern("from_host");
    assert_eq!(rt.interner().lookup(name), "from_host");
    assert_eq!(rt.shared_interner().intern("from_host"), name);
}
