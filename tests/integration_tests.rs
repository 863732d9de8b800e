//! End-to-end tests driving the full pipeline: parse, infer, evaluate.

use rill::types::Type;
use rill::{infer_and_solve, parse, run_program, Error, Value};

fn run(source: &str) -> Value {
    run_program(source).expect("program failed")
}

fn assert_number(value: Value, expected: f64) {
    match value {
        Value::Number(n) => assert_eq!(n, expected),
        other => panic!("expected number, got {:?}", other),
    }
}

fn assert_string(value: Value, expected: &str) {
    match value {
        Value::Str(s) => assert_eq!(s, expected),
        other => panic!("expected string, got {:?}", other),
    }
}

fn assert_bool(value: Value, expected: bool) {
    match value {
        Value::Boolean(b) => assert_eq!(b, expected),
        other => panic!("expected boolean, got {:?}", other),
    }
}

// ── The end-to-end scenarios ───────────────────────────────────────────

#[test]
fn e2e_add_function() {
    let source = "let add = (x, y) => x + y; add(5, 10)";
    assert_number(run(source), 15.0);

    let env = infer_and_solve(&parse(source).unwrap(), None).unwrap();
    assert_eq!(
        env.lookup("add").unwrap().ty,
        Type::function(vec![Type::Number, Type::Number], Type::Number)
    );
}

#[test]
fn e2e_let_polymorphism() {
    let source = r#"let id = (x) => x; let a = id(42); let b = id("hi"); b"#;
    assert_string(run(source), "hi");

    let env = infer_and_solve(&parse(source).unwrap(), None).unwrap();
    assert_eq!(env.lookup("a").unwrap().ty, Type::Number);
    assert_eq!(env.lookup("b").unwrap().ty, Type::Str);
}

#[test]
fn e2e_row_polymorphic_accessor() {
    assert_number(run("let getX = (p) => p.x; getX({ x: 1, y: 2 })"), 1.0);
    assert_number(
        run("let getX = (p) => p.x; getX({ x: 3, y: 4, z: 5 })"),
        3.0,
    );
}

#[test]
fn e2e_mutual_recursion() {
    let group = "let even = (n) => if (n == 0) true else odd(n - 1) \
                 and odd = (n) => if (n == 0) false else even(n - 1); ";
    assert_bool(run(&format!("{} even(4)", group)), true);
    assert_bool(run(&format!("{} odd(7)", group)), true);
}

#[test]
fn e2e_match_with_guards() {
    let template = |d: &str| {
        format!(
            r#"match {} {{ x if x < 0 => "neg", 0 => "zero", _ => "pos" }}"#,
            d
        )
    };
    assert_string(run(&template("5")), "pos");
    assert_string(run(&template("-1")), "neg");
    assert_string(run(&template("0")), "zero");
}

#[test]
fn e2e_annotated_array() {
    assert_number(run("let nums: [number] = [1, 2, 3]; nums[0] + nums[1] + nums[2]"), 6.0);

    let result = run_program("let nums: Array<string> = [1, 2, 3]; nums[0]");
    assert!(matches!(result, Err(Error::Type(_))));
}

// ── Progress: inference failure prevents evaluation ────────────────────

#[test]
fn type_errors_stop_the_pipeline() {
    assert!(matches!(run_program(r#"1 + "a""#), Err(Error::Type(_))));
    assert!(matches!(run_program("(1)(2)"), Err(Error::Parse(_)) | Err(Error::Type(_))));
}

#[test]
fn parse_errors_stop_the_pipeline() {
    assert!(matches!(run_program("let = 5"), Err(Error::Parse(_))));
}

#[test]
fn self_reference_through_data_passes_types_but_fails_at_runtime() {
    // The record case suppresses the occurs check, so this type-checks;
    // the evaluator then reports the uninitialized read.
    assert!(matches!(
        run_program("let x = { self: x }"),
        Err(Error::Runtime(_))
    ));
}

#[test]
fn runtime_errors_remain_possible_after_type_checking() {
    // Bounds violations, division by zero, dictionary misses, and
    // uninitialized recursive reads are dynamic.
    assert!(matches!(run_program("[1][5]"), Err(Error::Runtime(_))));
    assert!(matches!(run_program("1 / 0"), Err(Error::Runtime(_))));
    assert!(matches!(
        run_program(r#"let d = ["a": 1]; d["b"]"#),
        Ok(Value::Undefined)
    ));
}

// ── Programs exercising the full language ──────────────────────────────

#[test]
fn block_scoped_pipeline() {
    let source = "
        let total = {
            let xs = range(1, 6)
            let doubled = sum(xs) * 2
            doubled
        }
        total
    ";
    assert_number(run(source), 30.0);
}

#[test]
fn higher_order_functions() {
    let source = "
        let twice = (f, x) => f(f(x))
        let inc = (n) => n + 1
        twice(inc, 40)
    ";
    assert_number(run(source), 42.0);
}

#[test]
fn records_and_builtins_together() {
    let source = r#"
        let d = dictFromEntries([{ key: "a", value: 1 }, { key: "b", value: 2 }])
        dictSize(dictSet(d, "c", 3))
    "#;
    assert_number(run(source), 3.0);
}

#[test]
fn width_subtyping_at_call_sites() {
    let source = "
        let area = (rect: { w: number, h: number }) => rect.w * rect.h
        area({ w: 3, h: 4, label: 0 })
    ";
    assert_number(run(source), 12.0);
}

#[test]
fn structural_join_then_access() {
    let source = "
        let r = if (1 < 2) { x: 10, y: 1 } else { x: 20, z: 2 }
        r.x
    ";
    assert_number(run(source), 10.0);
}

#[test]
fn nested_closures_and_recursion() {
    let source = "
        let compose = (f, g) => (x) => f(g(x))
        let fib = (n) => if (n < 2) n else fib(n - 1) + fib(n - 2)
        let add1 = (n) => n + 1
        compose(fib, add1)(9)
    ";
    assert_number(run(source), 55.0);
}

#[test]
fn dictionaries_preserve_insertion_order() {
    let source = r#"
        let d = ["b": 2, "a": 1, "c": 3]
        head(dictKeys(d))
    "#;
    assert_string(run(source), "b");
}

#[test]
fn string_builtins() {
    let source = r#"substring("interpreter", 0, 5)"#;
    assert_string(run(source), "inter");
    assert_number(run(r#"strlen("hello")"#), 5.0);
}

#[test]
fn repeated_runs_are_deterministic() {
    let source = "
        let step = (acc, n) => acc * 10 + n
        step(step(step(0, 1), 2), 3)
    ";
    let first = run(source);
    let second = run(source);
    assert!(first.structural_eq(&second));
    assert_number(first, 123.0);
}

#[test]
fn program_value_is_last_statement() {
    assert_number(run("1; 2; 3"), 3.0);
    assert!(matches!(run("let x = 1"), Value::Null));
}
