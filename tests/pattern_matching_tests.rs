//! Match expression tests: pattern forms, guards, case order, and the
//! typing of match expressions.

use rill::interpreter::{evaluate, RuntimeError, Value};
use rill::parser::parse;
use rill::types::TypeError;
use rill::{infer_and_solve, run_program};

fn run(source: &str) -> Value {
    let program = parse(source).expect("parsing failed");
    evaluate(&program).expect("evaluation failed")
}

fn run_err(source: &str) -> RuntimeError {
    let program = parse(source).expect("parsing failed");
    evaluate(&program).expect_err("expected a runtime error")
}

fn assert_string(value: Value, expected: &str) {
    match value {
        Value::Str(s) => assert_eq!(s, expected),
        other => panic!("expected string, got {:?}", other),
    }
}

fn assert_number(value: Value, expected: f64) {
    match value {
        Value::Number(n) => assert_eq!(n, expected),
        other => panic!("expected number, got {:?}", other),
    }
}

// ── The guard/literal/wildcard scenario ────────────────────────────────

fn sign_match(discriminant: &str) -> Value {
    run(&format!(
        r#"match {} {{ x if x < 0 => "neg", 0 => "zero", _ => "pos" }}"#,
        discriminant
    ))
}

#[test]
fn guard_selects_negative() {
    assert_string(sign_match("-1"), "neg");
}

#[test]
fn literal_selects_zero() {
    assert_string(sign_match("0"), "zero");
}

#[test]
fn wildcard_selects_rest() {
    assert_string(sign_match("5"), "pos");
}

// ── Pattern forms ──────────────────────────────────────────────────────

#[test]
fn string_literal_patterns() {
    assert_number(
        run(r#"match "b" { "a" => 1, "b" => 2, _ => 3 }"#),
        2.0,
    );
}

#[test]
fn boolean_literal_patterns() {
    assert_string(run(r#"match true { true => "yes", false => "no" }"#), "yes");
}

#[test]
fn null_pattern() {
    assert_string(run(r#"match null { null => "nothing", _ => "something" }"#), "nothing");
}

#[test]
fn identifier_pattern_binds_the_discriminant() {
    assert_number(run("match 21 { n => n * 2 }"), 42.0);
}

#[test]
fn identifier_binding_is_scoped_to_its_case() {
    // The binding from the first case must not leak into the program.
    let program = parse("match 1 { n => n }; n").unwrap();
    assert!(matches!(
        evaluate(&program),
        Err(RuntimeError::UndefinedVariable { name, .. }) if name == "n"
    ));
}

// ── Case selection order ───────────────────────────────────────────────

#[test]
fn first_matching_case_wins() {
    assert_number(run("match 1 { _ => 10, 1 => 20 }"), 10.0);
}

#[test]
fn failed_guard_falls_through_to_later_cases() {
    assert_string(
        run(r#"match 5 { x if x > 10 => "big", x if x > 1 => "medium", _ => "small" }"#),
        "medium",
    );
}

#[test]
fn guard_sees_the_bound_name() {
    assert_number(run("match 7 { n if n % 2 == 1 => n, _ => 0 }"), 7.0);
}

#[test]
fn no_matching_case_is_a_runtime_error() {
    assert!(matches!(
        run_err(r#"match 5 { 0 => "zero", 1 => "one" }"#),
        RuntimeError::NoMatchingPattern { .. }
    ));
}

#[test]
fn structural_equality_selects_literal_patterns() {
    // Kind mismatch means no match, not an error.
    assert_string(
        run(r#"match "0" { 0 => "number", _ => "other" }"#),
        "other",
    );
}

// ── Typing of match expressions ────────────────────────────────────────

#[test]
fn match_types_to_its_first_case_body() {
    let value = run_program(r#"match 5 { x if x < 0 => "neg", 0 => "zero", _ => "pos" }"#)
        .expect("program failed");
    assert_string(value, "pos");
}

#[test]
fn disagreeing_case_bodies_fail_inference() {
    let program = parse(r#"match 1 { 0 => "zero", _ => 1 }"#).unwrap();
    assert!(matches!(
        infer_and_solve(&program, None),
        Err(TypeError::Mismatch { .. })
    ));
}

#[test]
fn non_boolean_guard_fails_inference() {
    let program = parse("match 1 { x if x + 1 => 1, _ => 2 }").unwrap();
    assert!(matches!(
        infer_and_solve(&program, None),
        Err(TypeError::Mismatch { .. })
    ));
}

#[test]
fn bound_pattern_name_is_polymorphic_over_the_discriminant() {
    // The identifier pattern generalizes the discriminant's type, so a
    // polymorphic discriminant can be used at two types in the body.
    let value = run_program("match (x) => x { f => if (f(true)) f(1) else 0 }")
        .expect("program failed");
    assert_number(value, 1.0);
}

#[test]
fn match_on_computed_discriminant() {
    assert_string(
        run(r#"let classify = (n) => match n % 3 { 0 => "fizz", _ => "other" }; classify(9)"#),
        "fizz",
    );
}
