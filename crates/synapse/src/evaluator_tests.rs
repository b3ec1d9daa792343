// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn eval_ok(condition: &str, value: serde_json::Value) -> bool {
    match evaluate(condition, &value) {
        Ok(b) => b,
        Err(e) => panic!("{condition}: {e}"),
    }
}

#[test]
fn numeric_comparisons() {
    assert!(eval_ok("value > 90", json!(95)));
    assert!(!eval_ok("value > 90", json!(80)));
    assert!(eval_ok("value >= 90", json!(90)));
    assert!(eval_ok("value < 0.5", json!(0.25)));
    assert!(eval_ok("value <= -1", json!(-3)));
    assert!(eval_ok("value != 7", json!(8)));
    assert!(eval_ok("value == 1", json!(1.0)));
}

#[test]
fn boolean_connectives() {
    assert!(eval_ok("value > 10 && value < 20", json!(15)));
    assert!(!eval_ok("value > 10 && value < 20", json!(25)));
    assert!(eval_ok("value < 10 || value > 20", json!(25)));
    assert!(eval_ok("!(value > 10)", json!(5)));
    assert!(eval_ok("!false", json!(null)));
}

#[test]
fn connectives_short_circuit() {
    // The right-hand side would fail on a number; it must not run.
    assert!(!eval_ok("value > 100 && value.cpu > 1", json!(5)));
    assert!(eval_ok("value < 100 || value.cpu > 1", json!(5)));
}

#[test]
fn string_equality() {
    assert!(eval_ok("value == 'down'", json!("down")));
    assert!(eval_ok("value != \"up\"", json!("down")));
    assert!(!eval_ok("value == 'down'", json!("up")));
}

#[test]
fn arithmetic() {
    assert!(eval_ok("value * 2 >= 10", json!(5)));
    assert!(eval_ok("value + 1 == 6", json!(5)));
    assert!(eval_ok("value % 2 == 1", json!(5)));
    assert!(eval_ok("value / 4 > 1", json!(5)));
    assert!(eval_ok("-value == 0 - 5", json!(5)));
    assert!(eval_ok("(value + 1) * 2 == 12", json!(5)));
}

#[test]
fn member_and_index_access() {
    assert!(eval_ok("value.cpu > 40", json!({"cpu": 42})));
    assert!(eval_ok("value['cpu'] > 40", json!({"cpu": 42})));
    assert!(eval_ok("value[0] == 'a'", json!(["a", "b"])));
    assert!(eval_ok("value.disk.used > 90", json!({"disk": {"used": 95}})));
    // Missing members and out-of-range indexes resolve to null.
    assert!(eval_ok("value.missing == null", json!({"cpu": 42})));
    assert!(eval_ok("value[9] == null", json!(["a"])));
}

#[test]
fn parse_errors() {
    assert!(matches!(evaluate("value >", &json!(1)), Err(EvalError::Parse(_))));
    assert!(matches!(evaluate("value = 1", &json!(1)), Err(EvalError::Parse(_))));
    assert!(matches!(evaluate("(value > 1", &json!(1)), Err(EvalError::Parse(_))));
    assert!(matches!(evaluate("value > 1 value", &json!(1)), Err(EvalError::Parse(_))));
    assert!(matches!(evaluate("cpu > 1", &json!(1)), Err(EvalError::Parse(_))));
    assert!(matches!(evaluate("value > 1 @", &json!(1)), Err(EvalError::Parse(_))));
}

#[test]
fn exec_errors() {
    assert!(matches!(evaluate("value > 'x'", &json!(1)), Err(EvalError::Exec(_))));
    assert!(matches!(evaluate("value && true", &json!(1)), Err(EvalError::Exec(_))));
    assert!(matches!(evaluate("value.cpu > 1", &json!(3)), Err(EvalError::Exec(_))));
    assert!(matches!(evaluate("!value", &json!("no")), Err(EvalError::Exec(_))));
    assert!(matches!(evaluate("value / 0 > 1", &json!(1)), Err(EvalError::Exec(_))));
}

#[test]
fn non_boolean_results() {
    assert!(matches!(evaluate("value + 1", &json!(1)), Err(EvalError::NotBool(_))));
    assert!(matches!(evaluate("value", &json!("up")), Err(EvalError::NotBool(_))));
    assert!(matches!(evaluate("value.cpu", &json!({"cpu": 1})), Err(EvalError::NotBool(_))));
}

#[test]
fn errors_are_distinct_kinds() {
    // A caller that matched on one kind must not see another.
    assert!(matches!(evaluate("", &json!(1)), Err(EvalError::Parse(_))));
    assert!(matches!(evaluate("value", &json!(1)), Err(EvalError::NotBool(_))));
    assert!(matches!(evaluate("value < null", &json!(1)), Err(EvalError::Exec(_))));
}
