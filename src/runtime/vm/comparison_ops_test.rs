use crate::bytecode::op_code::OpCode;
use crate::runtime::value::Value;

use super::comparison_ops::compare;

fn check(op: OpCode, left: Value, right: Value) -> bool {
    match compare(op, &left, &right) {
        Ok(Value::Bool(result)) => result,
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn numbers_compare_across_int_and_float() {
    assert!(check(OpCode::OpLessThan, Value::Int(1), Value::Float(1.5)));
    assert!(check(OpCode::OpGreaterEqual, Value::Float(2.0), Value::Int(2)));
    assert!(check(OpCode::OpEqual, Value::Int(3), Value::Float(3.0)));
}

#[test]
fn strings_order_lexicographically() {
    assert!(check(OpCode::OpLessThan, Value::string("abc"), Value::string("abd")));
    assert!(!check(OpCode::OpGreaterThan, Value::string("a"), Value::string("b")));
}

#[test]
fn nan_is_unordered() {
    assert!(!check(OpCode::OpLessThan, Value::Float(f64::NAN), Value::Int(1)));
    assert!(!check(OpCode::OpGreaterEqual, Value::Float(f64::NAN), Value::Int(1)));
    assert!(check(OpCode::OpNotEqual, Value::Float(f64::NAN), Value::Float(f64::NAN)));
}

#[test]
fn equality_between_types_is_false_but_ordering_fails() {
    assert!(!check(OpCode::OpEqual, Value::Null, Value::Bool(false)));
    assert!(compare(OpCode::OpLessThan, &Value::Null, &Value::Int(1)).is_err());
}

#[test]
fn lists_compare_by_identity() {
    let list = Value::list(vec![]);
    assert!(check(OpCode::OpEqual, list.clone(), list));
    assert!(!check(OpCode::OpEqual, Value::list(vec![]), Value::list(vec![])));
}
