use crate::bytecode::op_code::OpCode;
use crate::runtime::{errors::RuntimeError, value::Value};

use super::binary_ops::{arithmetic, negate};

#[test]
fn add_integers() {
    assert_eq!(
        arithmetic(OpCode::OpAdd, &Value::Int(2), &Value::Int(3)),
        Ok(Value::Int(5))
    );
}

#[test]
fn integer_overflow_wraps() {
    assert_eq!(
        arithmetic(OpCode::OpAdd, &Value::Int(i64::MAX), &Value::Int(1)),
        Ok(Value::Int(i64::MIN))
    );
    assert_eq!(negate(&Value::Int(i64::MIN)), Ok(Value::Int(i64::MIN)));
}

#[test]
fn mixed_numbers_promote_to_float() {
    let result = arithmetic(OpCode::OpMul, &Value::Int(2), &Value::Float(1.5));
    assert!(matches!(result, Ok(Value::Float(v)) if v == 3.0));
}

#[test]
fn integer_division_truncates_and_rejects_zero() {
    assert_eq!(
        arithmetic(OpCode::OpDiv, &Value::Int(7), &Value::Int(2)),
        Ok(Value::Int(3))
    );
    assert_eq!(
        arithmetic(OpCode::OpMod, &Value::Int(7), &Value::Int(0)),
        Err(RuntimeError::DivideByZero)
    );
    let result = arithmetic(OpCode::OpDiv, &Value::Float(1.0), &Value::Int(0));
    assert!(matches!(result, Ok(Value::Float(v)) if v.is_infinite()));
}

#[test]
fn strings_and_lists_concatenate() {
    assert_eq!(
        arithmetic(OpCode::OpAdd, &Value::string("ab"), &Value::string("c")),
        Ok(Value::string("abc"))
    );
    let joined = arithmetic(
        OpCode::OpAdd,
        &Value::list(vec![Value::Int(1)]),
        &Value::list(vec![Value::Int(2)]),
    )
    .expect("concatenate");
    assert_eq!(joined.to_string(), "[1, 2]");
}

#[test]
fn mismatched_operands_are_rejected() {
    assert_eq!(
        arithmetic(OpCode::OpAdd, &Value::string("a"), &Value::Int(1)),
        Err(RuntimeError::TypeMismatch(
            "cannot add String and Int".to_string()
        ))
    );
    assert!(negate(&Value::Bool(true)).is_err());
}
