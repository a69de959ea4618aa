use crate::bytecode::op_code::OpCode;
use crate::runtime::{
    errors::{RuntimeError, RuntimeResult},
    value::Value,
};

/// `+ - * / %`. Ints wrap, any float operand promotes, strings and lists
/// concatenate with `+`.
pub(crate) fn arithmetic(op: OpCode, left: &Value, right: &Value) -> RuntimeResult<Value> {
    match (left, right) {
        (Value::Int(l), Value::Int(r)) => integer_op(op, *l, *r),
        (Value::Float(l), Value::Float(r)) => float_op(op, *l, *r),
        (Value::Int(l), Value::Float(r)) => float_op(op, *l as f64, *r),
        (Value::Float(l), Value::Int(r)) => float_op(op, *l, *r as f64),
        (Value::Str(l), Value::Str(r)) if op == OpCode::OpAdd => {
            let mut joined = String::with_capacity(l.len() + r.len());
            joined.push_str(l);
            joined.push_str(r);
            Ok(Value::string(joined))
        }
        (Value::List(l), Value::List(r)) if op == OpCode::OpAdd => {
            let mut joined = l.borrow().clone();
            joined.extend(r.borrow().iter().cloned());
            Ok(Value::list(joined))
        }
        _ => Err(RuntimeError::type_mismatch(format!(
            "cannot {} {} and {}",
            op_name(op),
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn integer_op(op: OpCode, l: i64, r: i64) -> RuntimeResult<Value> {
    let result = match op {
        OpCode::OpAdd => l.wrapping_add(r),
        OpCode::OpSub => l.wrapping_sub(r),
        OpCode::OpMul => l.wrapping_mul(r),
        OpCode::OpDiv | OpCode::OpMod if r == 0 => return Err(RuntimeError::DivideByZero),
        OpCode::OpDiv => l.wrapping_div(r),
        OpCode::OpMod => l.wrapping_rem(r),
        _ => return Err(unknown_operator(op)),
    };
    Ok(Value::Int(result))
}

fn float_op(op: OpCode, l: f64, r: f64) -> RuntimeResult<Value> {
    let result = match op {
        OpCode::OpAdd => l + r,
        OpCode::OpSub => l - r,
        OpCode::OpMul => l * r,
        OpCode::OpDiv => l / r,
        OpCode::OpMod => l % r,
        _ => return Err(unknown_operator(op)),
    };
    Ok(Value::Float(result))
}

pub(crate) fn negate(value: &Value) -> RuntimeResult<Value> {
    match value {
        Value::Int(v) => Ok(Value::Int(v.wrapping_neg())),
        Value::Float(v) => Ok(Value::Float(-v)),
        other => Err(RuntimeError::type_mismatch(format!(
            "cannot negate {}",
            other.type_name()
        ))),
    }
}

fn op_name(op: OpCode) -> &'static str {
    match op {
        OpCode::OpAdd => "add",
        OpCode::OpSub => "subtract",
        OpCode::OpMul => "multiply",
        OpCode::OpDiv => "divide",
        OpCode::OpMod => "take the remainder of",
        _ => "combine",
    }
}

fn unknown_operator(op: OpCode) -> RuntimeError {
    RuntimeError::InvalidBytecode(format!("{} is not an arithmetic operator", op))
}
