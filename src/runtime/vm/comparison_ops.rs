use std::cmp::Ordering;

use crate::bytecode::op_code::OpCode;
use crate::runtime::{
    errors::{RuntimeError, RuntimeResult},
    value::Value,
};

pub(crate) fn compare(op: OpCode, left: &Value, right: &Value) -> RuntimeResult<Value> {
    let result = match op {
        OpCode::OpEqual => left == right,
        OpCode::OpNotEqual => left != right,
        _ => {
            // NaN compares false under every ordering.
            let Some(ordering) = ordering(left, right)? else {
                return Ok(Value::Bool(false));
            };
            match op {
                OpCode::OpLessThan => ordering == Ordering::Less,
                OpCode::OpLessEqual => ordering != Ordering::Greater,
                OpCode::OpGreaterThan => ordering == Ordering::Greater,
                OpCode::OpGreaterEqual => ordering != Ordering::Less,
                _ => {
                    return Err(RuntimeError::InvalidBytecode(format!(
                        "{} is not a comparison",
                        op
                    )));
                }
            }
        }
    };
    Ok(Value::Bool(result))
}

/// Ordering is defined for numbers and strings only.
fn ordering(left: &Value, right: &Value) -> RuntimeResult<Option<Ordering>> {
    match (left, right) {
        (Value::Int(l), Value::Int(r)) => Ok(Some(l.cmp(r))),
        (Value::Int(l), Value::Float(r)) => Ok((*l as f64).partial_cmp(r)),
        (Value::Float(l), Value::Int(r)) => Ok(l.partial_cmp(&(*r as f64))),
        (Value::Float(l), Value::Float(r)) => Ok(l.partial_cmp(r)),
        (Value::Str(l), Value::Str(r)) => Ok(Some(l.cmp(r))),
        _ => Err(RuntimeError::type_mismatch(format!(
            "cannot order {} and {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}
