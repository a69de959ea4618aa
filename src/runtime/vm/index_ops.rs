use crate::runtime::{
    errors::{RuntimeError, RuntimeResult},
    value::Value,
};

/// `container[index]`.
pub(crate) fn index(container: &Value, index: &Value) -> RuntimeResult<Value> {
    match (container, index) {
        (Value::List(elements), Value::Int(i)) => {
            let elements = elements.borrow();
            let position = normalize(*i, elements.len())?;
            Ok(elements[position].clone())
        }
        (Value::Str(text), Value::Int(i)) => {
            let len = text.chars().count();
            let position = normalize(*i, len)?;
            let ch = text
                .chars()
                .nth(position)
                .ok_or(RuntimeError::IndexOutOfBounds { index: *i, len })?;
            Ok(Value::string(ch.to_string()))
        }
        (Value::Dict(entries), key) => {
            let key = dict_key(key)?;
            Ok(entries.borrow().get(&key).cloned().unwrap_or(Value::Null))
        }
        (Value::List(_) | Value::Str(_), other) => Err(RuntimeError::expected(
            "index",
            "Int",
            other,
        )),
        (other, _) => Err(RuntimeError::expected(
            "indexing",
            "List, String or Dict",
            other,
        )),
    }
}

/// `container[index] = value`. Strings are immutable.
pub(crate) fn set_index(container: &Value, index: &Value, value: Value) -> RuntimeResult<()> {
    match (container, index) {
        (Value::List(elements), Value::Int(i)) => {
            let mut elements = elements.borrow_mut();
            let position = normalize(*i, elements.len())?;
            elements[position] = value;
            Ok(())
        }
        (Value::Dict(entries), key) => {
            let key = dict_key(key)?;
            entries.borrow_mut().insert(key, value);
            Ok(())
        }
        (Value::List(_), other) => Err(RuntimeError::expected("index", "Int", other)),
        (other, _) => Err(RuntimeError::expected(
            "index assignment",
            "List or Dict",
            other,
        )),
    }
}

pub(crate) fn get_field(object: &Value, name: &str) -> RuntimeResult<Value> {
    match object {
        Value::Struct(object) => object.borrow().get(name),
        other => Err(RuntimeError::expected(
            &format!("field `{}`", name),
            "Struct",
            other,
        )),
    }
}

pub(crate) fn set_field(object: &Value, name: &str, value: Value) -> RuntimeResult<()> {
    match object {
        Value::Struct(object) => object.borrow_mut().set(name, value),
        other => Err(RuntimeError::expected(
            &format!("field `{}`", name),
            "Struct",
            other,
        )),
    }
}

/// Negative indexes count back from the end.
fn normalize(index: i64, len: usize) -> RuntimeResult<usize> {
    let position = if index < 0 {
        index.checked_add(len as i64)
    } else {
        Some(index)
    };
    match position {
        Some(position) if position >= 0 && (position as usize) < len => Ok(position as usize),
        _ => Err(RuntimeError::IndexOutOfBounds { index, len }),
    }
}

fn dict_key(key: &Value) -> RuntimeResult<crate::runtime::hash_key::HashKey> {
    key.to_hash_key().ok_or_else(|| {
        RuntimeError::type_mismatch(format!("{} cannot be used as a dict key", key.type_name()))
    })
}
