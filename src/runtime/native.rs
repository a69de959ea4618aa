//! Host functions reachable from every program.
//!
//! The position of a function in [`NATIVES`] is its `OpLoadNative` operand,
//! so new entries go at the end.

use std::{collections::HashMap, fmt, io::Write};

use super::{
    errors::{RuntimeError, RuntimeResult},
    hash_key::HashKey,
    value::Value,
};

pub type NativeFn = fn(&mut dyn Write, &[Value]) -> RuntimeResult<Value>;

#[derive(Clone, Copy)]
pub struct NativeFunction {
    pub index: u16,
    pub name: &'static str,
    pub func: NativeFn,
}

impl NativeFunction {
    pub fn call(&self, out: &mut dyn Write, args: &[Value]) -> RuntimeResult<Value> {
        (self.func)(out, args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

macro_rules! check_arity {
    ($args:expr, $name:expr, $exact:literal) => {
        if $args.len() != $exact {
            return Err(RuntimeError::arity($name, stringify!($exact), $args.len()));
        }
    };
    ($args:expr, $name:expr, $lo:literal ..= $hi:literal) => {
        if $args.len() < $lo || $args.len() > $hi {
            return Err(RuntimeError::arity(
                $name,
                concat!(stringify!($lo), "-", stringify!($hi)),
                $args.len(),
            ));
        }
    };
}

pub static NATIVES: &[NativeFunction] = &[
    native(0, "print", print),
    native(1, "len", len),
    native(2, "str", to_str),
    native(3, "int", to_int),
    native(4, "float", to_float),
    native(5, "type", type_of),
    native(6, "range", range),
    native(7, "append", append),
    native(8, "pop", pop),
    native(9, "keys", keys),
    native(10, "dict", dict),
];

const fn native(index: u16, name: &'static str, func: NativeFn) -> NativeFunction {
    NativeFunction { index, name, func }
}

/// Index of the native called `name`.
pub fn lookup(name: &str) -> Option<u16> {
    NATIVES
        .iter()
        .find(|native| native.name == name)
        .map(|native| native.index)
}

pub fn get(index: usize) -> Option<NativeFunction> {
    NATIVES.get(index).copied()
}

fn print(out: &mut dyn Write, args: &[Value]) -> RuntimeResult<Value> {
    let line = args
        .iter()
        .map(Value::to_string_value)
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "{}", line).map_err(|err| RuntimeError::Output(err.to_string()))?;
    Ok(Value::Null)
}

fn len(_: &mut dyn Write, args: &[Value]) -> RuntimeResult<Value> {
    check_arity!(args, "len", 1);
    match args[0].len() {
        Some(len) => Ok(Value::Int(len as i64)),
        None => Err(RuntimeError::expected(
            "len",
            "String, List, Dict or Struct",
            &args[0],
        )),
    }
}

fn to_str(_: &mut dyn Write, args: &[Value]) -> RuntimeResult<Value> {
    check_arity!(args, "str", 1);
    Ok(Value::string(args[0].to_string_value()))
}

fn to_int(_: &mut dyn Write, args: &[Value]) -> RuntimeResult<Value> {
    check_arity!(args, "int", 1);
    match &args[0] {
        Value::Int(v) => Ok(Value::Int(*v)),
        Value::Float(v) => Ok(Value::Int(*v as i64)),
        Value::Bool(v) => Ok(Value::Int(i64::from(*v))),
        Value::Str(text) => text.trim().parse::<i64>().map(Value::Int).map_err(|_| {
            RuntimeError::type_mismatch(format!("int cannot parse \"{}\"", text))
        }),
        other => Err(RuntimeError::expected("int", "Int, Float, Bool or String", other)),
    }
}

fn to_float(_: &mut dyn Write, args: &[Value]) -> RuntimeResult<Value> {
    check_arity!(args, "float", 1);
    match &args[0] {
        Value::Int(v) => Ok(Value::Float(*v as f64)),
        Value::Float(v) => Ok(Value::Float(*v)),
        Value::Str(text) => text.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            RuntimeError::type_mismatch(format!("float cannot parse \"{}\"", text))
        }),
        other => Err(RuntimeError::expected("float", "Int, Float or String", other)),
    }
}

fn type_of(_: &mut dyn Write, args: &[Value]) -> RuntimeResult<Value> {
    check_arity!(args, "type", 1);
    Ok(Value::string(args[0].type_name()))
}

fn range(_: &mut dyn Write, args: &[Value]) -> RuntimeResult<Value> {
    check_arity!(args, "range", 1..=2);
    let bound = |value: &Value| match value {
        Value::Int(v) => Ok(*v),
        other => Err(RuntimeError::expected("range", "Int", other)),
    };
    let (start, end) = match args {
        [start, end] => (bound(start)?, bound(end)?),
        _ => (0, bound(&args[0])?),
    };
    Ok(Value::list((start..end).map(Value::Int).collect()))
}

fn append(_: &mut dyn Write, args: &[Value]) -> RuntimeResult<Value> {
    check_arity!(args, "append", 2);
    match &args[0] {
        Value::List(elements) => {
            elements.borrow_mut().push(args[1].clone());
            Ok(args[0].clone())
        }
        other => Err(RuntimeError::expected("append", "List", other)),
    }
}

fn pop(_: &mut dyn Write, args: &[Value]) -> RuntimeResult<Value> {
    check_arity!(args, "pop", 1);
    match &args[0] {
        Value::List(elements) => elements
            .borrow_mut()
            .pop()
            .ok_or(RuntimeError::IndexOutOfBounds { index: -1, len: 0 }),
        other => Err(RuntimeError::expected("pop", "List", other)),
    }
}

/// Dict keys in sorted order, or struct field names in declaration order.
fn keys(_: &mut dyn Write, args: &[Value]) -> RuntimeResult<Value> {
    check_arity!(args, "keys", 1);
    match &args[0] {
        Value::Dict(entries) => {
            let mut keys: Vec<HashKey> = entries.borrow().keys().cloned().collect();
            keys.sort();
            Ok(Value::list(keys.iter().map(HashKey::to_value).collect()))
        }
        Value::Struct(object) => Ok(Value::list(
            object
                .borrow()
                .fields()
                .map(|(key, _)| Value::Str(key.clone()))
                .collect(),
        )),
        other => Err(RuntimeError::expected("keys", "Dict or Struct", other)),
    }
}

fn dict(_: &mut dyn Write, args: &[Value]) -> RuntimeResult<Value> {
    check_arity!(args, "dict", 0);
    Ok(Value::dict(HashMap::new()))
}
