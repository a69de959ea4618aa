use std::{
    cell::RefCell,
    collections::HashMap,
    fmt::{self, Write},
    rc::Rc,
};

use crate::bytecode::module::Constant;

use super::{closure::Closure, hash_key::HashKey, native::NativeFunction, object::Object};

/// A shared mutable location. Frames hold one per local slot and closures
/// alias the same cells, so writes through either path are seen by both.
pub type Cell = Rc<RefCell<Value>>;

pub fn new_cell(value: Value) -> Cell {
    Rc::new(RefCell::new(value))
}

/// Nesting beyond this is printed as `...`; containers may hold themselves.
const MAX_DISPLAY_DEPTH: usize = 16;

/// Runtime value held by cells, operand stacks and the constant table.
///
/// Scalars are unboxed. Lists, dicts and structs are shared mutable
/// containers compared by identity. Reference cycles between them (or
/// through captured cells) are not collected.
#[derive(Clone)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(Rc<str>),
    List(Rc<RefCell<Vec<Value>>>),
    Dict(Rc<RefCell<HashMap<HashKey, Value>>>),
    Struct(Rc<RefCell<Object>>),
    Closure(Rc<Closure>),
    Native(NativeFunction),
}

impl Value {
    pub fn from_constant(constant: &Constant) -> Self {
        match constant {
            Constant::Int(v) => Value::Int(*v),
            Constant::Float(v) => Value::Float(*v),
            Constant::Str(v) => Value::Str(Rc::from(v.as_str())),
        }
    }

    pub fn list(elements: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(elements)))
    }

    pub fn dict(entries: HashMap<HashKey, Value>) -> Self {
        Value::Dict(Rc::new(RefCell::new(entries)))
    }

    pub fn string(text: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(text.as_ref()))
    }

    /// Canonical type label used in diagnostics and by `type()`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Bool(_) => "Bool",
            Value::Str(_) => "String",
            Value::List(_) => "List",
            Value::Dict(_) => "Dict",
            Value::Struct(_) => "Struct",
            Value::Closure(_) => "Function",
            Value::Native(_) => "Native",
        }
    }

    /// `null`, `false`, `0`, `0.0` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(v) => *v,
            Value::Int(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::Str(v) => !v.is_empty(),
            _ => true,
        }
    }

    pub fn to_hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Int(v) => Some(HashKey::Integer(*v)),
            Value::Bool(v) => Some(HashKey::Boolean(*v)),
            Value::Str(v) => Some(HashKey::String(Rc::clone(v))),
            _ => None,
        }
    }

    /// Element count for strings (in characters), lists, dicts and structs.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Str(v) => Some(v.chars().count()),
            Value::List(v) => Some(v.borrow().len()),
            Value::Dict(v) => Some(v.borrow().len()),
            Value::Struct(v) => Some(v.borrow().len()),
            _ => None,
        }
    }

    /// Text used by `print` and `str`: strings are not quoted.
    pub fn to_string_value(&self) -> String {
        match self {
            Value::Str(v) => v.to_string(),
            other => other.to_string(),
        }
    }

    fn write_nested(&self, out: &mut impl Write, depth: usize) -> fmt::Result {
        if depth > MAX_DISPLAY_DEPTH {
            return out.write_str("...");
        }
        match self {
            Value::Null => out.write_str("null"),
            Value::Int(v) => write!(out, "{}", v),
            Value::Float(v) => write!(out, "{:?}", v),
            Value::Bool(v) => write!(out, "{}", v),
            Value::Str(v) => write!(out, "\"{}\"", v),
            Value::List(elements) => {
                out.write_char('[')?;
                for (i, element) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        out.write_str(", ")?;
                    }
                    element.write_nested(out, depth + 1)?;
                }
                out.write_char(']')
            }
            Value::Dict(entries) => {
                let entries = entries.borrow();
                let mut keys: Vec<&HashKey> = entries.keys().collect();
                keys.sort();
                out.write_char('{')?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        out.write_str(", ")?;
                    }
                    write!(out, "{}: ", key)?;
                    entries[key].write_nested(out, depth + 1)?;
                }
                out.write_char('}')
            }
            Value::Struct(object) => {
                let object = object.borrow();
                if !object.is_initialized() {
                    return out.write_str("<uninitialized struct>");
                }
                out.write_str("{ ")?;
                for (i, (key, value)) in object.fields().enumerate() {
                    if i > 0 {
                        out.write_str(", ")?;
                    }
                    write!(out, "{}: ", key)?;
                    value.write_nested(out, depth + 1)?;
                }
                out.write_str(" }")
            }
            Value::Closure(closure) => write!(out, "<fn {}>", closure.name),
            Value::Native(native) => write!(out, "<native {}>", native.name),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_nested(f, 0)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_nested(f, 0)
    }
}

/// Scalars and strings compare by value (ints and floats numerically);
/// containers and functions compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Int(l), Value::Int(r)) => l == r,
            (Value::Float(l), Value::Float(r)) => l == r,
            (Value::Int(l), Value::Float(r)) => (*l as f64) == *r,
            (Value::Float(l), Value::Int(r)) => *l == (*r as f64),
            (Value::Str(l), Value::Str(r)) => l == r,
            (Value::List(l), Value::List(r)) => Rc::ptr_eq(l, r),
            (Value::Dict(l), Value::Dict(r)) => Rc::ptr_eq(l, r),
            (Value::Struct(l), Value::Struct(r)) => Rc::ptr_eq(l, r),
            (Value::Closure(l), Value::Closure(r)) => Rc::ptr_eq(l, r),
            (Value::Native(l), Value::Native(r)) => l.index == r.index,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_nested_strings_only() {
        let list = Value::list(vec![Value::Int(1), Value::string("a"), Value::Float(2.0)]);
        assert_eq!(list.to_string(), "[1, \"a\", 2.0]");
        assert_eq!(Value::string("a").to_string_value(), "a");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn self_containing_list_display_terminates() {
        let list = Value::list(Vec::new());
        if let Value::List(elements) = &list {
            elements.borrow_mut().push(list.clone());
        }
        assert!(list.to_string().contains("..."));
    }

    #[test]
    fn truthiness() {
        for falsy in [
            Value::Null,
            Value::Bool(false),
            Value::Int(0),
            Value::Float(0.0),
            Value::string(""),
        ] {
            assert!(!falsy.is_truthy(), "{} should be falsy", falsy);
        }
        assert!(Value::Int(-1).is_truthy());
        assert!(Value::list(Vec::new()).is_truthy());
    }

    #[test]
    fn equality_is_numeric_for_numbers_and_identity_for_lists() {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert_ne!(Value::Int(2), Value::string("2"));

        let a = Value::list(vec![Value::Int(1)]);
        let b = Value::list(vec![Value::Int(1)]);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn cells_are_shared_not_copied() {
        let cell = new_cell(Value::Int(1));
        let alias = Rc::clone(&cell);
        *alias.borrow_mut() = Value::Int(2);
        assert_eq!(*cell.borrow(), Value::Int(2));
    }

    #[test]
    fn hash_keys_cover_scalars_only() {
        assert_eq!(Value::Int(1).to_hash_key(), Some(HashKey::Integer(1)));
        assert_eq!(
            Value::string("k").to_hash_key(),
            Some(HashKey::String(Rc::from("k")))
        );
        assert_eq!(Value::Float(1.0).to_hash_key(), None);
        assert_eq!(Value::list(Vec::new()).to_hash_key(), None);
    }
}
