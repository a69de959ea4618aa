use std::{cell::RefCell, rc::Rc};

use crate::runtime::{errors::RuntimeError, object::Object, value::Value};

use super::index_ops::{get_field, index, set_field, set_index};

fn ints(values: &[i64]) -> Value {
    Value::list(values.iter().copied().map(Value::Int).collect())
}

#[test]
fn negative_indexes_count_from_the_end() {
    let list = ints(&[1, 2, 3]);
    assert_eq!(index(&list, &Value::Int(-1)), Ok(Value::Int(3)));
    assert_eq!(index(&list, &Value::Int(0)), Ok(Value::Int(1)));
    assert_eq!(
        index(&list, &Value::Int(3)),
        Err(RuntimeError::IndexOutOfBounds { index: 3, len: 3 })
    );
    assert_eq!(
        index(&list, &Value::Int(-4)),
        Err(RuntimeError::IndexOutOfBounds { index: -4, len: 3 })
    );
}

#[test]
fn string_index_yields_one_character() {
    assert_eq!(
        index(&Value::string("héllo"), &Value::Int(1)),
        Ok(Value::string("é"))
    );
}

#[test]
fn missing_dict_key_is_null() {
    let dict = Value::dict(Default::default());
    set_index(&dict, &Value::string("a"), Value::Int(1)).expect("insert");
    assert_eq!(index(&dict, &Value::string("a")), Ok(Value::Int(1)));
    assert_eq!(index(&dict, &Value::string("b")), Ok(Value::Null));
    assert!(matches!(
        index(&dict, &ints(&[])),
        Err(RuntimeError::TypeMismatch(_))
    ));
}

#[test]
fn set_index_writes_through_shared_list() {
    let list = ints(&[1, 2]);
    let alias = list.clone();
    set_index(&list, &Value::Int(0), Value::Int(9)).expect("set");
    assert_eq!(alias.to_string(), "[9, 2]");
    assert!(set_index(&Value::string("ab"), &Value::Int(0), Value::Null).is_err());
}

#[test]
fn field_access_requires_initialized_struct() {
    let object = Value::Struct(Rc::new(RefCell::new(Object::uninitialized())));
    assert_eq!(
        get_field(&object, "x"),
        Err(RuntimeError::UninitializedObject)
    );
    assert!(set_field(&Value::Int(1), "x", Value::Null).is_err());
}
