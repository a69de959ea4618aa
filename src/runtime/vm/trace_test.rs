use crate::runtime::value::Value;

use super::trace::render_stack;

#[test]
fn render_stack_lists_values_bottom_first() {
    let stack = vec![Value::Int(1), Value::string("a"), Value::Null];
    assert_eq!(render_stack(&stack), "[1, \"a\", null]");
    assert_eq!(render_stack(&[]), "[]");
}
