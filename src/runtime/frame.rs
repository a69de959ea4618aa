use std::rc::Rc;

use super::{
    closure::Closure,
    errors::{RuntimeError, RuntimeResult},
    value::{Cell, Value, new_cell},
};

/// One activation record: its own locals and operand stack.
#[derive(Debug)]
pub struct Frame {
    pub closure: Rc<Closure>,
    pub locals: Vec<Cell>,
    pub stack: Vec<Value>,
    /// Offset of the instruction being executed. A caller keeps pointing at
    /// its `OpCall` until the callee returns.
    pub ip: usize,
}

impl Frame {
    /// Parameters fill the first cells; the rest start as null.
    pub fn new(closure: Rc<Closure>, num_locals: usize, args: Vec<Value>) -> Self {
        let mut locals: Vec<Cell> = args.into_iter().map(new_cell).collect();
        while locals.len() < num_locals {
            locals.push(new_cell(Value::Null));
        }
        Self {
            closure,
            locals,
            stack: Vec::new(),
            ip: 0,
        }
    }

    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub fn pop(&mut self) -> RuntimeResult<Value> {
        self.stack.pop().ok_or_else(stack_underflow)
    }

    pub fn peek(&self) -> RuntimeResult<&Value> {
        self.stack.last().ok_or_else(stack_underflow)
    }

    /// Removes the top `count` values, preserving their order.
    pub fn pop_n(&mut self, count: usize) -> RuntimeResult<Vec<Value>> {
        let len = self.stack.len();
        if count > len {
            return Err(stack_underflow());
        }
        Ok(self.stack.split_off(len - count))
    }

    pub fn local(&self, slot: usize) -> RuntimeResult<&Cell> {
        self.locals
            .get(slot)
            .ok_or_else(|| RuntimeError::InvalidBytecode(format!("no local slot {}", slot)))
    }

    pub fn capture(&self, slot: usize) -> RuntimeResult<&Cell> {
        self.closure
            .captures
            .get(slot)
            .ok_or_else(|| RuntimeError::InvalidBytecode(format!("no capture slot {}", slot)))
    }
}

fn stack_underflow() -> RuntimeError {
    RuntimeError::InvalidBytecode("operand stack underflow".to_string())
}
