use std::{cell::RefCell, rc::Rc};

use crate::bytecode::{
    module::Module,
    op_code::{OpCode, operand_width, read_u16},
};
use crate::runtime::{
    closure::Closure,
    errors::{RuntimeError, RuntimeResult},
    native,
    object::Object,
    value::Value,
};

use super::{
    Interpreter, binary_ops, comparison_ops,
    function_call::CallOutcome,
    index_ops,
};

/// Where execution goes after an instruction.
enum Flow {
    Next,
    Jump(usize),
    /// A callee frame was pushed.
    Enter,
    Return(Value),
}

impl Interpreter {
    /// Executes one instruction of the top frame. Returns the value once the
    /// frame at `base_depth` returns.
    pub(super) fn advance(
        &mut self,
        module: &Module,
        base_depth: usize,
    ) -> RuntimeResult<Option<Value>> {
        let frame = self.current_frame()?;
        let function = frame.closure.function;
        let ip = frame.ip;
        let instructions = &module
            .functions
            .get(function)
            .ok_or_else(|| invalid(format!("no function template {}", function)))?
            .instructions;

        let byte = *instructions
            .get(ip)
            .ok_or_else(|| invalid(format!("fell off the end of fn #{}", function)))?;
        let op = OpCode::try_from(byte).map_err(|b| invalid(format!("unknown opcode {}", b)))?;
        let width = operand_width(op);
        let operand = if width == 2 {
            read_u16(instructions, ip + 1)
                .map(usize::from)
                .ok_or_else(|| invalid(format!("truncated operand at offset {}", ip)))?
        } else {
            0
        };

        if tracing::enabled!(target: "ember::vm", tracing::Level::TRACE) {
            self.trace_instruction(ip, op, operand);
        }

        match self.dispatch(op, operand)? {
            Flow::Next => self.current_frame_mut()?.ip = ip + 1 + width,
            Flow::Jump(target) => self.current_frame_mut()?.ip = target,
            Flow::Enter => {}
            Flow::Return(value) => return self.return_from_frame(value, base_depth),
        }
        Ok(None)
    }

    fn dispatch(&mut self, op: OpCode, operand: usize) -> RuntimeResult<Flow> {
        match op {
            OpCode::OpCall => {
                return match self.execute_call(operand)? {
                    CallOutcome::Pushed => Ok(Flow::Enter),
                    CallOutcome::Completed => Ok(Flow::Next),
                };
            }
            OpCode::OpCaptureLocal => {
                self.capture_into_top(false, operand)?;
                return Ok(Flow::Next);
            }
            OpCode::OpCaptureCapture => {
                self.capture_into_top(true, operand)?;
                return Ok(Flow::Next);
            }
            OpCode::OpNewFunc => {
                let name = self
                    .names
                    .get(operand)
                    .cloned()
                    .ok_or_else(|| invalid(format!("no function template {}", operand)))?;
                let closure = Closure::new(operand, name);
                self.current_frame_mut()?
                    .push(Value::Closure(Rc::new(closure)));
                return Ok(Flow::Next);
            }
            OpCode::OpConstant => {
                let value = self
                    .constants
                    .get(operand)
                    .cloned()
                    .ok_or_else(|| invalid(format!("no constant {}", operand)))?;
                self.current_frame_mut()?.push(value);
                return Ok(Flow::Next);
            }
            OpCode::OpInitObject => {
                let layout = self
                    .layouts
                    .get(operand)
                    .cloned()
                    .ok_or_else(|| invalid(format!("no struct template {}", operand)))?;
                let frame = self.current_frame_mut()?;
                let values = frame.pop_n(layout.len())?;
                let object = frame.peek()?;
                match object {
                    Value::Struct(object) => object.borrow_mut().initialize(layout, values)?,
                    other => {
                        return Err(invalid(format!(
                            "OpInitObject on {}",
                            other.type_name()
                        )));
                    }
                }
                return Ok(Flow::Next);
            }
            OpCode::OpGetField | OpCode::OpSetField => {
                let name = match self.constants.get(operand) {
                    Some(Value::Str(name)) => Rc::clone(name),
                    _ => return Err(invalid(format!("constant {} is not a field name", operand))),
                };
                let frame = self.current_frame_mut()?;
                if op == OpCode::OpGetField {
                    let object = frame.pop()?;
                    frame.push(index_ops::get_field(&object, &name)?);
                } else {
                    let value = frame.pop()?;
                    let object = frame.pop()?;
                    index_ops::set_field(&object, &name, value.clone())?;
                    frame.push(value);
                }
                return Ok(Flow::Next);
            }
            _ => {}
        }

        let frame = self.current_frame_mut()?;
        match op {
            OpCode::OpNull => frame.push(Value::Null),
            OpCode::OpTrue => frame.push(Value::Bool(true)),
            OpCode::OpFalse => frame.push(Value::Bool(false)),
            OpCode::OpPop => {
                frame.pop()?;
            }
            OpCode::OpDup => {
                let top = frame.peek()?.clone();
                frame.push(top);
            }
            OpCode::OpDup2 => {
                let pair = frame.pop_n(2)?;
                frame.stack.extend(pair.iter().cloned());
                frame.stack.extend(pair);
            }
            OpCode::OpRot3 => {
                // [a b c] -> [c a b]
                let mut top = frame.pop_n(3)?;
                top.rotate_right(1);
                frame.stack.extend(top);
            }
            OpCode::OpRot4 => {
                // [a b c d] -> [d a b c]
                let mut top = frame.pop_n(4)?;
                top.rotate_right(1);
                frame.stack.extend(top);
            }
            OpCode::OpLoadLocal => {
                let value = frame.local(operand)?.borrow().clone();
                frame.push(value);
            }
            OpCode::OpStoreLocal => {
                let value = frame.peek()?.clone();
                *frame.local(operand)?.borrow_mut() = value;
            }
            OpCode::OpLoadCapture => {
                let value = frame.capture(operand)?.borrow().clone();
                frame.push(value);
            }
            OpCode::OpStoreCapture => {
                let value = frame.peek()?.clone();
                *frame.capture(operand)?.borrow_mut() = value;
            }
            OpCode::OpLoadNative => {
                let native = native::get(operand)
                    .ok_or_else(|| invalid(format!("no native {}", operand)))?;
                frame.push(Value::Native(native));
            }
            OpCode::OpAdd | OpCode::OpSub | OpCode::OpMul | OpCode::OpDiv | OpCode::OpMod => {
                let right = frame.pop()?;
                let left = frame.pop()?;
                frame.push(binary_ops::arithmetic(op, &left, &right)?);
            }
            OpCode::OpEqual
            | OpCode::OpNotEqual
            | OpCode::OpLessThan
            | OpCode::OpLessEqual
            | OpCode::OpGreaterThan
            | OpCode::OpGreaterEqual => {
                let right = frame.pop()?;
                let left = frame.pop()?;
                frame.push(comparison_ops::compare(op, &left, &right)?);
            }
            OpCode::OpMinus => {
                let value = frame.pop()?;
                frame.push(binary_ops::negate(&value)?);
            }
            OpCode::OpBang => {
                let value = frame.pop()?;
                frame.push(Value::Bool(!value.is_truthy()));
            }
            OpCode::OpJump => return Ok(Flow::Jump(operand)),
            OpCode::OpJumpIfFalse => {
                if !frame.pop()?.is_truthy() {
                    return Ok(Flow::Jump(operand));
                }
            }
            OpCode::OpBreak | OpCode::OpContinue => {
                return Err(invalid(format!("unpatched {} at offset {}", op, frame.ip)));
            }
            OpCode::OpReturn => return Ok(Flow::Return(frame.pop()?)),
            OpCode::OpNewList => {
                let elements = frame.pop_n(operand)?;
                frame.push(Value::list(elements));
            }
            OpCode::OpIndex => {
                let index = frame.pop()?;
                let container = frame.pop()?;
                frame.push(index_ops::index(&container, &index)?);
            }
            OpCode::OpSetIndex => {
                let value = frame.pop()?;
                let index = frame.pop()?;
                let container = frame.pop()?;
                index_ops::set_index(&container, &index, value.clone())?;
                frame.push(value);
            }
            OpCode::OpLen => {
                let value = frame.pop()?;
                let len = match &value {
                    Value::List(elements) => elements.borrow().len(),
                    Value::Str(text) => text.chars().count(),
                    other => return Err(RuntimeError::expected("for", "List or String", other)),
                };
                frame.push(Value::Int(len as i64));
            }
            OpCode::OpNewObject => {
                frame.push(Value::Struct(Rc::new(RefCell::new(Object::uninitialized()))));
            }
            OpCode::OpCall
            | OpCode::OpCaptureLocal
            | OpCode::OpCaptureCapture
            | OpCode::OpNewFunc
            | OpCode::OpConstant
            | OpCode::OpInitObject
            | OpCode::OpGetField
            | OpCode::OpSetField => {
                return Err(invalid(format!("{} dispatched out of order", op)));
            }
        }
        Ok(Flow::Next)
    }
}

fn invalid(message: String) -> RuntimeError {
    RuntimeError::InvalidBytecode(message)
}
