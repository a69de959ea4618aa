use std::rc::Rc;

use crate::bytecode::op_code::{OpCode, operand_width};
use crate::runtime::{
    closure::Closure,
    errors::{RuntimeError, RuntimeResult},
    frame::Frame,
    value::Value,
};

use super::{Interpreter, MAX_FRAMES};

/// What `OpCall` did to the frame stack.
pub(super) enum CallOutcome {
    /// A new frame was pushed; the caller stays on its `OpCall`.
    Pushed,
    /// A native ran in place and its result is on the caller's stack.
    Completed,
}

impl Interpreter {
    /// Validates arity and pushes a fresh frame for `closure`.
    pub(super) fn push_call_frame(
        &mut self,
        closure: Rc<Closure>,
        args: Vec<Value>,
    ) -> RuntimeResult<()> {
        let template = self
            .module
            .functions
            .get(closure.function)
            .ok_or_else(|| {
                RuntimeError::InvalidBytecode(format!("no function template {}", closure.function))
            })?;
        if args.len() != template.arity {
            return Err(RuntimeError::arity(
                closure.name.as_ref(),
                template.arity.to_string(),
                args.len(),
            ));
        }
        if self.frames.len() >= MAX_FRAMES {
            return Err(RuntimeError::StackOverflow);
        }
        let frame = Frame::new(closure, template.num_locals, args);
        self.frames.push(frame);
        Ok(())
    }

    /// Pops the callee and `num_args` arguments off the current frame.
    pub(super) fn execute_call(&mut self, num_args: usize) -> RuntimeResult<CallOutcome> {
        let frame = self.current_frame_mut()?;
        let args = frame.pop_n(num_args)?;
        let callee = frame.pop()?;

        match callee {
            Value::Closure(closure) => {
                self.push_call_frame(closure, args)?;
                Ok(CallOutcome::Pushed)
            }
            Value::Native(native) => {
                let result = native.call(self.out.as_mut(), &args)?;
                self.current_frame_mut()?.push(result);
                Ok(CallOutcome::Completed)
            }
            other => Err(RuntimeError::NotCallable(other.type_name())),
        }
    }

    /// Pops the finished frame. Returns the value when that frame was the
    /// outermost one of the current `call`; otherwise hands it to the caller
    /// and moves the caller past its `OpCall`.
    pub(super) fn return_from_frame(
        &mut self,
        value: Value,
        base_depth: usize,
    ) -> RuntimeResult<Option<Value>> {
        self.frames.pop();
        if self.frames.len() <= base_depth {
            return Ok(Some(value));
        }
        let caller = self.current_frame_mut()?;
        caller.ip += 1 + operand_width(OpCode::OpCall);
        caller.push(value);
        Ok(None)
    }

    /// Appends a cell to the closure just created by `OpNewFunc`.
    pub(super) fn capture_into_top(&mut self, from_capture: bool, slot: usize) -> RuntimeResult<()> {
        let frame = self.current_frame_mut()?;
        let cell = if from_capture {
            Rc::clone(frame.capture(slot)?)
        } else {
            Rc::clone(frame.local(slot)?)
        };
        match frame.stack.last_mut() {
            Some(Value::Closure(closure)) => match Rc::get_mut(closure) {
                Some(closure) => {
                    closure.captures.push(cell);
                    Ok(())
                }
                None => Err(RuntimeError::InvalidBytecode(
                    "capture into a closure that is already shared".to_string(),
                )),
            },
            _ => Err(RuntimeError::InvalidBytecode(
                "capture instruction without a new closure".to_string(),
            )),
        }
    }
}
