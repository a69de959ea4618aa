use tracing::trace;

use crate::bytecode::op_code::{OpCode, operand_width};
use crate::runtime::errors::TraceEntry;

use super::Interpreter;

impl Interpreter {
    /// One entry per open frame, innermost first. A caller's line is the
    /// line of the call it is waiting on.
    pub(super) fn stack_trace(&self) -> Vec<TraceEntry> {
        self.frames
            .iter()
            .rev()
            .map(|frame| {
                let line = self
                    .module
                    .functions
                    .get(frame.closure.function)
                    .and_then(|template| template.line_at(frame.ip))
                    .unwrap_or(0);
                TraceEntry {
                    function: frame.closure.name.to_string(),
                    line,
                }
            })
            .collect()
    }

    pub(super) fn trace_instruction(&self, ip: usize, op: OpCode, operand: usize) {
        let Some(frame) = self.frames.last() else {
            return;
        };
        let instruction = if operand_width(op) > 0 {
            format!("{} {}", op, operand)
        } else {
            op.to_string()
        };
        trace!(
            target: "ember::vm",
            function = %frame.closure.name,
            depth = self.frames.len(),
            "{:04} {:<24} stack={}",
            ip,
            instruction,
            render_stack(&frame.stack)
        );
    }
}

pub(super) fn render_stack(stack: &[crate::runtime::value::Value]) -> String {
    let items: Vec<String> = stack.iter().map(|value| value.to_string()).collect();
    format!("[{}]", items.join(", "))
}
