use crate::analysis::variable::{Resolution, Variable};
use crate::bytecode::{
    module::LineEntry,
    op_code::{MAX_OPERAND, OpCode, PLACEHOLDER, decode, make},
};
use crate::diagnostics::Span;
use crate::syntax::expression::Identifier;

use super::{CompileError, CompileResult, Compiler};

impl<'a> Compiler<'a> {
    pub(super) fn emit(&mut self, op: OpCode, operand: usize) -> usize {
        let instruction = make(op, operand);
        self.add_instruction(&instruction)
    }

    fn add_instruction(&mut self, instruction: &[u8]) -> usize {
        let pos = self.current.instructions.len();
        self.current.instructions.extend_from_slice(instruction);
        self.current.lines.push(LineEntry {
            offset: pos,
            line: self.current.current_line,
        });
        pos
    }

    pub(super) fn current_offset(&self) -> usize {
        self.current.instructions.len()
    }

    /// Overwrites the operand of the instruction at `pos`.
    pub(super) fn change_operand(&mut self, pos: usize, operand: usize) {
        let bytes = (operand as u16).to_be_bytes();
        self.current.instructions[pos + 1] = bytes[0];
        self.current.instructions[pos + 2] = bytes[1];
    }

    /// Swaps the opcode at `pos` for one of the same width.
    fn replace_opcode(&mut self, pos: usize, op: OpCode) {
        self.current.instructions[pos] = op as u8;
    }

    fn check_jump_target(&self, target: usize, span: Span) -> CompileResult<usize> {
        if target > MAX_OPERAND {
            return Err(CompileError::JumpOutOfRange {
                function: self.current.name.clone(),
                span,
            });
        }
        Ok(target)
    }

    /// Emits a forward jump to be patched once its target is known.
    pub(super) fn emit_jump(&mut self, op: OpCode) -> usize {
        self.emit(op, PLACEHOLDER)
    }

    /// Points the jump at `pos` to the current end of the code.
    pub(super) fn patch_jump(&mut self, pos: usize, span: Span) -> CompileResult<()> {
        let target = self.check_jump_target(self.current_offset(), span)?;
        self.change_operand(pos, target);
        Ok(())
    }

    /// Emits an unconditional jump to an already-emitted offset.
    pub(super) fn emit_jump_to(&mut self, target: usize, span: Span) -> CompileResult<()> {
        let target = self.check_jump_target(target, span)?;
        self.emit(OpCode::OpJump, target);
        Ok(())
    }

    /// Rewrites every `OpBreak`/`OpContinue` left in `start..end` into jumps.
    /// Nested loops have already rewritten their own, so whatever remains
    /// belongs to the loop just emitted.
    pub(super) fn patch_loop_control(
        &mut self,
        start: usize,
        end: usize,
        break_target: usize,
        continue_target: usize,
        span: Span,
    ) -> CompileResult<()> {
        let break_target = self.check_jump_target(break_target, span)?;
        let continue_target = self.check_jump_target(continue_target, span)?;

        let sentinels: Vec<(usize, OpCode)> = decode(&self.current.instructions[start..end])
            .filter_map(Result::ok)
            .filter(|decoded| decoded.op.is_loop_sentinel())
            .map(|decoded| (start + decoded.offset, decoded.op))
            .collect();

        for (pos, op) in sentinels {
            let target = if op == OpCode::OpBreak {
                break_target
            } else {
                continue_target
            };
            self.replace_opcode(pos, OpCode::OpJump);
            self.change_operand(pos, target);
        }
        Ok(())
    }

    fn variable_of(ident: &Identifier) -> CompileResult<Option<Variable>> {
        match &ident.binding {
            Some(resolution) => Ok(resolution.variable()),
            None => Err(CompileError::UnresolvedIdentifier {
                name: ident.name.clone(),
                span: ident.span,
            }),
        }
    }

    pub(super) fn emit_load(&mut self, ident: &Identifier) -> CompileResult<()> {
        match (&ident.binding, Self::variable_of(ident)?) {
            (_, Some(variable)) if variable.is_capture => {
                self.emit(OpCode::OpLoadCapture, variable.slot);
            }
            (_, Some(variable)) => {
                self.emit(OpCode::OpLoadLocal, variable.slot);
            }
            (Some(Resolution::Native(index)), None) => {
                self.emit(OpCode::OpLoadNative, *index as usize);
            }
            (_, None) => {
                return Err(CompileError::UnresolvedIdentifier {
                    name: ident.name.clone(),
                    span: ident.span,
                });
            }
        }
        Ok(())
    }

    /// Stores the top of the stack into `ident`, leaving the value in place.
    pub(super) fn emit_store(&mut self, ident: &Identifier) -> CompileResult<()> {
        match Self::variable_of(ident)? {
            Some(variable) if variable.is_capture => {
                self.emit(OpCode::OpStoreCapture, variable.slot);
            }
            Some(variable) => {
                self.emit(OpCode::OpStoreLocal, variable.slot);
            }
            // Natives are read-only; the resolver rejects writes to them.
            None => {
                return Err(CompileError::UnresolvedIdentifier {
                    name: ident.name.clone(),
                    span: ident.span,
                });
            }
        }
        Ok(())
    }
}
