use crate::bytecode::module::Constant;
use crate::bytecode::op_code::{OpCode, PLACEHOLDER};
use crate::diagnostics::Span;
use crate::syntax::{
    block::Block,
    expression::{Expression, Identifier},
    statement::{ForSlots, Statement},
};

use super::{CompileError, CompileResult, Compiler};

impl<'a> Compiler<'a> {
    pub(super) fn compile_statement(&mut self, statement: &'a Statement) -> CompileResult<()> {
        self.current.current_line = statement.span().start.line;

        match statement {
            Statement::Let { decls, .. } => {
                for decl in decls {
                    match &decl.value {
                        Some(value) => self.compile_expression(value)?,
                        None => {
                            self.emit(OpCode::OpNull, 0);
                        }
                    }
                    self.emit_store(&decl.name)?;
                    self.emit(OpCode::OpPop, 0);
                }
            }
            Statement::If {
                condition,
                consequence,
                alternative,
                span,
            } => self.compile_if(condition, consequence, alternative.as_ref(), *span)?,
            Statement::While {
                condition,
                body,
                span,
            } => self.compile_while(condition, body, *span)?,
            Statement::For {
                variable,
                iterable,
                body,
                slots,
                span,
            } => {
                let slots = slots.ok_or_else(|| CompileError::UnresolvedIdentifier {
                    name: variable.name.clone(),
                    span: *span,
                })?;
                self.compile_for(variable, iterable, body, slots, *span)?;
            }
            Statement::Break { .. } => {
                self.emit(OpCode::OpBreak, PLACEHOLDER);
            }
            Statement::Continue { .. } => {
                self.emit(OpCode::OpContinue, PLACEHOLDER);
            }
            Statement::Return { value, .. } => {
                match value {
                    Some(value) => self.compile_expression(value)?,
                    None => {
                        self.emit(OpCode::OpNull, 0);
                    }
                }
                self.emit(OpCode::OpReturn, 0);
            }
            Statement::Block(block) => self.compile_block(block)?,
            Statement::Expression { expression, .. } => {
                self.compile_expression(expression)?;
                self.emit(OpCode::OpPop, 0);
            }
        }
        Ok(())
    }

    pub(super) fn compile_block(&mut self, block: &'a Block) -> CompileResult<()> {
        for statement in &block.statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    fn compile_if(
        &mut self,
        condition: &'a Expression,
        consequence: &'a Block,
        alternative: Option<&'a Block>,
        span: Span,
    ) -> CompileResult<()> {
        self.compile_expression(condition)?;
        let jump_if_false = self.emit_jump(OpCode::OpJumpIfFalse);
        self.compile_block(consequence)?;

        match alternative {
            Some(alternative) => {
                let jump_over_else = self.emit_jump(OpCode::OpJump);
                self.patch_jump(jump_if_false, span)?;
                self.compile_block(alternative)?;
                self.patch_jump(jump_over_else, span)?;
            }
            None => self.patch_jump(jump_if_false, span)?,
        }
        Ok(())
    }

    fn compile_while(
        &mut self,
        condition: &'a Expression,
        body: &'a Block,
        span: Span,
    ) -> CompileResult<()> {
        let loop_start = self.current_offset();
        self.compile_expression(condition)?;
        let exit_jump = self.emit_jump(OpCode::OpJumpIfFalse);

        let body_start = self.current_offset();
        self.compile_block(body)?;
        self.emit_jump_to(loop_start, span)?;

        let loop_end = self.current_offset();
        self.patch_jump(exit_jump, span)?;
        self.patch_loop_control(body_start, loop_end, loop_end, loop_start, span)
    }

    /// `for x in xs { body }` walks `xs` by index using two hidden locals:
    ///
    /// ```text
    ///     xs; STORE it; POP; CONST 0; STORE cur; POP
    /// top:
    ///     LOAD cur; LOAD it; LEN; LT; JUMP_IF_FALSE end
    ///     LOAD it; LOAD cur; INDEX; STORE x; POP
    ///     body
    /// next:
    ///     LOAD cur; CONST 1; ADD; STORE cur; POP; JUMP top
    /// end:
    /// ```
    fn compile_for(
        &mut self,
        variable: &'a Identifier,
        iterable: &'a Expression,
        body: &'a Block,
        slots: ForSlots,
        span: Span,
    ) -> CompileResult<()> {
        self.compile_expression(iterable)?;
        self.emit(OpCode::OpStoreLocal, slots.iterable);
        self.emit(OpCode::OpPop, 0);
        let zero = self.add_constant(Constant::Int(0), span)?;
        self.emit(OpCode::OpConstant, zero);
        self.emit(OpCode::OpStoreLocal, slots.cursor);
        self.emit(OpCode::OpPop, 0);

        let loop_start = self.current_offset();
        self.emit(OpCode::OpLoadLocal, slots.cursor);
        self.emit(OpCode::OpLoadLocal, slots.iterable);
        self.emit(OpCode::OpLen, 0);
        self.emit(OpCode::OpLessThan, 0);
        let exit_jump = self.emit_jump(OpCode::OpJumpIfFalse);

        self.emit(OpCode::OpLoadLocal, slots.iterable);
        self.emit(OpCode::OpLoadLocal, slots.cursor);
        self.emit(OpCode::OpIndex, 0);
        self.emit_store(variable)?;
        self.emit(OpCode::OpPop, 0);

        let body_start = self.current_offset();
        self.compile_block(body)?;

        let next = self.current_offset();
        self.current.current_line = span.start.line;
        self.emit(OpCode::OpLoadLocal, slots.cursor);
        let one = self.add_constant(Constant::Int(1), span)?;
        self.emit(OpCode::OpConstant, one);
        self.emit(OpCode::OpAdd, 0);
        self.emit(OpCode::OpStoreLocal, slots.cursor);
        self.emit(OpCode::OpPop, 0);
        self.emit_jump_to(loop_start, span)?;

        let loop_end = self.current_offset();
        self.patch_jump(exit_jump, span)?;
        self.patch_loop_control(body_start, loop_end, loop_end, next, span)
    }
}
