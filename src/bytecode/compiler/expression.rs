use crate::bytecode::module::Constant;
use crate::bytecode::op_code::{MAX_OPERAND, OpCode};
use crate::diagnostics::Span;
use crate::syntax::expression::{
    Expression, FnExpr, InfixOp, PostfixOp, PrefixOp, StructLit, Target,
};

use super::{CompileError, CompileResult, Compiler};

impl<'a> Compiler<'a> {
    pub(super) fn compile_expression(&mut self, expression: &'a Expression) -> CompileResult<()> {
        let saved_line = self.current.current_line;
        self.current.current_line = expression.span().start.line;
        let result = self.compile_expression_inner(expression);
        self.current.current_line = saved_line;
        result
    }

    fn compile_expression_inner(&mut self, expression: &'a Expression) -> CompileResult<()> {
        match expression {
            Expression::Identifier(ident) | Expression::This(ident) => self.emit_load(ident)?,
            Expression::Integer { value, span } => {
                self.emit_constant(Constant::Int(*value), *span)?
            }
            Expression::Float { value, span } => {
                self.emit_constant(Constant::Float(*value), *span)?
            }
            Expression::String { value, span } => {
                self.emit_constant(Constant::Str(value.clone()), *span)?
            }
            Expression::Boolean { value, .. } => {
                self.emit(if *value { OpCode::OpTrue } else { OpCode::OpFalse }, 0);
            }
            Expression::Null { .. } => {
                self.emit(OpCode::OpNull, 0);
            }
            Expression::Prefix {
                operator, right, ..
            } => {
                self.compile_expression(right)?;
                match operator {
                    PrefixOp::Neg => self.emit(OpCode::OpMinus, 0),
                    PrefixOp::Not => self.emit(OpCode::OpBang, 0),
                };
            }
            Expression::Infix {
                left,
                operator,
                right,
                span,
            } => match binary_opcode(*operator) {
                Some(op) => {
                    self.compile_expression(left)?;
                    self.compile_expression(right)?;
                    self.emit(op, 0);
                }
                None if *operator == InfixOp::And => self.compile_and(left, right, *span)?,
                None => self.compile_or(left, right, *span)?,
            },
            Expression::Assign { target, value, .. } => self.compile_assign(target, value)?,
            Expression::Postfix {
                target,
                operator,
                span,
            } => self.compile_postfix(target, *operator, *span)?,
            Expression::Call {
                function,
                arguments,
                span,
            } => {
                self.compile_expression(function)?;
                for argument in arguments {
                    self.compile_expression(argument)?;
                }
                let count = check_count(arguments.len(), *span)?;
                self.emit(OpCode::OpCall, count);
            }
            Expression::List { elements, span } => {
                for element in elements {
                    self.compile_expression(element)?;
                }
                let count = check_count(elements.len(), *span)?;
                self.emit(OpCode::OpNewList, count);
            }
            Expression::Index { left, index, .. } => {
                self.compile_expression(left)?;
                self.compile_expression(index)?;
                self.emit(OpCode::OpIndex, 0);
            }
            Expression::Field { object, name, span } => {
                self.compile_expression(object)?;
                let name = self.add_constant(Constant::Str(name.clone()), *span)?;
                self.emit(OpCode::OpGetField, name);
            }
            Expression::Function(function) => self.compile_function_literal(function)?,
            Expression::Struct(lit) => self.compile_struct_literal(lit)?,
        }
        Ok(())
    }

    fn emit_constant(&mut self, constant: Constant, span: Span) -> CompileResult<()> {
        let index = self.add_constant(constant, span)?;
        self.emit(OpCode::OpConstant, index);
        Ok(())
    }

    /// `a && b` leaves an explicit boolean.
    fn compile_and(
        &mut self,
        left: &'a Expression,
        right: &'a Expression,
        span: Span,
    ) -> CompileResult<()> {
        self.compile_expression(left)?;
        let left_false = self.emit_jump(OpCode::OpJumpIfFalse);
        self.compile_expression(right)?;
        let right_false = self.emit_jump(OpCode::OpJumpIfFalse);
        self.emit(OpCode::OpTrue, 0);
        let done = self.emit_jump(OpCode::OpJump);
        self.patch_jump(left_false, span)?;
        self.patch_jump(right_false, span)?;
        self.emit(OpCode::OpFalse, 0);
        self.patch_jump(done, span)
    }

    /// `a || b` leaves an explicit boolean.
    fn compile_or(
        &mut self,
        left: &'a Expression,
        right: &'a Expression,
        span: Span,
    ) -> CompileResult<()> {
        self.compile_expression(left)?;
        let try_right = self.emit_jump(OpCode::OpJumpIfFalse);
        self.emit(OpCode::OpTrue, 0);
        let left_true = self.emit_jump(OpCode::OpJump);
        self.patch_jump(try_right, span)?;
        self.compile_expression(right)?;
        let right_false = self.emit_jump(OpCode::OpJumpIfFalse);
        self.emit(OpCode::OpTrue, 0);
        let right_true = self.emit_jump(OpCode::OpJump);
        self.patch_jump(right_false, span)?;
        self.emit(OpCode::OpFalse, 0);
        self.patch_jump(left_true, span)?;
        self.patch_jump(right_true, span)
    }

    fn compile_assign(&mut self, target: &'a Target, value: &'a Expression) -> CompileResult<()> {
        match target {
            Target::Identifier(ident) => {
                self.compile_expression(value)?;
                self.emit_store(ident)?;
            }
            Target::Field { object, name } => {
                self.compile_expression(object)?;
                self.compile_expression(value)?;
                let name = self.add_constant(Constant::Str(name.clone()), value.span())?;
                self.emit(OpCode::OpSetField, name);
            }
            Target::Index { object, index } => {
                self.compile_expression(object)?;
                self.compile_expression(index)?;
                self.compile_expression(value)?;
                self.emit(OpCode::OpSetIndex, 0);
            }
        }
        Ok(())
    }

    /// Evaluates the target location once and leaves the value it held
    /// before the update. Stack shapes, top on the right:
    ///
    /// ```text
    /// ident:  v -> v v -> v v' (store) -> v
    /// field:  o -> o o -> o v -> o v v -> v o v -> v o v' -> v v' (set) -> v
    /// index:  a i -> a i a i -> a i v -> a i v v -> v a i v -> v a i v' -> v v' (set) -> v
    /// ```
    fn compile_postfix(
        &mut self,
        target: &'a Target,
        operator: PostfixOp,
        span: Span,
    ) -> CompileResult<()> {
        let update = match operator {
            PostfixOp::Increment => OpCode::OpAdd,
            PostfixOp::Decrement => OpCode::OpSub,
        };

        match target {
            Target::Identifier(ident) => {
                self.emit_load(ident)?;
                self.emit(OpCode::OpDup, 0);
                self.emit_constant(Constant::Int(1), span)?;
                self.emit(update, 0);
                self.emit_store(ident)?;
            }
            Target::Field { object, name } => {
                let name = self.add_constant(Constant::Str(name.clone()), span)?;
                self.compile_expression(object)?;
                self.emit(OpCode::OpDup, 0);
                self.emit(OpCode::OpGetField, name);
                self.emit(OpCode::OpDup, 0);
                self.emit(OpCode::OpRot3, 0);
                self.emit_constant(Constant::Int(1), span)?;
                self.emit(update, 0);
                self.emit(OpCode::OpSetField, name);
            }
            Target::Index { object, index } => {
                self.compile_expression(object)?;
                self.compile_expression(index)?;
                self.emit(OpCode::OpDup2, 0);
                self.emit(OpCode::OpIndex, 0);
                self.emit(OpCode::OpDup, 0);
                self.emit(OpCode::OpRot4, 0);
                self.emit_constant(Constant::Int(1), span)?;
                self.emit(update, 0);
                self.emit(OpCode::OpSetIndex, 0);
            }
        }
        self.emit(OpCode::OpPop, 0);
        Ok(())
    }

    /// `OpNewFunc` followed by one capture instruction per inherited cell,
    /// in the order the new closure numbers its captures.
    fn compile_function_literal(&mut self, function: &'a FnExpr) -> CompileResult<()> {
        let index = self.enqueue_function(function)?;
        self.emit(OpCode::OpNewFunc, index);

        for source in &function.info.parent_captures {
            let variable = source.get();
            let op = if variable.is_capture {
                OpCode::OpCaptureCapture
            } else {
                OpCode::OpCaptureLocal
            };
            self.emit(op, variable.slot);
        }
        Ok(())
    }

    fn compile_struct_literal(&mut self, lit: &'a StructLit) -> CompileResult<()> {
        let keys = lit.fields.iter().map(|field| field.key.clone()).collect();
        let template = self.add_struct(keys, lit.span)?;

        self.emit(OpCode::OpNewObject, 0);
        if let Some(slot) = lit.this_slot {
            self.emit(OpCode::OpDup, 0);
            self.emit(OpCode::OpStoreLocal, slot);
            self.emit(OpCode::OpPop, 0);
        }
        for field in &lit.fields {
            self.compile_expression(&field.value)?;
        }
        self.emit(OpCode::OpInitObject, template);
        Ok(())
    }
}

/// Opcode for a strict binary operator; `None` for the short-circuit ones.
fn binary_opcode(operator: InfixOp) -> Option<OpCode> {
    let op = match operator {
        InfixOp::Add => OpCode::OpAdd,
        InfixOp::Sub => OpCode::OpSub,
        InfixOp::Mul => OpCode::OpMul,
        InfixOp::Div => OpCode::OpDiv,
        InfixOp::Mod => OpCode::OpMod,
        InfixOp::Eq => OpCode::OpEqual,
        InfixOp::NotEq => OpCode::OpNotEqual,
        InfixOp::Lt => OpCode::OpLessThan,
        InfixOp::Lte => OpCode::OpLessEqual,
        InfixOp::Gt => OpCode::OpGreaterThan,
        InfixOp::Gte => OpCode::OpGreaterEqual,
        InfixOp::And | InfixOp::Or => return None,
    };
    Some(op)
}

fn check_count(count: usize, span: Span) -> CompileResult<usize> {
    if count > MAX_OPERAND {
        return Err(CompileError::TooManyArguments { count, span });
    }
    Ok(count)
}
