use std::collections::VecDeque;

use tracing::debug;

use crate::bytecode::{
    module::{Constant, FunctionTemplate, LineEntry, Module, StructTemplate},
    op_code::{Instructions, MAX_OPERAND, OpCode},
};
use crate::diagnostics::Span;
use crate::syntax::{expression::FnExpr, program::Program};

mod builder;
mod errors;
mod expression;
mod statement;

pub use errors::{CompileError, CompileResult};

/// Compiles a resolved program into a [`Module`].
pub fn compile(program: &Program) -> CompileResult<Module> {
    Compiler::new().compile_program(program)
}

/// Code being emitted for the function currently at the head of the queue.
#[derive(Debug, Default)]
pub(super) struct FunctionState {
    pub name: String,
    pub instructions: Instructions,
    pub lines: Vec<LineEntry>,
    pub current_line: usize,
}

pub struct Compiler<'a> {
    constants: Vec<Constant>,
    functions: Vec<Option<FunctionTemplate>>,
    structs: Vec<StructTemplate>,
    /// Function literals discovered but not yet compiled, with their template index.
    queue: VecDeque<(usize, &'a FnExpr)>,
    pub(super) current: FunctionState,
}

impl<'a> Default for Compiler<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Compiler<'a> {
    pub fn new() -> Self {
        Self {
            constants: Vec::new(),
            functions: Vec::new(),
            structs: Vec::new(),
            queue: VecDeque::new(),
            current: FunctionState::default(),
        }
    }

    pub fn compile_program(mut self, program: &'a Program) -> CompileResult<Module> {
        self.enqueue_function(&program.root)?;

        while let Some((index, function)) = self.queue.pop_front() {
            let template = self.compile_function(function)?;
            self.functions[index] = Some(template);
        }

        let functions: Vec<FunctionTemplate> = self.functions.into_iter().flatten().collect();
        debug!(
            target: "ember::compiler",
            functions = functions.len(),
            constants = self.constants.len(),
            structs = self.structs.len(),
            "compiled module"
        );

        Ok(Module {
            constants: self.constants,
            functions,
            structs: self.structs,
        })
    }

    /// Reserves the next template index for `function` and queues it.
    pub(super) fn enqueue_function(&mut self, function: &'a FnExpr) -> CompileResult<usize> {
        let index = self.functions.len();
        if index > MAX_OPERAND {
            return Err(CompileError::TooManyFunctions {
                span: function.span,
            });
        }
        self.functions.push(None);
        self.queue.push_back((index, function));
        Ok(index)
    }

    pub(super) fn add_struct(&mut self, keys: Vec<String>, span: Span) -> CompileResult<usize> {
        let index = self.structs.len();
        if index > MAX_OPERAND {
            return Err(CompileError::TooManyStructs { span });
        }
        self.structs.push(StructTemplate { keys });
        Ok(index)
    }

    pub(super) fn add_constant(&mut self, constant: Constant, span: Span) -> CompileResult<usize> {
        let index = self.constants.len();
        if index > MAX_OPERAND {
            return Err(CompileError::TooManyConstants { span });
        }
        self.constants.push(constant);
        Ok(index)
    }

    fn compile_function(&mut self, function: &'a FnExpr) -> CompileResult<FunctionTemplate> {
        let name = function.display_name().to_string();
        let info = &function.info;
        if info.num_locals > MAX_OPERAND + 1 {
            return Err(CompileError::TooManyLocals {
                function: name,
                span: function.span,
            });
        }
        if info.num_captures > MAX_OPERAND + 1 {
            return Err(CompileError::TooManyCaptures {
                function: name,
                span: function.span,
            });
        }

        self.current = FunctionState {
            name,
            current_line: function.span.start.line,
            ..FunctionState::default()
        };

        for statement in &function.body.statements {
            self.compile_statement(statement)?;
        }
        // Falling off the end returns null.
        self.current.current_line = function.body.span.end.line;
        self.emit(OpCode::OpNull, 0);
        self.emit(OpCode::OpReturn, 0);

        let state = std::mem::take(&mut self.current);
        debug!(
            target: "ember::compiler",
            function = %state.name,
            arity = function.parameters.len(),
            locals = info.num_locals,
            captures = info.num_captures,
            bytes = state.instructions.len(),
            "froze function template"
        );

        Ok(FunctionTemplate {
            name: state.name,
            arity: function.parameters.len(),
            num_locals: info.num_locals,
            num_captures: info.num_captures,
            instructions: state.instructions,
            lines: state.lines,
        })
    }
}

#[cfg(test)]
mod compiler_test;
