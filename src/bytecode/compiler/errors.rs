use crate::bytecode::op_code::MAX_OPERAND;
use crate::diagnostics::{Diagnostic, OPERAND_OVERFLOW, Span, UNRESOLVED_AST};

const LIMIT: usize = MAX_OPERAND + 1;

/// Compilation stops at the first of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("module needs more than {} constants", LIMIT)]
    TooManyConstants { span: Span },
    #[error("function `{function}` needs more than {} local slots", LIMIT)]
    TooManyLocals { function: String, span: Span },
    #[error("function `{function}` captures more than {} variables", LIMIT)]
    TooManyCaptures { function: String, span: Span },
    #[error("module needs more than {} function templates", LIMIT)]
    TooManyFunctions { span: Span },
    #[error("module needs more than {} struct templates", LIMIT)]
    TooManyStructs { span: Span },
    #[error("jump target in function `{function}` is beyond offset {}", MAX_OPERAND)]
    JumpOutOfRange { function: String, span: Span },
    #[error("{count} values passed to one call or list literal, more than {}", MAX_OPERAND)]
    TooManyArguments { count: usize, span: Span },
    #[error("`{name}` was never resolved")]
    UnresolvedIdentifier { name: String, span: Span },
}

pub type CompileResult<T> = Result<T, CompileError>;

impl CompileError {
    pub fn span(&self) -> Span {
        match self {
            CompileError::TooManyConstants { span }
            | CompileError::TooManyLocals { span, .. }
            | CompileError::TooManyCaptures { span, .. }
            | CompileError::TooManyFunctions { span }
            | CompileError::TooManyStructs { span }
            | CompileError::JumpOutOfRange { span, .. }
            | CompileError::TooManyArguments { span, .. }
            | CompileError::UnresolvedIdentifier { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CompileError::UnresolvedIdentifier { .. } => {
                Diagnostic::make_error(&UNRESOLVED_AST, self.to_string(), self.span())
                    .with_hint("Run the resolver before compiling.")
            }
            _ => Diagnostic::make_error(&OPERAND_OVERFLOW, self.to_string(), self.span())
                .with_hint("Bytecode operands are 2 bytes wide; split the program into smaller functions."),
        }
    }
}
