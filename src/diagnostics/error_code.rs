//! Error code registry shared by every phase.

/// Distinguishes between compile-time and runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    Compiler,
    Runtime,
}

impl ErrorType {
    /// Returns the prefix string used in error headers
    pub fn prefix(&self) -> &'static str {
        match self {
            ErrorType::Compiler => "Compiler error",
            ErrorType::Runtime => "Runtime error",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ErrorCode {
    pub code: &'static str,
    pub title: &'static str,
    pub error_type: ErrorType,
}

const fn compiler(code: &'static str, title: &'static str) -> ErrorCode {
    ErrorCode {
        code,
        title,
        error_type: ErrorType::Compiler,
    }
}

const fn runtime(code: &'static str, title: &'static str) -> ErrorCode {
    ErrorCode {
        code,
        title,
        error_type: ErrorType::Runtime,
    }
}

// Scanner / parser
pub const UNEXPECTED_TOKEN: ErrorCode = compiler("E0001", "UNEXPECTED TOKEN");
pub const EXPECTED_EXPRESSION: ErrorCode = compiler("E0002", "EXPECTED EXPRESSION");
pub const ILLEGAL_CHARACTER: ErrorCode = compiler("E0003", "ILLEGAL CHARACTER");
pub const UNTERMINATED_STRING: ErrorCode = compiler("E0004", "UNTERMINATED STRING");
pub const UNTERMINATED_COMMENT: ErrorCode = compiler("E0005", "UNTERMINATED COMMENT");
pub const INVALID_NUMBER: ErrorCode = compiler("E0006", "INVALID NUMBER");
pub const INVALID_ASSIGNMENT_TARGET: ErrorCode = compiler("E0007", "INVALID ASSIGNMENT TARGET");
pub const MISSING_INITIALIZER: ErrorCode = compiler("E0008", "MISSING INITIALIZER");
pub const NESTING_TOO_DEEP: ErrorCode = compiler("E0009", "NESTING TOO DEEP");

// Resolver
pub const DUPLICATE_SYMBOL: ErrorCode = compiler("E0101", "DUPLICATE SYMBOL");
pub const UNDEFINED_SYMBOL: ErrorCode = compiler("E0102", "UNDEFINED SYMBOL");
pub const CONST_VIOLATION: ErrorCode = compiler("E0103", "CONST VIOLATION");
pub const BREAK_OUTSIDE_LOOP: ErrorCode = compiler("E0104", "BREAK OUTSIDE LOOP");
pub const CONTINUE_OUTSIDE_LOOP: ErrorCode = compiler("E0105", "CONTINUE OUTSIDE LOOP");
pub const THIS_OUTSIDE_STRUCT: ErrorCode = compiler("E0106", "THIS OUTSIDE STRUCT");

// Compiler
pub const OPERAND_OVERFLOW: ErrorCode = compiler("E0201", "OPERAND OVERFLOW");
pub const UNRESOLVED_AST: ErrorCode = compiler("E0202", "UNRESOLVED AST");

// Runtime
pub const ARITY_MISMATCH: ErrorCode = runtime("E1000", "ARITY MISMATCH");
pub const NOT_CALLABLE: ErrorCode = runtime("E1001", "NOT CALLABLE");
pub const TYPE_MISMATCH: ErrorCode = runtime("E1002", "TYPE MISMATCH");
pub const DIVIDE_BY_ZERO: ErrorCode = runtime("E1003", "DIVIDE BY ZERO");
pub const INDEX_OUT_OF_BOUNDS: ErrorCode = runtime("E1004", "INDEX OUT OF BOUNDS");
pub const NO_SUCH_FIELD: ErrorCode = runtime("E1005", "NO SUCH FIELD");
pub const UNINITIALIZED_OBJECT: ErrorCode = runtime("E1006", "UNINITIALIZED OBJECT");
pub const STACK_OVERFLOW: ErrorCode = runtime("E1007", "STACK OVERFLOW");
pub const INVALID_BYTECODE: ErrorCode = runtime("E1008", "INVALID BYTECODE");
pub const OUTPUT_FAILED: ErrorCode = runtime("E1009", "OUTPUT FAILED");
