use crate::diagnostics::{
    ARITY_MISMATCH, DIVIDE_BY_ZERO, Diagnostic, ErrorCode, INDEX_OUT_OF_BOUNDS, INVALID_BYTECODE,
    NO_SUCH_FIELD, NOT_CALLABLE, OUTPUT_FAILED, Position, STACK_OVERFLOW, Span, TYPE_MISMATCH,
    UNINITIALIZED_OBJECT,
};

use super::{value::Value, vm::MAX_FRAMES};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("`{name}` expects {expected} argument(s) but got {got}")]
    ArityMismatch {
        name: String,
        expected: String,
        got: usize,
    },
    #[error("value of type {0} is not callable")]
    NotCallable(&'static str),
    #[error("{0}")]
    TypeMismatch(String),
    #[error("division by zero")]
    DivideByZero,
    #[error("index {index} is out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },
    #[error("struct has no field `{0}`")]
    NoSuchField(String),
    #[error("struct used before all of its fields were initialized")]
    UninitializedObject,
    #[error("call depth exceeded {} frames", MAX_FRAMES)]
    StackOverflow,
    #[error("invalid bytecode: {0}")]
    InvalidBytecode(String),
    #[error("failed to write output: {0}")]
    Output(String),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

impl RuntimeError {
    pub fn arity(name: impl Into<String>, expected: impl Into<String>, got: usize) -> Self {
        RuntimeError::ArityMismatch {
            name: name.into(),
            expected: expected.into(),
            got,
        }
    }

    /// `what` describes the operation, e.g. "cannot add Int and String".
    pub fn type_mismatch(what: impl Into<String>) -> Self {
        RuntimeError::TypeMismatch(what.into())
    }

    pub fn expected(context: &str, expected: &str, found: &Value) -> Self {
        RuntimeError::TypeMismatch(format!(
            "{} expected {}, got {}",
            context,
            expected,
            found.type_name()
        ))
    }

    pub fn error_code(&self) -> &'static ErrorCode {
        match self {
            RuntimeError::ArityMismatch { .. } => &ARITY_MISMATCH,
            RuntimeError::NotCallable(_) => &NOT_CALLABLE,
            RuntimeError::TypeMismatch(_) => &TYPE_MISMATCH,
            RuntimeError::DivideByZero => &DIVIDE_BY_ZERO,
            RuntimeError::IndexOutOfBounds { .. } => &INDEX_OUT_OF_BOUNDS,
            RuntimeError::NoSuchField(_) => &NO_SUCH_FIELD,
            RuntimeError::UninitializedObject => &UNINITIALIZED_OBJECT,
            RuntimeError::StackOverflow => &STACK_OVERFLOW,
            RuntimeError::InvalidBytecode(_) => &INVALID_BYTECODE,
            RuntimeError::Output(_) => &OUTPUT_FAILED,
        }
    }
}

/// One open frame at the time of a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub function: String,
    pub line: usize,
}

/// A runtime error together with the call stack it unwound, innermost first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{error}")]
pub struct RuntimeFault {
    pub error: RuntimeError,
    pub trace: Vec<TraceEntry>,
}

impl RuntimeFault {
    pub fn new(error: RuntimeError, trace: Vec<TraceEntry>) -> Self {
        Self { error, trace }
    }

    /// Line of the innermost frame, if any frame was open.
    pub fn line(&self) -> Option<usize> {
        self.trace.first().map(|entry| entry.line).filter(|line| *line > 0)
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = self.error.error_code();
        let diag = Diagnostic::error(code.title)
            .with_code(code.code)
            .with_error_type(code.error_type)
            .with_message(self.error.to_string());
        match self.line() {
            // Underline the whole line; the bytecode only knows line numbers.
            Some(line) => diag.with_span(Span::new(
                Position::new(line, 0),
                Position::new(line + 1, 0),
            )),
            None => diag,
        }
    }

    /// Diagnostic followed by the stack trace.
    pub fn render(&self, source: Option<&str>, file: Option<&str>) -> String {
        let mut rendered = self.to_diagnostic().render(source, file);
        if !self.trace.is_empty() {
            if !rendered.ends_with('\n') {
                rendered.push('\n');
            }
            rendered.push_str("\nStack trace:");
            for entry in &self.trace {
                rendered.push_str(&format!("\n  at {} (line {})", entry.function, entry.line));
            }
            rendered.push('\n');
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_lists_frames_innermost_first() {
        let fault = RuntimeFault::new(
            RuntimeError::DivideByZero,
            vec![
                TraceEntry {
                    function: "inner".to_string(),
                    line: 3,
                },
                TraceEntry {
                    function: "<main>".to_string(),
                    line: 5,
                },
            ],
        );
        let rendered = fault.render(None, Some("div.em"));

        assert!(rendered.contains("[E1003]"));
        assert!(rendered.contains("div.em:3:1"));
        assert!(rendered.contains("Stack trace:\n  at inner (line 3)\n  at <main> (line 5)"));
    }

    #[test]
    fn arity_message_names_the_callee() {
        let error = RuntimeError::arity("f", "0", 1);
        assert_eq!(error.to_string(), "`f` expects 0 argument(s) but got 1");
        assert_eq!(error.error_code().code, "E1000");
    }
}
