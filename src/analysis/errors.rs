use crate::diagnostics::{
    BREAK_OUTSIDE_LOOP, CONST_VIOLATION, CONTINUE_OUTSIDE_LOOP, DUPLICATE_SYMBOL, Diagnostic,
    ErrorCode, Span, THIS_OUTSIDE_STRUCT, UNDEFINED_SYMBOL,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResolveErrorKind {
    #[error("duplicate symbol")]
    DuplicateSymbol,
    #[error("undefined symbol")]
    UndefinedSymbol,
    #[error("assignment to constant")]
    ConstViolation,
    #[error("`break` outside of a loop")]
    BreakOutsideLoop,
    #[error("`continue` outside of a loop")]
    ContinueOutsideLoop,
    #[error("`this` outside of a struct literal")]
    ThisOutsideStruct,
}

impl ResolveErrorKind {
    pub fn error_code(self) -> &'static ErrorCode {
        match self {
            ResolveErrorKind::DuplicateSymbol => &DUPLICATE_SYMBOL,
            ResolveErrorKind::UndefinedSymbol => &UNDEFINED_SYMBOL,
            ResolveErrorKind::ConstViolation => &CONST_VIOLATION,
            ResolveErrorKind::BreakOutsideLoop => &BREAK_OUTSIDE_LOOP,
            ResolveErrorKind::ContinueOutsideLoop => &CONTINUE_OUTSIDE_LOOP,
            ResolveErrorKind::ThisOutsideStruct => &THIS_OUTSIDE_STRUCT,
        }
    }
}

/// A static error found while resolving names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: `{name}` at {span}")]
pub struct ResolveError {
    pub kind: ResolveErrorKind,
    pub name: String,
    pub span: Span,
}

impl ResolveError {
    pub fn new(kind: ResolveErrorKind, name: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            name: name.into(),
            span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let name = &self.name;
        let (message, hint) = match self.kind {
            ResolveErrorKind::DuplicateSymbol => (
                format!("`{}` is already defined in this scope.", name),
                Some("Use a different name, or assign to the existing variable."),
            ),
            ResolveErrorKind::UndefinedSymbol => (format!("`{}` is not defined.", name), None),
            ResolveErrorKind::ConstViolation => (
                format!("Cannot assign to `{}` because it is a constant.", name),
                Some("Declare it with `let` if it needs to change."),
            ),
            ResolveErrorKind::BreakOutsideLoop => {
                ("`break` can only appear inside a loop.".to_string(), None)
            }
            ResolveErrorKind::ContinueOutsideLoop => {
                ("`continue` can only appear inside a loop.".to_string(), None)
            }
            ResolveErrorKind::ThisOutsideStruct => (
                "`this` can only appear inside a struct literal.".to_string(),
                None,
            ),
        };

        let diag = Diagnostic::make_error(self.kind.error_code(), message, self.span);
        match hint {
            Some(hint) => diag.with_hint(hint),
            None => diag,
        }
    }
}
