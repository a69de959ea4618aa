use std::fmt;

use crate::diagnostics::Span;

use super::block::Block;
use super::expression::{FnExpr, FnInfo};

/// A parsed source file. The top level is the body of a zero-parameter root
/// function, so top-level variables are ordinary locals of the root frame.
#[derive(Debug, Clone)]
pub struct Program {
    pub root: FnExpr,
}

pub const ROOT_FUNCTION_NAME: &str = "<main>";

impl Program {
    pub fn new(body: Block) -> Self {
        let span = body.span;
        Self {
            root: FnExpr {
                name: Some(ROOT_FUNCTION_NAME.to_string()),
                parameters: Vec::new(),
                body,
                span,
                info: FnInfo::default(),
            },
        }
    }

    pub fn statements(&self) -> &[super::statement::Statement] {
        &self.root.body.statements
    }

    pub fn span(&self) -> Span {
        self.root.span
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in self.statements() {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}
