pub mod block;
pub mod expression;
pub mod lexer;
pub mod parser;
pub mod precedence;
pub mod program;
pub mod statement;
pub mod token;
pub mod token_type;

use crate::diagnostics::Diagnostic;

use self::{lexer::Lexer, parser::Parser, program::Program};

/// Scans and parses `source`, returning every syntax diagnostic on failure.
pub fn parse(source: &str) -> Result<Program, Vec<Diagnostic>> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();
    if parser.errors.is_empty() {
        Ok(program)
    } else {
        Err(parser.errors)
    }
}
