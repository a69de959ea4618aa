use crate::diagnostics::{Diagnostic, Span, UNEXPECTED_TOKEN};

use super::{
    block::Block, lexer::Lexer, program::Program, token::Token, token_type::TokenType,
};

mod expression;
mod helpers;
mod statement;

/// Deepest expression or block nesting the parser accepts.
pub const MAX_NESTING: usize = 512;

pub struct Parser {
    pub(super) lexer: Lexer,
    pub(super) current_token: Token,
    pub(super) peek_token: Token,
    pub(super) depth: usize,
    pub errors: Vec<Diagnostic>,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        let mut parser = Parser {
            lexer,
            current_token: Token::new(TokenType::Eof, "", 0, 0),
            peek_token: Token::new(TokenType::Eof, "", 0, 0),
            depth: 0,
            errors: Vec::new(),
        };
        parser.next_token();
        parser.next_token();
        parser
    }

    pub fn parse_program(&mut self) -> Program {
        let start = self.current_token.position;
        let mut statements = Vec::new();

        while self.current_token.token_type != TokenType::Eof {
            if self.current_token.token_type == TokenType::RBrace {
                self.errors.push(Diagnostic::make_error(
                    &UNEXPECTED_TOKEN,
                    "Unexpected `}` outside of a block.",
                    self.current_token.span(),
                ));
                self.next_token();
                continue;
            }
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }

        Program::new(Block {
            statements,
            span: Span::new(start, self.current_token.end_position),
        })
    }
}
