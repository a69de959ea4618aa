use crate::diagnostics::{Diagnostic, MISSING_INITIALIZER};
use crate::syntax::{
    block::Block,
    expression::Expression,
    precedence::Precedence,
    statement::{Decl, DeclKind, Statement},
    token_type::TokenType,
};

use super::Parser;

impl Parser {
    pub(super) fn parse_statement(&mut self) -> Option<Statement> {
        let errors_before = self.errors.len();

        let statement = match self.current_token.token_type {
            TokenType::Let => self.parse_let_statement(DeclKind::Let),
            TokenType::Const => self.parse_let_statement(DeclKind::Const),
            TokenType::Fn if self.is_peek_token(TokenType::Ident) => {
                self.parse_function_statement()
            }
            TokenType::If => self.parse_if_statement(),
            TokenType::While => self.parse_while_statement(),
            TokenType::For => self.parse_for_statement(),
            TokenType::Break => self.parse_loop_control(true),
            TokenType::Continue => self.parse_loop_control(false),
            TokenType::Return => self.parse_return_statement(),
            TokenType::LBrace => Some(Statement::Block(self.parse_block())),
            // Stray `;` is an empty statement.
            TokenType::Semicolon => None,
            token_type if Self::is_lexical_error(token_type) => {
                self.lexical_error();
                None
            }
            _ => self.parse_expression_statement(),
        };

        if statement.is_none() && self.errors.len() > errors_before {
            self.synchronize_after_error();
        }
        statement
    }

    fn parse_let_statement(&mut self, kind: DeclKind) -> Option<Statement> {
        let start = self.current_token.position;
        let mut decls = Vec::new();

        loop {
            if !self.expect_peek(TokenType::Ident) {
                return None;
            }
            let name = self.current_identifier();

            let value = if self.is_peek_token(TokenType::Assign) {
                self.next_token();
                self.next_token();
                let mut value = self.parse_expression(Precedence::Lowest)?;
                if let Expression::Function(function) = &mut value {
                    function.name.get_or_insert_with(|| name.name.clone());
                }
                Some(value)
            } else {
                if kind == DeclKind::Const {
                    self.errors.push(
                        Diagnostic::make_error(
                            &MISSING_INITIALIZER,
                            format!("Constant `{}` must be initialized.", name.name),
                            name.span,
                        )
                        .with_hint(format!("Write `const {} = <value>;`.", name.name)),
                    );
                }
                None
            };
            decls.push(Decl { name, value });

            if !self.is_peek_token(TokenType::Comma) {
                break;
            }
            self.next_token();
        }

        if !self.expect_peek(TokenType::Semicolon) {
            return None;
        }

        Some(Statement::Let {
            kind,
            decls,
            span: self.span_from(start),
        })
    }

    /// `fn name(params) { body }` declares a constant bound to the literal.
    fn parse_function_statement(&mut self) -> Option<Statement> {
        let start = self.current_token.position;
        self.next_token();
        let name = self.current_identifier();

        // `parse_function_literal` only needs the `(` to be next.
        let function = self.parse_function_literal(Some(name.name.clone()))?;

        Some(Statement::Let {
            kind: DeclKind::Const,
            decls: vec![Decl {
                name,
                value: Some(Expression::Function(function)),
            }],
            span: self.span_from(start),
        })
    }

    fn parse_if_statement(&mut self) -> Option<Statement> {
        let start = self.current_token.position;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenType::LBrace) {
            return None;
        }
        let consequence = self.parse_block();

        let alternative = if self.is_peek_token(TokenType::Else) {
            self.next_token();
            if self.is_peek_token(TokenType::If) {
                self.next_token();
                let nested_start = self.current_token.position;
                let nested = self.parse_if_statement()?;
                Some(Block {
                    statements: vec![nested],
                    span: self.span_from(nested_start),
                })
            } else {
                if !self.expect_peek(TokenType::LBrace) {
                    return None;
                }
                Some(self.parse_block())
            }
        } else {
            None
        };

        Some(Statement::If {
            condition,
            consequence,
            alternative,
            span: self.span_from(start),
        })
    }

    fn parse_while_statement(&mut self) -> Option<Statement> {
        let start = self.current_token.position;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenType::LBrace) {
            return None;
        }
        let body = self.parse_block();

        Some(Statement::While {
            condition,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_for_statement(&mut self) -> Option<Statement> {
        let start = self.current_token.position;
        if !self.expect_peek(TokenType::Ident) {
            return None;
        }
        let variable = self.current_identifier();
        if !self.expect_peek(TokenType::In) {
            return None;
        }
        self.next_token();
        let iterable = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenType::LBrace) {
            return None;
        }
        let body = self.parse_block();

        Some(Statement::For {
            variable,
            iterable,
            body,
            slots: None,
            span: self.span_from(start),
        })
    }

    fn parse_loop_control(&mut self, is_break: bool) -> Option<Statement> {
        let start = self.current_token.position;
        if !self.expect_peek(TokenType::Semicolon) {
            return None;
        }
        let span = self.span_from(start);
        Some(if is_break {
            Statement::Break { span }
        } else {
            Statement::Continue { span }
        })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let start = self.current_token.position;

        if self.is_peek_token(TokenType::Semicolon) {
            self.next_token();
            return Some(Statement::Return {
                value: None,
                span: self.span_from(start),
            });
        }

        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenType::Semicolon) {
            return None;
        }

        Some(Statement::Return {
            value: Some(value),
            span: self.span_from(start),
        })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let start = self.current_token.position;
        let expression = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenType::Semicolon) {
            return None;
        }

        Some(Statement::Expression {
            expression,
            span: self.span_from(start),
        })
    }
}
