use crate::diagnostics::{
    Diagnostic, EXPECTED_EXPRESSION, ILLEGAL_CHARACTER, NESTING_TOO_DEEP, Position, Span,
    UNEXPECTED_TOKEN, UNTERMINATED_COMMENT, UNTERMINATED_STRING,
};
use crate::syntax::{
    block::Block,
    expression::{Expression, Identifier},
    precedence::{Precedence, token_precedence},
    token_type::TokenType,
};

use super::{MAX_NESTING, Parser};

impl Parser {
    // Token navigation
    pub(super) fn next_token(&mut self) {
        self.current_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    pub(super) fn is_current_token(&self, token_type: TokenType) -> bool {
        self.current_token.token_type == token_type
    }

    pub(super) fn is_peek_token(&self, token_type: TokenType) -> bool {
        self.peek_token.token_type == token_type
    }

    pub(super) fn expect_peek(&mut self, token_type: TokenType) -> bool {
        if self.is_peek_token(token_type) {
            self.next_token();
            true
        } else {
            self.peek_error(token_type);
            false
        }
    }

    // Span/position utilities
    pub(super) fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.current_token.end_position)
    }

    pub(super) fn peek_precedence(&self) -> Precedence {
        token_precedence(self.peek_token.token_type)
    }

    pub(super) fn current_identifier(&self) -> Identifier {
        Identifier::new(self.current_token.literal.clone(), self.current_token.span())
    }

    // Complex parsing helpers
    pub(super) fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut identifiers = Vec::new();

        if self.is_peek_token(TokenType::RParen) {
            self.next_token();
            return Some(identifiers);
        }

        if !self.expect_peek(TokenType::Ident) {
            return None;
        }
        identifiers.push(self.current_identifier());

        while self.is_peek_token(TokenType::Comma) {
            self.next_token();
            if !self.expect_peek(TokenType::Ident) {
                return None;
            }
            identifiers.push(self.current_identifier());
        }

        if !self.expect_peek(TokenType::RParen) {
            return None;
        }

        Some(identifiers)
    }

    /// Parses `{ stmt* }`; expects the current token to be `{` and leaves it on `}`.
    pub(super) fn parse_block(&mut self) -> Block {
        let start = self.current_token.position;
        if self.enter_nesting().is_none() {
            self.skip_balanced_braces();
            return Block {
                statements: Vec::new(),
                span: self.span_from(start),
            };
        }
        let block = self.parse_block_statements(start);
        self.depth -= 1;
        block
    }

    fn parse_block_statements(&mut self, start: Position) -> Block {
        let mut statements = Vec::new();
        self.next_token();

        while !self.is_current_token(TokenType::RBrace) && !self.is_current_token(TokenType::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }

        if self.is_current_token(TokenType::Eof) {
            self.errors.push(Diagnostic::make_error(
                &UNEXPECTED_TOKEN,
                "Expected `}` to close this block, reached end of file.",
                Span::point(start),
            ));
        }

        Block {
            statements,
            span: self.span_from(start),
        }
    }

    /// Moves from the current `{` to its matching `}` without recursing.
    fn skip_balanced_braces(&mut self) {
        let mut open = 0usize;
        loop {
            match self.current_token.token_type {
                TokenType::LBrace => open += 1,
                TokenType::RBrace => {
                    open = open.saturating_sub(1);
                    if open == 0 {
                        return;
                    }
                }
                TokenType::Eof => return,
                _ => {}
            }
            self.next_token();
        }
    }

    pub(super) fn enter_nesting(&mut self) -> Option<()> {
        if self.depth >= MAX_NESTING {
            self.errors.push(Diagnostic::make_error(
                &NESTING_TOO_DEEP,
                format!("Nesting exceeds the limit of {} levels.", MAX_NESTING),
                self.current_token.span(),
            ));
            return None;
        }
        self.depth += 1;
        Some(())
    }

    pub(super) fn parse_expression_list(&mut self, end: TokenType) -> Option<Vec<Expression>> {
        let mut list = Vec::new();

        if self.is_peek_token(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.is_peek_token(TokenType::Comma) {
            self.next_token();
            if self.is_peek_token(end) {
                break;
            }
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }

        Some(list)
    }

    // Error handling
    pub(super) fn no_prefix_parse_error(&mut self) {
        let found = if self.is_current_token(TokenType::Eof) {
            "end of file".to_string()
        } else {
            format!("`{}`", self.current_token.literal)
        };
        self.errors.push(Diagnostic::make_error(
            &EXPECTED_EXPRESSION,
            format!("Expected an expression, found {}.", found),
            self.current_token.span(),
        ));
    }

    /// Reports the lexer's error tokens (illegal characters, unterminated literals).
    pub(super) fn lexical_error(&mut self) {
        let span = self.current_token.span();
        let diag = match self.current_token.token_type {
            TokenType::UnterminatedString => Diagnostic::make_error(
                &UNTERMINATED_STRING,
                "This string literal is missing its closing `\"`.",
                span,
            ),
            TokenType::UnterminatedComment => Diagnostic::make_error(
                &UNTERMINATED_COMMENT,
                "This block comment is missing its closing `*/`.",
                span,
            ),
            _ => Diagnostic::make_error(
                &ILLEGAL_CHARACTER,
                format!("Unexpected character `{}`.", self.current_token.literal),
                span,
            ),
        };
        self.errors.push(diag);
    }

    pub(super) fn is_lexical_error(token_type: TokenType) -> bool {
        matches!(
            token_type,
            TokenType::Illegal | TokenType::UnterminatedString | TokenType::UnterminatedComment
        )
    }

    /// Skips to the end of the broken statement so the caller's `next_token`
    /// lands on the start of the next one.
    pub(super) fn synchronize_after_error(&mut self) {
        while !self.is_current_token(TokenType::Semicolon)
            && !self.is_current_token(TokenType::Eof)
            && !self.is_peek_token(TokenType::RBrace)
            && !self.is_peek_token(TokenType::Eof)
        {
            self.next_token();
        }
    }

    pub(super) fn peek_error(&mut self, expected: TokenType) {
        if Self::is_lexical_error(self.peek_token.token_type) {
            self.next_token();
            self.lexical_error();
            return;
        }
        let mut diag = Diagnostic::make_error(
            &UNEXPECTED_TOKEN,
            format!(
                "Expected `{}`, got `{}`.",
                expected, self.peek_token.token_type
            ),
            self.peek_token.span(),
        );
        if matches!(
            expected,
            TokenType::Semicolon | TokenType::RParen | TokenType::RBracket | TokenType::RBrace
        ) {
            diag = diag.with_hint(format!("Insert `{}` here.", expected));
        }
        self.errors.push(diag);
    }
}
