use crate::diagnostics::{Diagnostic, INVALID_ASSIGNMENT_TARGET, INVALID_NUMBER};
use crate::syntax::{
    expression::{
        Expression, FnExpr, FnInfo, InfixOp, PostfixOp, PrefixOp, StructField, StructLit,
    },
    precedence::{Precedence, rhs_precedence_for_infix},
    token_type::TokenType,
};

use super::Parser;

impl Parser {
    pub(super) fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let depth = self.depth;
        let expression = self.parse_nested_expression(precedence);
        self.depth = depth;
        expression
    }

    /// Each operand and each chained infix counts one level toward `MAX_NESTING`.
    fn parse_nested_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        self.enter_nesting()?;
        let mut left = self.parse_prefix()?;

        while !self.is_peek_token(TokenType::Semicolon) && precedence < self.peek_precedence() {
            self.next_token();
            self.enter_nesting()?;
            left = self.parse_infix(left)?;
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        let span = self.current_token.span();
        match self.current_token.token_type {
            TokenType::Ident => Some(Expression::Identifier(self.current_identifier())),
            TokenType::Int => self.parse_integer(),
            TokenType::Float => self.parse_float(),
            TokenType::String => Some(Expression::String {
                value: self.current_token.literal.clone(),
                span,
            }),
            TokenType::True => Some(Expression::Boolean { value: true, span }),
            TokenType::False => Some(Expression::Boolean { value: false, span }),
            TokenType::Null => Some(Expression::Null { span }),
            TokenType::This => Some(Expression::This(self.current_identifier())),
            TokenType::Bang | TokenType::Minus => self.parse_prefix_expression(),
            TokenType::LParen => self.parse_grouped_expression(),
            TokenType::LBracket => self.parse_list_literal(),
            TokenType::Fn => self.parse_function_literal(None).map(Expression::Function),
            TokenType::LBrace => self.parse_struct_literal(),
            token_type if Self::is_lexical_error(token_type) => {
                self.lexical_error();
                None
            }
            _ => {
                self.no_prefix_parse_error();
                None
            }
        }
    }

    fn parse_infix(&mut self, left: Expression) -> Option<Expression> {
        match self.current_token.token_type {
            TokenType::LParen => self.parse_call_expression(left),
            TokenType::LBracket => self.parse_index_expression(left),
            TokenType::Dot => self.parse_field_expression(left),
            TokenType::PlusPlus | TokenType::MinusMinus => self.parse_postfix_expression(left),
            TokenType::Assign => self.parse_assignment(left),
            _ => self.parse_infix_expression(left),
        }
    }

    fn parse_integer(&mut self) -> Option<Expression> {
        let span = self.current_token.span();
        match self.current_token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::Integer { value, span }),
            Err(_) => {
                self.errors.push(Diagnostic::make_error(
                    &INVALID_NUMBER,
                    format!(
                        "Integer literal `{}` does not fit in 64 bits.",
                        self.current_token.literal
                    ),
                    span,
                ));
                None
            }
        }
    }

    fn parse_float(&mut self) -> Option<Expression> {
        let span = self.current_token.span();
        match self.current_token.literal.parse::<f64>() {
            Ok(value) => Some(Expression::Float { value, span }),
            Err(_) => {
                self.errors.push(Diagnostic::make_error(
                    &INVALID_NUMBER,
                    format!("Invalid float literal `{}`.", self.current_token.literal),
                    span,
                ));
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let start = self.current_token.position;
        let operator = match self.current_token.token_type {
            TokenType::Bang => PrefixOp::Not,
            _ => PrefixOp::Neg,
        };
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;

        Some(Expression::Prefix {
            operator,
            right: Box::new(right),
            span: self.span_from(start),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let token_type = self.current_token.token_type;
        let operator = match token_type {
            TokenType::Plus => InfixOp::Add,
            TokenType::Minus => InfixOp::Sub,
            TokenType::Asterisk => InfixOp::Mul,
            TokenType::Slash => InfixOp::Div,
            TokenType::Percent => InfixOp::Mod,
            TokenType::Eq => InfixOp::Eq,
            TokenType::NotEq => InfixOp::NotEq,
            TokenType::Lt => InfixOp::Lt,
            TokenType::Lte => InfixOp::Lte,
            TokenType::Gt => InfixOp::Gt,
            TokenType::Gte => InfixOp::Gte,
            TokenType::And => InfixOp::And,
            TokenType::Or => InfixOp::Or,
            _ => {
                self.no_prefix_parse_error();
                return None;
            }
        };
        let precedence = rhs_precedence_for_infix(token_type);
        self.next_token();
        let right = self.parse_expression(precedence)?;
        let span = left.span().merge(right.span());

        Some(Expression::Infix {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            span,
        })
    }

    fn parse_assignment(&mut self, left: Expression) -> Option<Expression> {
        let left_span = left.span();
        let target = match left.into_target() {
            Ok(target) => target,
            Err(other) => {
                self.errors.push(
                    Diagnostic::make_error(
                        &INVALID_ASSIGNMENT_TARGET,
                        format!("Cannot assign to `{}`.", other),
                        left_span,
                    )
                    .with_hint("Only variables, fields and index expressions can be assigned."),
                );
                return None;
            }
        };
        let precedence = rhs_precedence_for_infix(TokenType::Assign);
        self.next_token();
        let value = self.parse_expression(precedence)?;
        let span = left_span.merge(value.span());

        Some(Expression::Assign {
            target,
            value: Box::new(value),
            span,
        })
    }

    fn parse_postfix_expression(&mut self, left: Expression) -> Option<Expression> {
        let operator = match self.current_token.token_type {
            TokenType::PlusPlus => PostfixOp::Increment,
            _ => PostfixOp::Decrement,
        };
        let left_span = left.span();
        let span = left_span.merge(self.current_token.span());
        match left.into_target() {
            Ok(target) => Some(Expression::Postfix {
                target,
                operator,
                span,
            }),
            Err(other) => {
                self.errors.push(Diagnostic::make_error(
                    &INVALID_ASSIGNMENT_TARGET,
                    format!("Cannot apply `{}` to `{}`.", operator, other),
                    left_span,
                ));
                None
            }
        }
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expression = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenType::RParen) {
            return None;
        }
        Some(expression)
    }

    fn parse_list_literal(&mut self) -> Option<Expression> {
        let start = self.current_token.position;
        let elements = self.parse_expression_list(TokenType::RBracket)?;
        Some(Expression::List {
            elements,
            span: self.span_from(start),
        })
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let start = function.span().start;
        let arguments = self.parse_expression_list(TokenType::RParen)?;
        Some(Expression::Call {
            function: Box::new(function),
            arguments,
            span: self.span_from(start),
        })
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        let start = left.span().start;
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenType::RBracket) {
            return None;
        }
        Some(Expression::Index {
            left: Box::new(left),
            index: Box::new(index),
            span: self.span_from(start),
        })
    }

    fn parse_field_expression(&mut self, object: Expression) -> Option<Expression> {
        let start = object.span().start;
        if !self.expect_peek(TokenType::Ident) {
            return None;
        }
        Some(Expression::Field {
            object: Box::new(object),
            name: self.current_token.literal.clone(),
            span: self.span_from(start),
        })
    }

    /// Parses `(params) { body }` following the current `fn` (or function name) token.
    pub(super) fn parse_function_literal(&mut self, name: Option<String>) -> Option<Box<FnExpr>> {
        let start = self.current_token.position;
        if !self.expect_peek(TokenType::LParen) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;
        if !self.expect_peek(TokenType::LBrace) {
            return None;
        }
        let body = self.parse_block();

        Some(Box::new(FnExpr {
            name,
            parameters,
            body,
            span: self.span_from(start),
            info: FnInfo::default(),
        }))
    }

    fn parse_struct_literal(&mut self) -> Option<Expression> {
        let start = self.current_token.position;
        let mut fields = Vec::new();

        while !self.is_peek_token(TokenType::RBrace) {
            if !self.expect_peek(TokenType::Ident) {
                return None;
            }
            let key = self.current_token.literal.clone();
            let key_span = self.current_token.span();
            if !self.expect_peek(TokenType::Colon) {
                return None;
            }
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            fields.push(StructField {
                key,
                key_span,
                value,
            });

            if !self.is_peek_token(TokenType::Comma) {
                break;
            }
            self.next_token();
        }

        if !self.expect_peek(TokenType::RBrace) {
            return None;
        }

        Some(Expression::Struct(StructLit {
            fields,
            this_slot: None,
            span: self.span_from(start),
        }))
    }
}
