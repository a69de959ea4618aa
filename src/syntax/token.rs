use std::fmt;

use crate::diagnostics::{Position, Span};

use super::token_type::TokenType;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub literal: String,
    pub position: Position,
    pub end_position: Position,
}

impl Token {
    pub fn new(
        token_type: TokenType,
        literal: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        let literal = literal.into();
        let end_position = Position::new(line, column + literal.chars().count());
        Self {
            token_type,
            literal,
            position: Position::new(line, column),
            end_position,
        }
    }

    pub fn new_with_end(
        token_type: TokenType,
        literal: impl Into<String>,
        position: Position,
        end_position: Position,
    ) -> Self {
        Self {
            token_type,
            literal: literal.into(),
            position,
            end_position,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.position, self.end_position)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token({}, {:?}, {})",
            self.token_type, self.literal, self.position
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_new() {
        let tok = Token::new(TokenType::Let, "let", 1, 5);
        assert_eq!(tok.token_type, TokenType::Let);
        assert_eq!(tok.literal, "let");
        assert_eq!(tok.position, Position::new(1, 5));
        assert_eq!(tok.end_position, Position::new(1, 8));
    }

    #[test]
    fn test_token_display() {
        let tok = Token::new(TokenType::Let, "let", 1, 5);
        let s = format!("{}", tok);
        assert!(s.contains("let"));
        assert!(s.contains("1:5"));
    }
}
