//! String literal scanning

use crate::diagnostics::Position;

use super::Lexer;
use crate::syntax::{token::Token, token_type::TokenType};

impl Lexer {
    pub(super) fn read_string(&mut self) -> Token {
        let start = self.current_position();
        self.read_char(); // opening quote
        let mut value = String::new();

        loop {
            match self.current_char {
                None | Some('\n') => {
                    return Token::new_with_end(
                        TokenType::UnterminatedString,
                        value,
                        start,
                        self.current_position(),
                    );
                }
                Some('"') => {
                    self.read_char();
                    break;
                }
                Some('\\') => {
                    self.read_char();
                    match self.current_char {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some('0') => value.push('\0'),
                        Some('\\') => value.push('\\'),
                        Some('"') => value.push('"'),
                        Some(other) => {
                            value.push('\\');
                            value.push(other);
                        }
                        None => continue,
                    }
                    self.read_char();
                }
                Some(ch) => {
                    value.push(ch);
                    self.read_char();
                }
            }
        }

        let end = Position::new(self.line, self.column);
        Token::new_with_end(TokenType::String, value, start, end)
    }
}
