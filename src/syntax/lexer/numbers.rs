//! Number literal scanning (decimal integers and floats, `_` separators allowed)

use super::Lexer;

impl Lexer {
    /// Returns the literal text (without separators) and whether it is a float.
    pub(super) fn read_number(&mut self) -> (String, bool) {
        let mut text = String::new();
        let mut is_float = false;

        self.consume_digits(&mut text);

        if self.current_char == Some('.') && self.peek_char().is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            text.push('.');
            self.read_char();
            self.consume_digits(&mut text);
        }

        if matches!(self.current_char, Some('e' | 'E')) {
            let next = self.peek_char();
            let has_exponent = next.is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-');
            if has_exponent {
                is_float = true;
                text.push('e');
                self.read_char();
                if let Some(sign @ ('+' | '-')) = self.current_char {
                    text.push(sign);
                    self.read_char();
                }
                self.consume_digits(&mut text);
            }
        }

        (text, is_float)
    }

    fn consume_digits(&mut self, text: &mut String) {
        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                text.push(ch);
            } else if ch != '_' {
                break;
            }
            self.read_char();
        }
    }
}
