//! Whitespace and comment skipping

use super::Lexer;

impl Lexer {
    pub(super) fn skip_ignorable(&mut self) {
        loop {
            while matches!(self.current_char, Some(' ' | '\t' | '\r' | '\n')) {
                self.read_char();
            }

            if self.current_char == Some('/') && self.peek_char() == Some('/') {
                while self.current_char.is_some() && self.current_char != Some('\n') {
                    self.read_char();
                }
                continue;
            }

            if self.current_char == Some('/') && self.peek_char() == Some('*') {
                let start = self.current_position();
                if !self.skip_block_comment() {
                    self.unterminated_block_comment_pos = Some(start);
                    break;
                }
                continue;
            }

            break;
        }
    }

    /// Returns false when EOF is reached before the closing `*/`.
    fn skip_block_comment(&mut self) -> bool {
        self.read_char(); // '/'
        self.read_char(); // '*'
        loop {
            match self.current_char {
                None => return false,
                Some('*') if self.peek_char() == Some('/') => {
                    self.read_char();
                    self.read_char();
                    return true;
                }
                Some(_) => self.read_char(),
            }
        }
    }
}
