use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Special
    Illegal,
    Eof,
    UnterminatedString,
    UnterminatedComment,

    // Identifiers and literals
    Ident,
    Int,
    Float,
    String,

    // Arithmetic Operators
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,

    // Comparison Operators
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    NotEq,

    // Logical operators
    Bang,
    And,
    Or,

    // Assignment
    Assign,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Dot,

    // Keywords
    Fn,
    Let,
    Const,
    If,
    Else,
    While,
    For,
    In,
    Break,
    Continue,
    Return,
    True,
    False,
    Null,
    This,
}

impl TokenType {
    pub const COUNT: usize = TokenType::This as usize + 1;

    #[inline]
    pub const fn as_usize(self) -> usize {
        self as usize
    }
}

pub fn lookup_ident(ident: &str) -> TokenType {
    match ident {
        "fn" => TokenType::Fn,
        "let" => TokenType::Let,
        "const" => TokenType::Const,
        "if" => TokenType::If,
        "else" => TokenType::Else,
        "while" => TokenType::While,
        "for" => TokenType::For,
        "in" => TokenType::In,
        "break" => TokenType::Break,
        "continue" => TokenType::Continue,
        "return" => TokenType::Return,
        "true" => TokenType::True,
        "false" => TokenType::False,
        "null" => TokenType::Null,
        "this" => TokenType::This,
        _ => TokenType::Ident,
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            // Special
            TokenType::Illegal => "ILLEGAL",
            TokenType::Eof => "EOF",
            TokenType::UnterminatedString => "UNTERMINATED_STRING",
            TokenType::UnterminatedComment => "UNTERMINATED_COMMENT",

            // Identifiers and literals
            TokenType::Ident => "IDENT",
            TokenType::Int => "INT",
            TokenType::Float => "FLOAT",
            TokenType::String => "STRING",

            // Arithmetic Operators
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Asterisk => "*",
            TokenType::Slash => "/",
            TokenType::Percent => "%",
            TokenType::PlusPlus => "++",
            TokenType::MinusMinus => "--",

            // Comparison Operators
            TokenType::Lt => "<",
            TokenType::Lte => "<=",
            TokenType::Gt => ">",
            TokenType::Gte => ">=",
            TokenType::Eq => "==",
            TokenType::NotEq => "!=",

            // Logical operators
            TokenType::Bang => "!",
            TokenType::And => "&&",
            TokenType::Or => "||",

            TokenType::Assign => "=",

            // Delimiters
            TokenType::LParen => "(",
            TokenType::RParen => ")",
            TokenType::LBrace => "{",
            TokenType::RBrace => "}",
            TokenType::LBracket => "[",
            TokenType::RBracket => "]",
            TokenType::Comma => ",",
            TokenType::Semicolon => ";",
            TokenType::Colon => ":",
            TokenType::Dot => ".",

            // Keywords
            TokenType::Fn => "FN",
            TokenType::Let => "LET",
            TokenType::Const => "CONST",
            TokenType::If => "IF",
            TokenType::Else => "ELSE",
            TokenType::While => "WHILE",
            TokenType::For => "FOR",
            TokenType::In => "IN",
            TokenType::Break => "BREAK",
            TokenType::Continue => "CONTINUE",
            TokenType::Return => "RETURN",
            TokenType::True => "TRUE",
            TokenType::False => "FALSE",
            TokenType::Null => "NULL",
            TokenType::This => "THIS",
        };
        write!(f, "{}", s)
    }
}
