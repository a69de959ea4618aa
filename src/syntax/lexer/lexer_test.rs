use crate::diagnostics::Position;
use crate::syntax::token_type::TokenType;

use super::Lexer;

fn token_types(input: &str) -> Vec<TokenType> {
    Lexer::new(input)
        .tokenize()
        .into_iter()
        .map(|token| token.token_type)
        .collect()
}

#[test]
fn test_next_token_operators_and_keywords() {
    let input = "let a = 1; const b = a <= 2 && !c || d != e; a++; b--;";
    let expected = vec![
        TokenType::Let,
        TokenType::Ident,
        TokenType::Assign,
        TokenType::Int,
        TokenType::Semicolon,
        TokenType::Const,
        TokenType::Ident,
        TokenType::Assign,
        TokenType::Ident,
        TokenType::Lte,
        TokenType::Int,
        TokenType::And,
        TokenType::Bang,
        TokenType::Ident,
        TokenType::Or,
        TokenType::Ident,
        TokenType::NotEq,
        TokenType::Ident,
        TokenType::Semicolon,
        TokenType::Ident,
        TokenType::PlusPlus,
        TokenType::Semicolon,
        TokenType::Ident,
        TokenType::MinusMinus,
        TokenType::Semicolon,
        TokenType::Eof,
    ];
    assert_eq!(token_types(input), expected);
}

#[test]
fn test_struct_and_loop_tokens() {
    let input = "for x in xs { o = { v: x, me: this }; o.v; xs[0]; }";
    let types = token_types(input);
    assert_eq!(types[0], TokenType::For);
    assert_eq!(types[2], TokenType::In);
    assert!(types.contains(&TokenType::Colon));
    assert!(types.contains(&TokenType::This));
    assert!(types.contains(&TokenType::Dot));
    assert!(types.contains(&TokenType::LBracket));
}

#[test]
fn test_positions_track_lines_and_columns() {
    let tokens = Lexer::new("let x = 1;\n  x = 2;").tokenize();
    assert_eq!(tokens[0].position, Position::new(1, 0));
    assert_eq!(tokens[1].position, Position::new(1, 4));
    assert_eq!(tokens[5].literal, "x");
    assert_eq!(tokens[5].position, Position::new(2, 2));
    assert_eq!(tokens[5].end_position, Position::new(2, 3));
}

#[test]
fn test_numbers() {
    let tokens = Lexer::new("42 3.25 1_000 2e3 7.").tokenize();
    assert_eq!(tokens[0].token_type, TokenType::Int);
    assert_eq!(tokens[0].literal, "42");
    assert_eq!(tokens[1].token_type, TokenType::Float);
    assert_eq!(tokens[1].literal, "3.25");
    assert_eq!(tokens[2].literal, "1000");
    assert_eq!(tokens[3].token_type, TokenType::Float);
    assert_eq!(tokens[4].token_type, TokenType::Int);
    assert_eq!(tokens[5].token_type, TokenType::Dot);
}

#[test]
fn test_string_escapes() {
    let tokens = Lexer::new(r#""a\tb\n\"q\"\\""#).tokenize();
    assert_eq!(tokens[0].token_type, TokenType::String);
    assert_eq!(tokens[0].literal, "a\tb\n\"q\"\\");
    assert_eq!(tokens[1].token_type, TokenType::Eof);
}

#[test]
fn test_unterminated_string() {
    let tokens = Lexer::new("let s = \"abc\nlet t = 1;").tokenize();
    assert_eq!(tokens[3].token_type, TokenType::UnterminatedString);
    // Scanning resumes on the next line.
    assert_eq!(tokens[4].token_type, TokenType::Let);
}

#[test]
fn test_comments_are_skipped() {
    let input = "// line\nlet /* inline */ a = 1; /* multi\nline */ a;";
    let types = token_types(input);
    assert_eq!(
        types,
        vec![
            TokenType::Let,
            TokenType::Ident,
            TokenType::Assign,
            TokenType::Int,
            TokenType::Semicolon,
            TokenType::Ident,
            TokenType::Semicolon,
            TokenType::Eof,
        ]
    );
}

#[test]
fn test_unterminated_block_comment() {
    let tokens = Lexer::new("a; /* never closed").tokenize();
    assert_eq!(tokens[2].token_type, TokenType::UnterminatedComment);
    assert_eq!(tokens[2].position, Position::new(1, 3));
    assert_eq!(tokens[3].token_type, TokenType::Eof);
}

#[test]
fn test_illegal_character() {
    let tokens = Lexer::new("a # b").tokenize();
    assert_eq!(tokens[1].token_type, TokenType::Illegal);
    assert_eq!(tokens[1].literal, "#");
}
