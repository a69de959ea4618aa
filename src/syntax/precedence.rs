use std::sync::LazyLock;

use super::token_type::TokenType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Assign,      // = (right associative)
    LogicalOr,   // ||
    LogicalAnd,  // &&
    Equals,      // ==, !=
    LessGreater, // <, >, <=, >=
    Sum,         // +, -
    Product,     // *, /, %
    Prefix,      // -x, !x
    Call,        // f(x)
    Index,       // xs[i], o.f
    Postfix,     // x++, x--
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    pub token: TokenType,
    pub precedence: Precedence,
    pub associativity: Assoc,
}

const fn left(token: TokenType, precedence: Precedence) -> OpInfo {
    OpInfo {
        token,
        precedence,
        associativity: Assoc::Left,
    }
}

// Infix and postfix operators, lowest first.
pub const OPERATOR_TABLE: &[OpInfo] = &[
    OpInfo {
        token: TokenType::Assign,
        precedence: Precedence::Assign,
        associativity: Assoc::Right,
    },
    left(TokenType::Or, Precedence::LogicalOr),
    left(TokenType::And, Precedence::LogicalAnd),
    left(TokenType::Eq, Precedence::Equals),
    left(TokenType::NotEq, Precedence::Equals),
    left(TokenType::Lt, Precedence::LessGreater),
    left(TokenType::Gt, Precedence::LessGreater),
    left(TokenType::Lte, Precedence::LessGreater),
    left(TokenType::Gte, Precedence::LessGreater),
    left(TokenType::Plus, Precedence::Sum),
    left(TokenType::Minus, Precedence::Sum),
    left(TokenType::Asterisk, Precedence::Product),
    left(TokenType::Slash, Precedence::Product),
    left(TokenType::Percent, Precedence::Product),
    left(TokenType::LParen, Precedence::Call),
    left(TokenType::LBracket, Precedence::Index),
    left(TokenType::Dot, Precedence::Index),
    left(TokenType::PlusPlus, Precedence::Postfix),
    left(TokenType::MinusMinus, Precedence::Postfix),
];

pub static INFIX_TABLE: LazyLock<[Option<OpInfo>; TokenType::COUNT]> = LazyLock::new(|| {
    let mut table = [None; TokenType::COUNT];
    for info in OPERATOR_TABLE {
        let index = info.token.as_usize();
        debug_assert!(
            table[index].is_none(),
            "duplicate operator table entry for token {:?}",
            info.token
        );
        table[index] = Some(*info);
    }
    table
});

pub fn infix_op(token_type: TokenType) -> Option<OpInfo> {
    INFIX_TABLE[token_type.as_usize()]
}

pub fn token_precedence(token_type: TokenType) -> Precedence {
    infix_op(token_type)
        .map(|op| op.precedence)
        .unwrap_or(Precedence::Lowest)
}

fn precedence_below(precedence: Precedence) -> Precedence {
    match precedence {
        Precedence::Lowest | Precedence::Assign => Precedence::Lowest,
        Precedence::LogicalOr => Precedence::Assign,
        Precedence::LogicalAnd => Precedence::LogicalOr,
        Precedence::Equals => Precedence::LogicalAnd,
        Precedence::LessGreater => Precedence::Equals,
        Precedence::Sum => Precedence::LessGreater,
        Precedence::Product => Precedence::Sum,
        Precedence::Prefix => Precedence::Product,
        Precedence::Call => Precedence::Prefix,
        Precedence::Index => Precedence::Call,
        Precedence::Postfix => Precedence::Index,
    }
}

/// Precedence used to parse the right operand of an infix operator.
pub fn rhs_precedence_for_infix(token_type: TokenType) -> Precedence {
    match infix_op(token_type) {
        Some(op) => match op.associativity {
            Assoc::Left => op.precedence,
            Assoc::Right => precedence_below(op.precedence),
        },
        None => Precedence::Lowest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(
            rhs_precedence_for_infix(TokenType::Assign),
            Precedence::Lowest
        );
        assert_eq!(rhs_precedence_for_infix(TokenType::Plus), Precedence::Sum);
    }

    #[test]
    fn postfix_binds_tighter_than_prefix() {
        assert!(token_precedence(TokenType::PlusPlus) > Precedence::Prefix);
        assert_eq!(token_precedence(TokenType::Semicolon), Precedence::Lowest);
    }
}
