use std::fmt;

use crate::diagnostics::Span;

use super::block::Block;
use super::expression::{Expression, Identifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Let,
    Const,
}

#[derive(Debug, Clone)]
pub struct Decl {
    pub name: Identifier,
    pub value: Option<Expression>,
}

/// Hidden locals a `for` loop uses to walk its iterable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForSlots {
    pub iterable: usize,
    pub cursor: usize,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Let {
        kind: DeclKind,
        decls: Vec<Decl>,
        span: Span,
    },
    If {
        condition: Expression,
        consequence: Block,
        alternative: Option<Block>,
        span: Span,
    },
    While {
        condition: Expression,
        body: Block,
        span: Span,
    },
    For {
        variable: Identifier,
        iterable: Expression,
        body: Block,
        slots: Option<ForSlots>,
        span: Span,
    },
    Break {
        span: Span,
    },
    Continue {
        span: Span,
    },
    Return {
        value: Option<Expression>,
        span: Span,
    },
    Block(Block),
    Expression {
        expression: Expression,
        span: Span,
    },
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Let { span, .. }
            | Statement::If { span, .. }
            | Statement::While { span, .. }
            | Statement::For { span, .. }
            | Statement::Break { span }
            | Statement::Continue { span }
            | Statement::Return { span, .. }
            | Statement::Expression { span, .. } => *span,
            Statement::Block(block) => block.span,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { kind, decls, .. } => {
                let keyword = match kind {
                    DeclKind::Let => "let",
                    DeclKind::Const => "const",
                };
                let parts: Vec<String> = decls
                    .iter()
                    .map(|decl| match &decl.value {
                        Some(value) => format!("{} = {}", decl.name, value),
                        None => decl.name.to_string(),
                    })
                    .collect();
                write!(f, "{} {};", keyword, parts.join(", "))
            }
            Statement::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if {} {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
            Statement::While {
                condition, body, ..
            } => write!(f, "while {} {}", condition, body),
            Statement::For {
                variable,
                iterable,
                body,
                ..
            } => write!(f, "for {} in {} {}", variable, iterable, body),
            Statement::Break { .. } => write!(f, "break;"),
            Statement::Continue { .. } => write!(f, "continue;"),
            Statement::Return { value: Some(v), .. } => write!(f, "return {};", v),
            Statement::Return { value: None, .. } => write!(f, "return;"),
            Statement::Block(block) => write!(f, "{}", block),
            Statement::Expression { expression, .. } => write!(f, "{};", expression),
        }
    }
}
