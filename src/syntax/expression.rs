use std::fmt;

use crate::analysis::variable::{Resolution, VarHandle};
use crate::diagnostics::Span;

use super::block::Block;

/// An identifier use or definition. `binding` is empty until the resolver runs.
#[derive(Debug, Clone)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
    pub binding: Option<Resolution>,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
            binding: None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixOp::Neg => write!(f, "-"),
            PrefixOp::Not => write!(f, "!"),
        }
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Mod => "%",
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
            InfixOp::Lt => "<",
            InfixOp::Lte => "<=",
            InfixOp::Gt => ">",
            InfixOp::Gte => ">=",
            InfixOp::And => "&&",
            InfixOp::Or => "||",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for PostfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostfixOp::Increment => write!(f, "++"),
            PostfixOp::Decrement => write!(f, "--"),
        }
    }
}

/// The place written by an assignment or a postfix update.
#[derive(Debug, Clone)]
pub enum Target {
    Identifier(Identifier),
    Field {
        object: Box<Expression>,
        name: String,
    },
    Index {
        object: Box<Expression>,
        index: Box<Expression>,
    },
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Identifier(ident) => write!(f, "{}", ident),
            Target::Field { object, name } => write!(f, "{}.{}", object, name),
            Target::Index { object, index } => write!(f, "{}[{}]", object, index),
        }
    }
}

/// Resolver output for a function literal.
#[derive(Debug, Clone, Default)]
pub struct FnInfo {
    pub num_locals: usize,
    pub num_captures: usize,
    /// What the enclosing function hands over at creation time, in capture-slot order.
    pub parent_captures: Vec<VarHandle>,
}

#[derive(Debug, Clone)]
pub struct FnExpr {
    /// Binding name when the literal initializes a declaration; used in traces.
    pub name: Option<String>,
    pub parameters: Vec<Identifier>,
    pub body: Block,
    pub span: Span,
    pub info: FnInfo,
}

impl FnExpr {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}

impl fmt::Display for FnExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.parameters.iter().map(|p| p.name.clone()).collect();
        write!(f, "fn({}) {}", params.join(", "), self.body)
    }
}

#[derive(Debug, Clone)]
pub struct StructField {
    pub key: String,
    pub key_span: Span,
    pub value: Expression,
}

#[derive(Debug, Clone)]
pub struct StructLit {
    pub fields: Vec<StructField>,
    /// Local slot holding the object while its fields evaluate, if `this` is used.
    pub this_slot: Option<usize>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Expression {
    Identifier(Identifier),
    Integer {
        value: i64,
        span: Span,
    },
    Float {
        value: f64,
        span: Span,
    },
    String {
        value: String,
        span: Span,
    },
    Boolean {
        value: bool,
        span: Span,
    },
    Null {
        span: Span,
    },
    /// `this` inside a struct literal; the identifier is named `this`.
    This(Identifier),
    Prefix {
        operator: PrefixOp,
        right: Box<Expression>,
        span: Span,
    },
    Infix {
        left: Box<Expression>,
        operator: InfixOp,
        right: Box<Expression>,
        span: Span,
    },
    Assign {
        target: Target,
        value: Box<Expression>,
        span: Span,
    },
    Postfix {
        target: Target,
        operator: PostfixOp,
        span: Span,
    },
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
        span: Span,
    },
    List {
        elements: Vec<Expression>,
        span: Span,
    },
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
        span: Span,
    },
    Field {
        object: Box<Expression>,
        name: String,
        span: Span,
    },
    Function(Box<FnExpr>),
    Struct(StructLit),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Identifier(ident) | Expression::This(ident) => ident.span,
            Expression::Integer { span, .. }
            | Expression::Float { span, .. }
            | Expression::String { span, .. }
            | Expression::Boolean { span, .. }
            | Expression::Null { span }
            | Expression::Prefix { span, .. }
            | Expression::Infix { span, .. }
            | Expression::Assign { span, .. }
            | Expression::Postfix { span, .. }
            | Expression::Call { span, .. }
            | Expression::List { span, .. }
            | Expression::Index { span, .. }
            | Expression::Field { span, .. } => *span,
            Expression::Function(function) => function.span,
            Expression::Struct(lit) => lit.span,
        }
    }

    /// Reinterprets an already-parsed expression as an assignment target.
    pub fn into_target(self) -> Result<Target, Expression> {
        match self {
            Expression::Identifier(ident) => Ok(Target::Identifier(ident)),
            Expression::Field { object, name, .. } => Ok(Target::Field { object, name }),
            Expression::Index { left, index, .. } => Ok(Target::Index {
                object: left,
                index,
            }),
            other => Err(other),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{}", ident),
            Expression::Integer { value, .. } => write!(f, "{}", value),
            Expression::Float { value, .. } => write!(f, "{:?}", value),
            Expression::String { value, .. } => write!(f, "{:?}", value),
            Expression::Boolean { value, .. } => write!(f, "{}", value),
            Expression::Null { .. } => write!(f, "null"),
            Expression::This(_) => write!(f, "this"),
            Expression::Prefix {
                operator, right, ..
            } => write!(f, "({}{})", operator, right),
            Expression::Infix {
                left,
                operator,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::Assign { target, value, .. } => write!(f, "({} = {})", target, value),
            Expression::Postfix {
                target, operator, ..
            } => write!(f, "({}{})", target, operator),
            Expression::Call {
                function,
                arguments,
                ..
            } => {
                let args: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", function, args.join(", "))
            }
            Expression::List { elements, .. } => {
                let items: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Expression::Index { left, index, .. } => write!(f, "({}[{}])", left, index),
            Expression::Field { object, name, .. } => write!(f, "{}.{}", object, name),
            Expression::Function(function) => write!(f, "{}", function),
            Expression::Struct(lit) => {
                let fields: Vec<String> = lit
                    .fields
                    .iter()
                    .map(|field| format!("{}: {}", field.key, field.value))
                    .collect();
                write!(f, "{{{}}}", fields.join(", "))
            }
        }
    }
}
