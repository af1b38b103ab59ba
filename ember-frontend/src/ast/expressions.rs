//! Expression nodes

use ember_common::{NumberType, SourceLocation};
use ember_ir::{ArithmeticOp, CompareOp, LogicalOp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    #[serde(flatten)]
    pub kind: ExpressionKind,
    /// Type the expression evaluates to
    pub ty: NumberType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum ExpressionKind {
    Literal {
        value: i64,
    },

    Identifier {
        name: String,
    },

    /// Arithmetic; both operands are brought to the node type first
    Binary {
        op: ArithmeticOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },

    /// Comparison producing `bool`
    Compare {
        op: CompareOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },

    /// `and`/`or` over two `bool` operands
    Logical {
        op: LogicalOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },

    /// Explicit conversion to the node type
    Cast {
        value: Box<Expression>,
    },
}

impl Expression {
    pub fn new(kind: ExpressionKind, ty: NumberType) -> Self {
        Self {
            kind,
            ty,
            location: None,
        }
    }

    pub fn literal(value: i64, ty: NumberType) -> Self {
        Self::new(ExpressionKind::Literal { value }, ty)
    }

    pub fn identifier(name: &str, ty: NumberType) -> Self {
        Self::new(ExpressionKind::Identifier { name: name.to_string() }, ty)
    }

    pub fn binary(op: ArithmeticOp, lhs: Expression, rhs: Expression, ty: NumberType) -> Self {
        Self::new(
            ExpressionKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty,
        )
    }

    pub fn compare(op: CompareOp, lhs: Expression, rhs: Expression) -> Self {
        Self::new(
            ExpressionKind::Compare {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            NumberType::Bool,
        )
    }

    pub fn logical(op: LogicalOp, lhs: Expression, rhs: Expression) -> Self {
        Self::new(
            ExpressionKind::Logical {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            NumberType::Bool,
        )
    }

    pub fn cast(value: Expression, ty: NumberType) -> Self {
        Self::new(ExpressionKind::Cast { value: Box::new(value) }, ty)
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}
