//! Statements, functions and whole programs

use super::expressions::Expression;
use ember_common::{NumberType, SourceLocation};
use serde::{Deserialize, Serialize};

/// A translation unit: globals first, then functions in emission order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub globals: Vec<GlobalDecl>,
    pub functions: Vec<Function>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalDecl {
    pub name: String,
    pub ty: NumberType,
    /// Zero when absent
    #[serde(default)]
    pub init: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

/// A function taking no parameters and returning `i32`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub body: Vec<Statement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(flatten)]
    pub kind: StatementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum StatementKind {
    /// Local variable declaration
    Declare {
        name: String,
        ty: NumberType,
        #[serde(default)]
        init: Option<Expression>,
    },

    Assign {
        name: String,
        value: Expression,
    },

    Print {
        value: Expression,
    },

    If {
        condition: Expression,
        then_body: Vec<Statement>,
        #[serde(default)]
        else_body: Option<Vec<Statement>>,
    },

    /// Loop while `condition` holds. `step` runs after each pass of the body
    /// (for-loops); `else_body` runs once the condition fails.
    While {
        condition: Expression,
        body: Vec<Statement>,
        #[serde(default)]
        step: Option<Vec<Statement>>,
        #[serde(default)]
        else_body: Option<Vec<Statement>>,
    },

    /// Nested scope
    Block {
        body: Vec<Statement>,
    },

    /// Return an `i32`; a bare return yields 0
    Return {
        #[serde(default)]
        value: Option<Expression>,
    },
}

impl Statement {
    pub fn new(kind: StatementKind) -> Self {
        Self { kind, location: None }
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Nested statement lists, in the order they are translated
    pub fn children(&self) -> Vec<&[Statement]> {
        match &self.kind {
            StatementKind::If { then_body, else_body, .. } => {
                let mut children = vec![then_body.as_slice()];
                children.extend(else_body.as_deref());
                children
            }
            StatementKind::While { body, step, else_body, .. } => {
                let mut children = vec![body.as_slice()];
                children.extend(step.as_deref());
                children.extend(else_body.as_deref());
                children
            }
            StatementKind::Block { body } => vec![body.as_slice()],
            _ => Vec::new(),
        }
    }
}
