//! Typed AST consumed by the translator
//!
//! Every expression carries the NumberType it evaluates to; the translator
//! never infers types. The tree is read from JSON:
//!
//! ```json
//! { "stmt": "assign", "name": "x",
//!   "value": { "expr": "literal", "value": 5, "ty": "i32" } }
//! ```

pub mod expressions;
pub mod statements;

pub use expressions::{Expression, ExpressionKind};
pub use statements::{Function, GlobalDecl, Program, Statement, StatementKind};
