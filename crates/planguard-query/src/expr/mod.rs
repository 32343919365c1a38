//! Expressions.
//!
//! Two expression forms appear in a plan:
//!
//! - [`Expr`]: untyped SQL expressions, as held by projections and filters.
//!   Their types come from the expression analyzer.
//! - [`RowExpression`]: resolved expressions that carry their type, as held by
//!   window functions and aggregations.

mod ast;
mod node_ref;
mod row;

pub use ast::{ArithmeticOp, ComparisonOp, Expr, Literal, LogicalOp};
pub use node_ref::NodeRef;
pub use row::{CallExpression, RowExpression};
