//! Expression analysis errors.

use planguard_core::{PlanType, TypeError};
use thiserror::Error;

use crate::metadata::ResolveError;

/// Errors raised while inferring expression types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    /// A symbol is not bound in the type environment.
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    /// A function call could not be resolved.
    #[error(transparent)]
    Function(#[from] ResolveError),

    /// A type signature could not be resolved.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// An operand has the wrong type for its operator.
    #[error("type mismatch in {operation}: expected {expected}, found {actual}")]
    TypeMismatch {
        /// The operation where the mismatch occurred.
        operation: String,
        /// Description of what was expected.
        expected: String,
        /// The operand type found.
        actual: PlanType,
    },

    /// Two operands have no common type.
    #[error("incompatible types for {operation}: {left} and {right}")]
    IncompatibleTypes {
        /// The operation that failed.
        operation: String,
        /// Left operand type.
        left: PlanType,
        /// Right operand type.
        right: PlanType,
    },

    /// An explicit cast between unrelated types.
    #[error("cannot cast {from} to {to}")]
    CannotCast {
        /// Source type.
        from: PlanType,
        /// Target type.
        to: PlanType,
    },

    /// A literal that cannot be represented.
    #[error("invalid literal {literal}: {reason}")]
    InvalidLiteral {
        /// The literal text.
        literal: String,
        /// Why it is invalid.
        reason: String,
    },

    /// A structurally malformed expression.
    #[error("invalid expression: {0}")]
    InvalidExpression(String),
}

/// Result type for expression analysis.
pub type AnalysisResult<T> = Result<T, SemanticError>;
