//! Sanity check errors.

use planguard_core::{TypeError, TypeSignature};
use thiserror::Error;

use crate::analyzer::SemanticError;
use crate::metadata::FunctionHandle;
use crate::plan::PlanNodeId;

/// Errors raised by the plan sanity checkers.
///
/// `TypeMismatch` is the violation the type validator exists to catch. The
/// `Missing*`, `UnknownFunction`, and `UnresolvedType` variants report a
/// plan that breaks the validator's preconditions; they indicate a defect
/// upstream of the validator rather than a type disagreement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanityError {
    /// A variable's declared type disagrees with the type actually produced.
    #[error(
        "type of variable '{variable}' is expected to be {expected}, but the actual type is {actual}"
    )]
    TypeMismatch {
        /// The offending variable.
        variable: String,
        /// The declared type.
        expected: TypeSignature,
        /// The type actually produced.
        actual: TypeSignature,
    },

    /// A referenced variable is not bound in the type environment.
    #[error("no type found for variable '{variable}'")]
    MissingVariableType {
        /// The unbound variable.
        variable: String,
    },

    /// A function handle is not in the catalog.
    #[error("unknown function: {handle}")]
    UnknownFunction {
        /// The unknown handle.
        handle: FunctionHandle,
    },

    /// An actual type signature could not be resolved.
    #[error("cannot resolve type {signature}: {source}")]
    UnresolvedType {
        /// The signature that failed to resolve.
        signature: TypeSignature,
        /// The resolution failure.
        #[source]
        source: TypeError,
    },

    /// The inferencer returned no type for the expression it was asked about.
    #[error("no type inferred for expression {expression}")]
    MissingExpressionType {
        /// The expression text.
        expression: String,
    },

    /// Expression analysis failed.
    #[error("expression analysis failed: {0}")]
    Analysis(#[from] SemanticError),

    /// Two plan nodes share an id.
    #[error("duplicate plan node id: {id}")]
    DuplicatePlanNodeId {
        /// The repeated id.
        id: PlanNodeId,
    },

    /// A final plan's output node is missing or misplaced.
    #[error("invalid output node: {0}")]
    InvalidOutputNode(String),
}

/// Result type for sanity checks.
pub type SanityResult<T> = Result<T, SanityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_message() {
        let err = SanityError::TypeMismatch {
            variable: "v2".to_string(),
            expected: TypeSignature::simple("double"),
            actual: TypeSignature::simple("bigint"),
        };
        assert_eq!(
            err.to_string(),
            "type of variable 'v2' is expected to be double, but the actual type is bigint"
        );
    }

    #[test]
    fn analysis_errors_convert() {
        let err: SanityError = SemanticError::UnknownSymbol("x".to_string()).into();
        assert_eq!(err.to_string(), "expression analysis failed: unknown symbol: x");
    }
}
