//! Expression type inference.
//!
//! The [`ExpressionTypeInferencer`] trait is the seam the sanity checkers
//! use to learn what an expression really produces. [`ExpressionAnalyzer`]
//! is the default implementation, backed by [`Metadata`](crate::metadata::Metadata).

mod error;
mod expression;

pub use error::{AnalysisResult, SemanticError};
pub use expression::{ExpressionAnalyzer, ExpressionTypeInferencer, ExpressionTypes};
