//! Error types for the core crate.

use thiserror::Error;

use crate::types::TypeSignature;

/// Errors raised while parsing or resolving type signatures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// The textual signature could not be parsed.
    #[error("invalid type signature '{input}' at position {position}: {message}")]
    InvalidSignature {
        /// The text that was being parsed.
        input: String,
        /// Byte offset of the failure.
        position: usize,
        /// What the parser expected.
        message: String,
    },

    /// The signature names a base type that is not registered.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// The base type is known but its parameters are not valid for it.
    #[error("invalid parameters for type {signature}: {reason}")]
    InvalidParameters {
        /// The offending signature.
        signature: TypeSignature,
        /// Why the parameters were rejected.
        reason: String,
    },

    /// The alias leads back to itself without reaching a concrete type.
    #[error("alias '{0}' does not resolve to a type: alias cycle")]
    UnresolvedAlias(String),
}

impl TypeError {
    /// Creates an invalid parameters error.
    #[must_use]
    pub fn invalid_parameters(signature: &TypeSignature, reason: impl Into<String>) -> Self {
        Self::InvalidParameters { signature: signature.clone(), reason: reason.into() }
    }
}

/// Result type for type system operations.
pub type TypeResult<T> = Result<T, TypeError>;
