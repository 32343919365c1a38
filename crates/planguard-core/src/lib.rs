//! `planguard` Core
//!
//! This crate provides the type system shared by the planguard query plan
//! checkers.
//!
//! # Overview
//!
//! - [`PlanType`]: the data types a plan variable or expression can carry
//! - [`TypeSignature`]: the structural, comparable descriptor of a type
//! - [`TypeManager`]: resolves signatures to types, answers type-only
//!   coercion questions, and computes common super types
//!
//! # Example
//!
//! ```
//! use planguard_core::{PlanType, TypeManager, TypeSignature};
//!
//! let manager = TypeManager::new();
//!
//! let signature = TypeSignature::parse("varchar(10)").unwrap();
//! let varchar10 = manager.resolve(&signature).unwrap();
//! assert_eq!(varchar10, PlanType::varchar(10));
//!
//! // Widening a varchar keeps the representation, so no cast is needed.
//! assert!(manager.is_type_only_coercion(&varchar10, &PlanType::unbounded_varchar()));
//! // Integer to bigint changes the representation.
//! assert!(!manager.is_type_only_coercion(&PlanType::Integer, &PlanType::BigInt));
//! ```

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod types;

pub use error::{TypeError, TypeResult};
pub use types::{
    standard, PlanType, RowField, TypeManager, TypeSignature, TypeSignatureParameter,
    MAX_DECIMAL_PRECISION, MAX_SHORT_DECIMAL_PRECISION,
};
