//! Function and type metadata.
//!
//! [`Metadata`] bundles the [`FunctionRegistry`] and the [`TypeManager`] and
//! is the default [`TypeOracle`] the sanity checkers consult.

mod builtins;
mod function;
mod oracle;
mod registry;

pub use function::{FunctionHandle, FunctionKind, FunctionMetadata};
pub use oracle::TypeOracle;
pub use registry::{FunctionRegistry, ResolveError};

use planguard_core::TypeManager;

/// Catalog of functions and types.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    functions: FunctionRegistry,
    types: TypeManager,
}

impl Metadata {
    /// Creates metadata from a function registry and a type manager.
    #[must_use]
    pub fn new(functions: FunctionRegistry, types: TypeManager) -> Self {
        Self { functions, types }
    }

    /// Creates metadata with the built-in functions and default types.
    #[must_use]
    pub fn with_builtins() -> Self {
        Self::new(FunctionRegistry::with_builtins(), TypeManager::new())
    }

    /// Returns the function registry.
    #[must_use]
    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Returns the function registry for registration.
    pub fn functions_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }

    /// Returns the type manager.
    #[must_use]
    pub fn types(&self) -> &TypeManager {
        &self.types
    }
}
