//! Function registry.

use std::collections::HashMap;

use planguard_core::{PlanType, TypeManager};
use thiserror::Error;

use super::function::{FunctionHandle, FunctionMetadata};

/// Errors from resolving a function call against the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No overload accepts the argument types.
    #[error("function not found: {name}({})", format_types(.arguments))]
    NotFound {
        /// The function name.
        name: String,
        /// The actual argument types.
        arguments: Vec<PlanType>,
    },

    /// Several overloads accept the argument types and none is most specific.
    #[error(
        "ambiguous call to {name}({}): candidates are {}",
        format_types(.arguments),
        .candidates.join(", ")
    )]
    Ambiguous {
        /// The function name.
        name: String,
        /// The actual argument types.
        arguments: Vec<PlanType>,
        /// The matching overloads.
        candidates: Vec<String>,
    },
}

fn format_types(types: &[PlanType]) -> String {
    types.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// A registry of function overloads.
///
/// Overloads are stored by handle and indexed by name. Registering an
/// overload whose handle already exists replaces it.
///
/// # Example
///
/// ```
/// use planguard_core::{PlanType, TypeManager};
/// use planguard_query::metadata::{FunctionMetadata, FunctionRegistry};
///
/// let mut registry = FunctionRegistry::new();
/// registry.register(FunctionMetadata::aggregate("sum", &[PlanType::BigInt], &PlanType::BigInt));
///
/// let sum = registry.resolve("sum", &[PlanType::Integer], &TypeManager::new()).unwrap();
/// assert_eq!(sum.handle.to_string(), "sum(bigint)");
/// ```
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    /// Overloads by handle.
    functions: HashMap<FunctionHandle, FunctionMetadata>,
    /// Handles by function name, in registration order.
    by_name: HashMap<String, Vec<FunctionHandle>>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in functions.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::builtins::register_builtins(&mut registry);
        registry
    }

    /// Registers an overload, returning its handle.
    pub fn register(&mut self, metadata: FunctionMetadata) -> FunctionHandle {
        let handle = metadata.handle.clone();
        if self.functions.insert(handle.clone(), metadata).is_none() {
            self.by_name.entry(handle.name().to_string()).or_default().push(handle.clone());
        }
        handle
    }

    /// Gets an overload by handle.
    #[must_use]
    pub fn get(&self, handle: &FunctionHandle) -> Option<&FunctionMetadata> {
        self.functions.get(handle)
    }

    /// Returns true if the handle is registered.
    #[must_use]
    pub fn contains(&self, handle: &FunctionHandle) -> bool {
        self.functions.contains_key(handle)
    }

    /// Returns all overloads of a function, in registration order.
    #[must_use]
    pub fn overloads(&self, name: &str) -> Vec<&FunctionMetadata> {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .map(|handles| handles.iter().filter_map(|h| self.functions.get(h)).collect())
            .unwrap_or_default()
    }

    /// Returns the number of registered overloads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Lists the registered function names.
    #[must_use]
    pub fn list_names(&self) -> Vec<&str> {
        self.by_name.keys().map(String::as_str).collect()
    }

    /// Resolves a call by name and actual argument types.
    ///
    /// An overload whose formal types equal the actual types wins outright.
    /// Otherwise the overloads every argument can be implicitly coerced to
    /// are candidates, and the most specific one (the one whose formals
    /// coerce to every other candidate's formals) is chosen.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] if no overload applies and
    /// [`ResolveError::Ambiguous`] if no single candidate is most specific.
    pub fn resolve(
        &self,
        name: &str,
        arguments: &[PlanType],
        types: &TypeManager,
    ) -> Result<&FunctionMetadata, ResolveError> {
        let candidates: Vec<(&FunctionMetadata, Vec<PlanType>)> = self
            .overloads(name)
            .into_iter()
            .filter_map(|metadata| {
                let formals = metadata
                    .handle
                    .argument_types()
                    .iter()
                    .map(|sig| types.resolve(sig).ok())
                    .collect::<Option<Vec<_>>>()?;
                let applicable = formals.len() == arguments.len()
                    && arguments
                        .iter()
                        .zip(&formals)
                        .all(|(actual, formal)| types.can_coerce(actual, formal));
                applicable.then_some((metadata, formals))
            })
            .collect();

        if let Some((exact, _)) = candidates.iter().find(|(_, formals)| formals == arguments) {
            return Ok(*exact);
        }

        let most_specific: Vec<_> = candidates
            .iter()
            .filter(|(_, formals)| {
                candidates.iter().all(|(_, other)| {
                    formals.iter().zip(other).all(|(mine, theirs)| types.can_coerce(mine, theirs))
                })
            })
            .collect();

        match most_specific.as_slice() {
            [(metadata, _)] => Ok(*metadata),
            [] if candidates.is_empty() => Err(ResolveError::NotFound {
                name: name.to_ascii_lowercase(),
                arguments: arguments.to_vec(),
            }),
            _ => Err(ResolveError::Ambiguous {
                name: name.to_ascii_lowercase(),
                arguments: arguments.to_vec(),
                candidates: candidates.iter().map(|(m, _)| m.handle.to_string()).collect(),
            }),
        }
    }
}
