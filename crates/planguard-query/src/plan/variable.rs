//! Typed plan variables and the type environment.

use std::collections::HashMap;
use std::fmt;

use planguard_core::PlanType;

use super::node::PlanNode;

/// A uniquely named, typed handle for one output column of a plan node.
///
/// The declared type is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableReference {
    name: String,
    data_type: PlanType,
}

impl VariableReference {
    /// Creates a variable.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: PlanType) -> Self {
        Self { name: name.into(), data_type }
    }

    /// Returns the variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    #[must_use]
    pub fn data_type(&self) -> &PlanType {
        &self.data_type
    }
}

impl fmt::Display for VariableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Maps variable names to their types.
///
/// This is the ambient environment expressions are analyzed against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeEnvironment {
    types: HashMap<String, PlanType>,
}

impl TypeEnvironment {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an environment holding every variable a plan declares.
    #[must_use]
    pub fn from_plan(plan: &PlanNode) -> Self {
        let mut env = Self::new();
        env.collect(plan);
        env
    }

    fn collect(&mut self, plan: &PlanNode) {
        for variable in plan.output_variables() {
            self.insert_variable(variable);
        }
        for source in plan.sources() {
            self.collect(source);
        }
    }

    /// Adds or replaces a binding.
    pub fn insert(&mut self, name: impl Into<String>, data_type: PlanType) {
        self.types.insert(name.into(), data_type);
    }

    /// Adds or replaces the binding of a variable.
    pub fn insert_variable(&mut self, variable: &VariableReference) {
        self.insert(variable.name(), variable.data_type().clone());
    }

    /// Returns the type bound to a name.
    #[must_use]
    pub fn type_of(&self, name: &str) -> Option<&PlanType> {
        self.types.get(name)
    }

    /// Returns true if the name is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl<'a> FromIterator<&'a VariableReference> for TypeEnvironment {
    fn from_iter<I: IntoIterator<Item = &'a VariableReference>>(iter: I) -> Self {
        let mut env = Self::new();
        for variable in iter {
            env.insert_variable(variable);
        }
        env
    }
}

impl FromIterator<(String, PlanType)> for TypeEnvironment {
    fn from_iter<I: IntoIterator<Item = (String, PlanType)>>(iter: I) -> Self {
        Self { types: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_accessors() {
        let v = VariableReference::new("total", PlanType::BigInt);
        assert_eq!(v.name(), "total");
        assert_eq!(v.data_type(), &PlanType::BigInt);
        assert_eq!(v.to_string(), "total");
    }

    #[test]
    fn environment_lookup() {
        let a = VariableReference::new("a", PlanType::Integer);
        let b = VariableReference::new("b", PlanType::Date);
        let env: TypeEnvironment = [&a, &b].into_iter().collect();

        assert_eq!(env.len(), 2);
        assert_eq!(env.type_of("a"), Some(&PlanType::Integer));
        assert!(env.contains("b"));
        assert_eq!(env.type_of("c"), None);
    }

    #[test]
    fn environment_from_pairs() {
        let env: TypeEnvironment =
            vec![("x".to_string(), PlanType::Boolean)].into_iter().collect();
        assert_eq!(env.type_of("x"), Some(&PlanType::Boolean));
    }
}
