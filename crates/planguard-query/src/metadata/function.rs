//! Function handles and metadata.

use std::fmt;

use planguard_core::{PlanType, TypeSignature};

/// The kind of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// Row-at-a-time function.
    Scalar,
    /// Aggregate function, usable in aggregations and as a window function.
    Aggregate,
    /// Window-only function such as `row_number`.
    Window,
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Aggregate => write!(f, "aggregate"),
            Self::Window => write!(f, "window"),
        }
    }
}

/// Identifies one resolved overload of a function: its name and formal
/// argument types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionHandle {
    name: String,
    argument_types: Vec<TypeSignature>,
}

impl FunctionHandle {
    /// Creates a handle. The name is normalized to lowercase.
    #[must_use]
    pub fn new(name: impl Into<String>, argument_types: Vec<TypeSignature>) -> Self {
        Self { name: name.into().to_ascii_lowercase(), argument_types }
    }

    /// Returns the function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the formal argument types.
    #[must_use]
    pub fn argument_types(&self) -> &[TypeSignature] {
        &self.argument_types
    }
}

impl fmt::Display for FunctionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.argument_types.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

/// Catalog entry for one function overload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionMetadata {
    /// The overload's handle (name and formal argument types).
    pub handle: FunctionHandle,
    /// The kind of function.
    pub kind: FunctionKind,
    /// The registered return type.
    pub return_type: TypeSignature,
    /// Whether the function always returns the same result for the same input.
    pub deterministic: bool,
    /// Deprecation notice, if the function is deprecated.
    pub deprecation: Option<String>,
}

impl FunctionMetadata {
    /// Creates metadata from resolved argument and return types.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: FunctionKind,
        argument_types: &[PlanType],
        return_type: &PlanType,
    ) -> Self {
        Self {
            handle: FunctionHandle::new(
                name,
                argument_types.iter().map(PlanType::signature).collect(),
            ),
            kind,
            return_type: return_type.signature(),
            deterministic: true,
            deprecation: None,
        }
    }

    /// Creates scalar function metadata.
    #[must_use]
    pub fn scalar(
        name: impl Into<String>,
        argument_types: &[PlanType],
        return_type: &PlanType,
    ) -> Self {
        Self::new(name, FunctionKind::Scalar, argument_types, return_type)
    }

    /// Creates aggregate function metadata.
    #[must_use]
    pub fn aggregate(
        name: impl Into<String>,
        argument_types: &[PlanType],
        return_type: &PlanType,
    ) -> Self {
        Self::new(name, FunctionKind::Aggregate, argument_types, return_type)
    }

    /// Creates window function metadata.
    #[must_use]
    pub fn window(
        name: impl Into<String>,
        argument_types: &[PlanType],
        return_type: &PlanType,
    ) -> Self {
        Self::new(name, FunctionKind::Window, argument_types, return_type)
    }

    /// Marks the function as non-deterministic.
    #[must_use]
    pub fn nondeterministic(mut self) -> Self {
        self.deterministic = false;
        self
    }

    /// Marks the function as deprecated.
    #[must_use]
    pub fn deprecated(mut self, notice: impl Into<String>) -> Self {
        self.deprecation = Some(notice.into());
        self
    }

    /// Returns the function name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.handle.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_display() {
        let handle = FunctionHandle::new(
            "SUM",
            vec![TypeSignature::simple("bigint")],
        );
        assert_eq!(handle.name(), "sum");
        assert_eq!(handle.to_string(), "sum(bigint)");
    }

    #[test]
    fn metadata_builders() {
        let metadata = FunctionMetadata::scalar("rand", &[], &PlanType::Double)
            .nondeterministic()
            .deprecated("use random()");

        assert_eq!(metadata.name(), "rand");
        assert_eq!(metadata.kind, FunctionKind::Scalar);
        assert_eq!(metadata.return_type, TypeSignature::simple("double"));
        assert!(!metadata.deterministic);
        assert_eq!(metadata.deprecation.as_deref(), Some("use random()"));
    }
}
