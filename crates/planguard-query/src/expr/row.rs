//! Typed row expressions.

use std::fmt;

use planguard_core::PlanType;

use super::ast::Literal;
use crate::metadata::FunctionHandle;
use crate::plan::VariableReference;

/// A resolved expression carrying its own type.
#[derive(Debug, Clone, PartialEq)]
pub enum RowExpression {
    /// A reference to a plan variable.
    Variable(VariableReference),
    /// A typed constant.
    Constant {
        /// The value.
        value: Literal,
        /// The type of the value.
        data_type: PlanType,
    },
    /// A resolved function call.
    Call(CallExpression),
}

impl RowExpression {
    /// Creates a typed constant.
    #[must_use]
    pub fn constant(value: Literal, data_type: PlanType) -> Self {
        Self::Constant { value, data_type }
    }

    /// Returns the type of this expression.
    #[must_use]
    pub fn data_type(&self) -> &PlanType {
        match self {
            Self::Variable(variable) => variable.data_type(),
            Self::Constant { data_type, .. } => data_type,
            Self::Call(call) => call.return_type(),
        }
    }
}

impl From<VariableReference> for RowExpression {
    fn from(variable: VariableReference) -> Self {
        Self::Variable(variable)
    }
}

impl From<CallExpression> for RowExpression {
    fn from(call: CallExpression) -> Self {
        Self::Call(call)
    }
}

impl fmt::Display for RowExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(variable) => write!(f, "{variable}"),
            Self::Constant { value, .. } => write!(f, "{value}"),
            Self::Call(call) => write!(f, "{call}"),
        }
    }
}

/// A call to a resolved function.
///
/// The return type is recorded when the call is resolved and travels with
/// the expression independently of the function catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    display_name: String,
    function_handle: FunctionHandle,
    return_type: PlanType,
    arguments: Vec<RowExpression>,
}

impl CallExpression {
    /// Creates a call expression.
    #[must_use]
    pub fn new(
        display_name: impl Into<String>,
        function_handle: FunctionHandle,
        return_type: PlanType,
        arguments: Vec<RowExpression>,
    ) -> Self {
        Self { display_name: display_name.into(), function_handle, return_type, arguments }
    }

    /// Returns the name used when printing the call.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the handle of the called function.
    #[must_use]
    pub fn function_handle(&self) -> &FunctionHandle {
        &self.function_handle
    }

    /// Returns the type this call produces.
    #[must_use]
    pub fn return_type(&self) -> &PlanType {
        &self.return_type
    }

    /// Returns the arguments.
    #[must_use]
    pub fn arguments(&self) -> &[RowExpression] {
        &self.arguments
    }
}

impl fmt::Display for CallExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.display_name)?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}
