//! Untyped SQL expressions.

// Allow arithmetic method names that match std traits - these build new
// expressions rather than computing values
#![allow(clippy::should_implement_trait)]
// Allow the long Display impl - it's a big match but simple
#![allow(clippy::too_many_lines)]

use std::fmt;

use planguard_core::TypeSignature;

/// An untyped expression, as produced by the SQL front end.
///
/// The type of an `Expr` is not stored; it is computed by an
/// [`ExpressionTypeInferencer`](crate::analyzer::ExpressionTypeInferencer)
/// against the ambient type environment.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value.
    Literal(Literal),

    /// A bare reference to a plan variable.
    Symbol(String),

    /// `CAST(expr AS type)`, or `TRY_CAST` when `safe`.
    Cast {
        /// The expression being cast.
        expr: Box<Expr>,
        /// The target type.
        target: TypeSignature,
        /// Whether a failed cast yields NULL instead of an error.
        safe: bool,
    },

    /// Arithmetic on two operands.
    Arithmetic {
        /// The operator.
        op: ArithmeticOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },

    /// Arithmetic negation.
    Negate(Box<Expr>),

    /// Comparison of two operands.
    Comparison {
        /// The operator.
        op: ComparisonOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },

    /// `AND` / `OR`.
    Logical {
        /// The operator.
        op: LogicalOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },

    /// Boolean negation.
    Not(Box<Expr>),

    /// `expr IS [NOT] NULL`.
    IsNull {
        /// The tested expression.
        expr: Box<Expr>,
        /// True for `IS NOT NULL`.
        negated: bool,
    },

    /// `expr BETWEEN low AND high`.
    Between {
        /// The tested expression.
        expr: Box<Expr>,
        /// Lower bound.
        low: Box<Expr>,
        /// Upper bound.
        high: Box<Expr>,
    },

    /// `COALESCE(a, b, ...)`.
    Coalesce(Vec<Expr>),

    /// `CASE WHEN cond THEN result ... [ELSE default] END`.
    SearchedCase {
        /// `(condition, result)` pairs.
        when_clauses: Vec<(Expr, Expr)>,
        /// The `ELSE` result.
        default: Option<Box<Expr>>,
    },

    /// A scalar function call, resolved by name and argument types.
    FunctionCall {
        /// Function name.
        name: String,
        /// Arguments.
        args: Vec<Expr>,
    },
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Untyped `NULL`.
    Null,
    /// Boolean literal.
    Boolean(bool),
    /// Integer literal.
    Long(i64),
    /// Approximate numeric literal.
    Double(f64),
    /// Exact numeric literal, kept in its source text form (e.g. `"12.50"`).
    Decimal(String),
    /// String literal.
    String(String),
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Modulus,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    /// `=`
    Eq,
    /// `<>`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
}

/// Logical connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl Expr {
    // ========== Leaves ==========

    /// Creates a symbol reference.
    #[must_use]
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// Creates a `NULL` literal.
    #[must_use]
    pub fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    /// Creates a boolean literal.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::Literal(Literal::Boolean(value))
    }

    /// Creates an integer literal.
    #[must_use]
    pub fn long(value: i64) -> Self {
        Self::Literal(Literal::Long(value))
    }

    /// Creates a double literal.
    #[must_use]
    pub fn double(value: f64) -> Self {
        Self::Literal(Literal::Double(value))
    }

    /// Creates an exact numeric literal from its text.
    #[must_use]
    pub fn decimal(text: impl Into<String>) -> Self {
        Self::Literal(Literal::Decimal(text.into()))
    }

    /// Creates a string literal.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    /// Creates a function call.
    #[must_use]
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::FunctionCall { name: name.into(), args }
    }

    /// Creates a `COALESCE`.
    #[must_use]
    pub fn coalesce(args: Vec<Expr>) -> Self {
        Self::Coalesce(args)
    }

    /// Creates a searched `CASE`.
    #[must_use]
    pub fn case(when_clauses: Vec<(Expr, Expr)>, default: Option<Expr>) -> Self {
        Self::SearchedCase { when_clauses, default: default.map(Box::new) }
    }

    // ========== Combinators ==========

    /// Creates `CAST(self AS target)`.
    #[must_use]
    pub fn cast(self, target: TypeSignature) -> Self {
        Self::Cast { expr: Box::new(self), target, safe: false }
    }

    /// Creates `TRY_CAST(self AS target)`.
    #[must_use]
    pub fn try_cast(self, target: TypeSignature) -> Self {
        Self::Cast { expr: Box::new(self), target, safe: true }
    }

    fn arithmetic(self, op: ArithmeticOp, other: Self) -> Self {
        Self::Arithmetic { op, left: Box::new(self), right: Box::new(other) }
    }

    fn comparison(self, op: ComparisonOp, other: Self) -> Self {
        Self::Comparison { op, left: Box::new(self), right: Box::new(other) }
    }

    /// Creates an addition.
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        self.arithmetic(ArithmeticOp::Add, other)
    }

    /// Creates a subtraction.
    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        self.arithmetic(ArithmeticOp::Subtract, other)
    }

    /// Creates a multiplication.
    #[must_use]
    pub fn mul(self, other: Self) -> Self {
        self.arithmetic(ArithmeticOp::Multiply, other)
    }

    /// Creates a division.
    #[must_use]
    pub fn div(self, other: Self) -> Self {
        self.arithmetic(ArithmeticOp::Divide, other)
    }

    /// Creates a modulus.
    #[must_use]
    pub fn modulus(self, other: Self) -> Self {
        self.arithmetic(ArithmeticOp::Modulus, other)
    }

    /// Creates a negation.
    #[must_use]
    pub fn neg(self) -> Self {
        Self::Negate(Box::new(self))
    }

    /// Creates an equality comparison.
    #[must_use]
    pub fn eq(self, other: Self) -> Self {
        self.comparison(ComparisonOp::Eq, other)
    }

    /// Creates a not-equal comparison.
    #[must_use]
    pub fn not_eq(self, other: Self) -> Self {
        self.comparison(ComparisonOp::NotEq, other)
    }

    /// Creates a less-than comparison.
    #[must_use]
    pub fn lt(self, other: Self) -> Self {
        self.comparison(ComparisonOp::Lt, other)
    }

    /// Creates a less-than-or-equal comparison.
    #[must_use]
    pub fn lt_eq(self, other: Self) -> Self {
        self.comparison(ComparisonOp::LtEq, other)
    }

    /// Creates a greater-than comparison.
    #[must_use]
    pub fn gt(self, other: Self) -> Self {
        self.comparison(ComparisonOp::Gt, other)
    }

    /// Creates a greater-than-or-equal comparison.
    #[must_use]
    pub fn gt_eq(self, other: Self) -> Self {
        self.comparison(ComparisonOp::GtEq, other)
    }

    /// Creates an `AND`.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::Logical { op: LogicalOp::And, left: Box::new(self), right: Box::new(other) }
    }

    /// Creates an `OR`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Logical { op: LogicalOp::Or, left: Box::new(self), right: Box::new(other) }
    }

    /// Creates a `NOT`.
    #[must_use]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Creates `self IS NULL`.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::IsNull { expr: Box::new(self), negated: false }
    }

    /// Creates `self IS NOT NULL`.
    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self::IsNull { expr: Box::new(self), negated: true }
    }

    /// Creates `self BETWEEN low AND high`.
    #[must_use]
    pub fn between(self, low: Self, high: Self) -> Self {
        Self::Between { expr: Box::new(self), low: Box::new(low), high: Box::new(high) }
    }

    // ========== Inspection ==========

    /// Returns the symbol name if this is a bare symbol reference.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Symbol(name) => write!(f, "{name}"),
            Self::Cast { expr, target, safe } => {
                let keyword = if *safe { "TRY_CAST" } else { "CAST" };
                write!(f, "{keyword}({expr} AS {target})")
            }
            Self::Arithmetic { op, left, right } => write!(f, "({left} {op} {right})"),
            Self::Negate(expr) => write!(f, "-{expr}"),
            Self::Comparison { op, left, right } => write!(f, "({left} {op} {right})"),
            Self::Logical { op, left, right } => write!(f, "({left} {op} {right})"),
            Self::Not(expr) => write!(f, "NOT {expr}"),
            Self::IsNull { expr, negated } => {
                if *negated {
                    write!(f, "{expr} IS NOT NULL")
                } else {
                    write!(f, "{expr} IS NULL")
                }
            }
            Self::Between { expr, low, high } => write!(f, "{expr} BETWEEN {low} AND {high}"),
            Self::Coalesce(args) => {
                write!(f, "COALESCE(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Self::SearchedCase { when_clauses, default } => {
                write!(f, "CASE")?;
                for (condition, result) in when_clauses {
                    write!(f, " WHEN {condition} THEN {result}")?;
                }
                if let Some(default) = default {
                    write!(f, " ELSE {default}")?;
                }
                write!(f, " END")
            }
            Self::FunctionCall { name, args } => {
                write!(f, "{name}(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(value) => write!(f, "{}", if *value { "TRUE" } else { "FALSE" }),
            Self::Long(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value:?}"),
            Self::Decimal(text) => write!(f, "DECIMAL '{text}'"),
            Self::String(value) => write!(f, "'{}'", value.replace('\'', "''")),
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulus => "%",
        };
        write!(f, "{symbol}")
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        };
        write!(f, "{symbol}")
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}
