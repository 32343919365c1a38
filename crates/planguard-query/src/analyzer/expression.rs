//! Expression type inference.
//!
//! Given a type environment (the types of the plan variables in scope),
//! the analyzer determines the type of every node of an expression tree.

use std::collections::HashMap;

use planguard_core::{PlanType, MAX_DECIMAL_PRECISION};
use tracing::trace;

use super::error::{AnalysisResult, SemanticError};
use crate::expr::{ArithmeticOp, Expr, Literal, NodeRef};
use crate::metadata::Metadata;
use crate::plan::TypeEnvironment;
use crate::session::Session;
use crate::warning::{PlanWarning, WarningCode, WarningCollector};

/// Inferred types of every node of an expression, keyed by node identity.
pub type ExpressionTypes<'e> = HashMap<NodeRef<'e, Expr>, PlanType>;

/// Computes the types an expression actually produces.
///
/// Implementations must be safe for concurrent reads so independent plans
/// can be analyzed on separate threads.
pub trait ExpressionTypeInferencer: Send + Sync {
    /// Infers the type of `expr` and each of its sub-expressions.
    ///
    /// Symbols are resolved against `types`. Non-fatal findings, such as
    /// calls to deprecated functions, are reported to `warnings`.
    ///
    /// # Errors
    ///
    /// Returns an error if a symbol is unbound, a function cannot be
    /// resolved, or operand types are incompatible.
    fn infer_types<'e>(
        &self,
        session: &Session,
        expr: &'e Expr,
        types: &TypeEnvironment,
        warnings: &mut WarningCollector,
    ) -> AnalysisResult<ExpressionTypes<'e>>;
}

/// The default expression type inferencer, backed by the function catalog
/// and type manager in [`Metadata`].
///
/// # Example
///
/// ```
/// use planguard_core::PlanType;
/// use planguard_query::analyzer::{ExpressionAnalyzer, ExpressionTypeInferencer};
/// use planguard_query::expr::{Expr, NodeRef};
/// use planguard_query::metadata::Metadata;
/// use planguard_query::plan::TypeEnvironment;
/// use planguard_query::{Session, WarningCollector};
///
/// let metadata = Metadata::with_builtins();
/// let mut types = TypeEnvironment::new();
/// types.insert("age", PlanType::Integer);
///
/// let expr = Expr::symbol("age").add(Expr::long(1));
/// let inferred = ExpressionAnalyzer::new(&metadata)
///     .infer_types(&Session::new("q", "u"), &expr, &types, &mut WarningCollector::default())
///     .unwrap();
///
/// assert_eq!(inferred[&NodeRef::of(&expr)], PlanType::Integer);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ExpressionAnalyzer<'m> {
    metadata: &'m Metadata,
}

impl<'m> ExpressionAnalyzer<'m> {
    /// Creates an analyzer over the given catalog.
    #[must_use]
    pub fn new(metadata: &'m Metadata) -> Self {
        Self { metadata }
    }
}

impl ExpressionTypeInferencer for ExpressionAnalyzer<'_> {
    fn infer_types<'e>(
        &self,
        session: &Session,
        expr: &'e Expr,
        types: &TypeEnvironment,
        warnings: &mut WarningCollector,
    ) -> AnalysisResult<ExpressionTypes<'e>> {
        let mut analysis = Analysis::new(self.metadata, types, warnings);
        let root = analysis.analyze(expr)?;
        trace!(query_id = session.query_id(), %expr, %root, "inferred expression type");
        Ok(analysis.inferred)
    }
}

/// State of one inference run.
struct Analysis<'a, 'e> {
    metadata: &'a Metadata,
    types: &'a TypeEnvironment,
    warnings: &'a mut WarningCollector,
    inferred: ExpressionTypes<'e>,
}

impl<'a, 'e> Analysis<'a, 'e> {
    fn new(
        metadata: &'a Metadata,
        types: &'a TypeEnvironment,
        warnings: &'a mut WarningCollector,
    ) -> Self {
        Self { metadata, types, warnings, inferred: HashMap::new() }
    }

    fn analyze(&mut self, expr: &'e Expr) -> AnalysisResult<PlanType> {
        let data_type = self.analyze_node(expr)?;
        self.inferred.insert(NodeRef::of(expr), data_type.clone());
        Ok(data_type)
    }

    fn analyze_node(&mut self, expr: &'e Expr) -> AnalysisResult<PlanType> {
        match expr {
            Expr::Literal(literal) => literal_type(literal),

            Expr::Symbol(name) => self
                .types
                .type_of(name)
                .cloned()
                .ok_or_else(|| SemanticError::UnknownSymbol(name.clone())),

            // TRY_CAST has the same type as CAST
            Expr::Cast { expr: operand, target, .. } => {
                let from = self.analyze(operand)?;
                let to = self.metadata.types().resolve(target)?;
                if self.metadata.types().can_cast(&from, &to) {
                    Ok(to)
                } else {
                    Err(SemanticError::CannotCast { from, to })
                }
            }

            Expr::Arithmetic { op, left, right } => {
                let left = self.analyze(left)?;
                let right = self.analyze(right)?;
                self.arithmetic_type(*op, &left, &right)
            }

            Expr::Negate(operand) => {
                let operand = self.analyze(operand)?;
                if operand.is_numeric() || operand.is_unknown() {
                    Ok(operand)
                } else {
                    Err(SemanticError::TypeMismatch {
                        operation: "negation".to_string(),
                        expected: "numeric".to_string(),
                        actual: operand,
                    })
                }
            }

            Expr::Comparison { op, left, right } => {
                let left = self.analyze(left)?;
                let right = self.analyze(right)?;
                self.super_type(&op.to_string(), &left, &right)?;
                Ok(PlanType::Boolean)
            }

            Expr::Logical { op, left, right } => {
                let operation = op.to_string();
                let left = self.analyze(left)?;
                expect_boolean(&operation, left)?;
                let right = self.analyze(right)?;
                expect_boolean(&operation, right)?;
                Ok(PlanType::Boolean)
            }

            Expr::Not(operand) => {
                let operand = self.analyze(operand)?;
                expect_boolean("NOT", operand)?;
                Ok(PlanType::Boolean)
            }

            Expr::IsNull { expr: operand, .. } => {
                self.analyze(operand)?;
                Ok(PlanType::Boolean)
            }

            Expr::Between { expr: operand, low, high } => {
                let operand = self.analyze(operand)?;
                let low = self.analyze(low)?;
                let high = self.analyze(high)?;
                let bound = self.super_type("BETWEEN", &operand, &low)?;
                self.super_type("BETWEEN", &bound, &high)?;
                Ok(PlanType::Boolean)
            }

            Expr::Coalesce(args) => {
                let (first, rest) = args.split_first().ok_or_else(|| {
                    SemanticError::InvalidExpression(
                        "COALESCE requires at least one argument".to_string(),
                    )
                })?;
                let mut result = self.analyze(first)?;
                for arg in rest {
                    let arg = self.analyze(arg)?;
                    result = self.super_type("COALESCE", &result, &arg)?;
                }
                Ok(result)
            }

            Expr::SearchedCase { when_clauses, default } => {
                if when_clauses.is_empty() {
                    return Err(SemanticError::InvalidExpression(
                        "CASE requires at least one WHEN clause".to_string(),
                    ));
                }
                let mut result = PlanType::Unknown;
                for (condition, value) in when_clauses {
                    let condition = self.analyze(condition)?;
                    expect_boolean("CASE WHEN", condition)?;
                    let value = self.analyze(value)?;
                    result = self.super_type("CASE", &result, &value)?;
                }
                if let Some(default) = default {
                    let default = self.analyze(default)?;
                    result = self.super_type("CASE", &result, &default)?;
                }
                Ok(result)
            }

            Expr::FunctionCall { name, args } => {
                let arguments = args
                    .iter()
                    .map(|arg| self.analyze(arg))
                    .collect::<AnalysisResult<Vec<_>>>()?;
                let function =
                    self.metadata.functions().resolve(name, &arguments, self.metadata.types())?;
                if let Some(notice) = &function.deprecation {
                    self.warnings.add(PlanWarning::new(
                        WarningCode::DeprecatedFunction,
                        format!("{} is deprecated: {notice}", function.handle),
                    ));
                }
                Ok(self.metadata.types().resolve(&function.return_type)?)
            }
        }
    }

    fn super_type(
        &self,
        operation: &str,
        left: &PlanType,
        right: &PlanType,
    ) -> AnalysisResult<PlanType> {
        self.metadata.types().common_super_type(left, right).ok_or_else(|| {
            SemanticError::IncompatibleTypes {
                operation: operation.to_string(),
                left: left.clone(),
                right: right.clone(),
            }
        })
    }

    fn arithmetic_type(
        &self,
        op: ArithmeticOp,
        left: &PlanType,
        right: &PlanType,
    ) -> AnalysisResult<PlanType> {
        let incompatible = || SemanticError::IncompatibleTypes {
            operation: op.to_string(),
            left: left.clone(),
            right: right.clone(),
        };

        // An untyped NULL takes the type of the other operand
        let (l, r) = match (left, right) {
            (PlanType::Unknown, PlanType::Unknown) => return Ok(PlanType::Unknown),
            (PlanType::Unknown, other) | (other, PlanType::Unknown) => (other, other),
            _ => (left, right),
        };
        if !l.is_numeric() || !r.is_numeric() {
            return Err(incompatible());
        }

        let floating = |ty: &PlanType| matches!(ty, PlanType::Real | PlanType::Double);
        let decimal = |ty: &PlanType| matches!(ty, PlanType::Decimal { .. });
        if !floating(l) && !floating(r) && (decimal(l) || decimal(r)) {
            let (lp, ls) = l.decimal_parts().ok_or_else(incompatible)?;
            let (rp, rs) = r.decimal_parts().ok_or_else(incompatible)?;
            return Ok(decimal_arithmetic_type(op, (lp, ls), (rp, rs)));
        }

        self.super_type(&op.to_string(), l, r)
    }
}

/// Result type of exact decimal arithmetic, capped at the maximum precision.
fn decimal_arithmetic_type(op: ArithmeticOp, left: (u8, u8), right: (u8, u8)) -> PlanType {
    let ((lp, ls), (rp, rs)) = (left, right);
    let (precision, scale) = match op {
        ArithmeticOp::Add | ArithmeticOp::Subtract => {
            let scale = ls.max(rs);
            (1 + scale + (lp - ls).max(rp - rs), scale)
        }
        ArithmeticOp::Multiply => (lp + rp, ls + rs),
        ArithmeticOp::Divide => (lp + rs + rs.saturating_sub(ls), ls.max(rs)),
        ArithmeticOp::Modulus => {
            let scale = ls.max(rs);
            ((lp - ls).min(rp - rs) + scale, scale)
        }
    };
    let precision = precision.min(MAX_DECIMAL_PRECISION);
    PlanType::decimal(precision, scale.min(precision))
}

fn literal_type(literal: &Literal) -> AnalysisResult<PlanType> {
    Ok(match literal {
        Literal::Null => PlanType::Unknown,
        Literal::Boolean(_) => PlanType::Boolean,
        Literal::Long(value) => {
            if i32::try_from(*value).is_ok() {
                PlanType::Integer
            } else {
                PlanType::BigInt
            }
        }
        Literal::Double(_) => PlanType::Double,
        Literal::Decimal(text) => decimal_literal_type(text)?,
        Literal::String(value) => u32::try_from(value.chars().count())
            .map_or_else(|_| PlanType::unbounded_varchar(), PlanType::varchar),
    })
}

/// Type of an exact numeric literal: one digit of precision per significant
/// digit, one digit of scale per fractional digit.
fn decimal_literal_type(text: &str) -> AnalysisResult<PlanType> {
    let invalid = |reason: &str| SemanticError::InvalidLiteral {
        literal: text.to_string(),
        reason: reason.to_string(),
    };

    let unsigned = text.strip_prefix('-').or_else(|| text.strip_prefix('+')).unwrap_or(text);
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = integer.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit());
    if (integer.is_empty() && fraction.is_empty()) || !all_digits {
        return Err(invalid("not a decimal number"));
    }

    let scale = fraction.len();
    let precision = (integer.trim_start_matches('0').len() + scale).max(1);
    if precision > usize::from(MAX_DECIMAL_PRECISION) {
        return Err(invalid("precision exceeds the maximum"));
    }

    let precision = u8::try_from(precision).map_err(|_| invalid("precision out of range"))?;
    let scale = u8::try_from(scale).map_err(|_| invalid("scale out of range"))?;
    Ok(PlanType::decimal(precision, scale))
}

fn expect_boolean(operation: &str, actual: PlanType) -> AnalysisResult<()> {
    if matches!(actual, PlanType::Boolean | PlanType::Unknown) {
        Ok(())
    } else {
        Err(SemanticError::TypeMismatch {
            operation: operation.to_string(),
            expected: "boolean".to_string(),
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use planguard_core::TypeSignature;

    use super::*;
    use crate::metadata::ResolveError;

    fn env() -> TypeEnvironment {
        [
            ("i".to_string(), PlanType::Integer),
            ("b".to_string(), PlanType::BigInt),
            ("d".to_string(), PlanType::Double),
            ("price".to_string(), PlanType::decimal(10, 2)),
            ("name".to_string(), PlanType::varchar(20)),
            ("flag".to_string(), PlanType::Boolean),
            ("day".to_string(), PlanType::Date),
        ]
        .into_iter()
        .collect()
    }

    fn infer(expr: &Expr) -> AnalysisResult<PlanType> {
        let metadata = Metadata::with_builtins();
        let inferred = ExpressionAnalyzer::new(&metadata).infer_types(
            &Session::new("test", "tester"),
            expr,
            &env(),
            &mut WarningCollector::default(),
        )?;
        Ok(inferred[&NodeRef::of(expr)].clone())
    }

    #[test]
    fn literal_types() {
        assert_eq!(infer(&Expr::null()).unwrap(), PlanType::Unknown);
        assert_eq!(infer(&Expr::boolean(true)).unwrap(), PlanType::Boolean);
        assert_eq!(infer(&Expr::long(7)).unwrap(), PlanType::Integer);
        assert_eq!(infer(&Expr::long(1 << 40)).unwrap(), PlanType::BigInt);
        assert_eq!(infer(&Expr::double(1.5)).unwrap(), PlanType::Double);
        assert_eq!(infer(&Expr::string("héllo")).unwrap(), PlanType::varchar(5));
    }

    #[test]
    fn decimal_literals() {
        assert_eq!(infer(&Expr::decimal("12.50")).unwrap(), PlanType::decimal(4, 2));
        assert_eq!(infer(&Expr::decimal("-0.5")).unwrap(), PlanType::decimal(1, 1));
        assert_eq!(infer(&Expr::decimal("007")).unwrap(), PlanType::decimal(1, 0));
        assert!(matches!(
            infer(&Expr::decimal("1.2.3")),
            Err(SemanticError::InvalidLiteral { .. })
        ));
        assert!(matches!(
            infer(&Expr::decimal(&"9".repeat(39))),
            Err(SemanticError::InvalidLiteral { .. })
        ));
    }

    #[test]
    fn symbols() {
        assert_eq!(infer(&Expr::symbol("name")).unwrap(), PlanType::varchar(20));
        assert_eq!(
            infer(&Expr::symbol("missing")),
            Err(SemanticError::UnknownSymbol("missing".to_string()))
        );
    }

    #[test]
    fn casts() {
        let cast = Expr::symbol("name").cast(TypeSignature::simple("integer"));
        assert_eq!(infer(&cast).unwrap(), PlanType::Integer);

        let try_cast = Expr::symbol("name").try_cast(TypeSignature::parse("decimal(5,1)").unwrap());
        assert_eq!(infer(&try_cast).unwrap(), PlanType::decimal(5, 1));

        let bad = Expr::symbol("day").cast(TypeSignature::simple("bigint"));
        assert_eq!(
            infer(&bad),
            Err(SemanticError::CannotCast { from: PlanType::Date, to: PlanType::BigInt })
        );

        let unknown_target = Expr::symbol("i").cast(TypeSignature::simple("geometry"));
        assert!(matches!(infer(&unknown_target), Err(SemanticError::Type(_))));
    }

    #[test]
    fn arithmetic() {
        assert_eq!(infer(&Expr::symbol("i").add(Expr::symbol("b"))).unwrap(), PlanType::BigInt);
        assert_eq!(infer(&Expr::symbol("i").mul(Expr::symbol("d"))).unwrap(), PlanType::Double);
        assert_eq!(infer(&Expr::null().add(Expr::symbol("i"))).unwrap(), PlanType::Integer);
        assert_eq!(infer(&Expr::null().add(Expr::null())).unwrap(), PlanType::Unknown);
        assert_eq!(infer(&Expr::symbol("i").neg()).unwrap(), PlanType::Integer);
        assert!(matches!(
            infer(&Expr::symbol("name").add(Expr::long(1))),
            Err(SemanticError::IncompatibleTypes { .. })
        ));
    }

    #[test]
    fn decimal_arithmetic() {
        let price = || Expr::symbol("price");
        assert_eq!(infer(&price().add(price())).unwrap(), PlanType::decimal(11, 2));
        assert_eq!(infer(&price().mul(price())).unwrap(), PlanType::decimal(20, 4));
        assert_eq!(infer(&price().mul(Expr::symbol("i"))).unwrap(), PlanType::decimal(20, 2));
        assert_eq!(infer(&price().div(Expr::long(2))).unwrap(), PlanType::decimal(10, 2));
        assert_eq!(infer(&price().add(Expr::symbol("d"))).unwrap(), PlanType::Double);
    }

    #[test]
    fn predicates() {
        let comparison = Expr::symbol("i").lt(Expr::symbol("price"));
        assert_eq!(infer(&comparison).unwrap(), PlanType::Boolean);

        let logical = Expr::symbol("flag").and(Expr::symbol("i").is_null()).not();
        assert_eq!(infer(&logical).unwrap(), PlanType::Boolean);

        let between = Expr::symbol("b").between(Expr::long(1), Expr::long(10));
        assert_eq!(infer(&between).unwrap(), PlanType::Boolean);

        assert!(matches!(
            infer(&Expr::symbol("flag").or(Expr::symbol("i"))),
            Err(SemanticError::TypeMismatch { .. })
        ));
        assert!(matches!(
            infer(&Expr::symbol("day").eq(Expr::symbol("flag"))),
            Err(SemanticError::IncompatibleTypes { .. })
        ));
    }

    #[test]
    fn coalesce_and_case() {
        let coalesce = Expr::coalesce(vec![Expr::null(), Expr::symbol("i"), Expr::symbol("b")]);
        assert_eq!(infer(&coalesce).unwrap(), PlanType::BigInt);

        let case = Expr::case(
            vec![(Expr::symbol("flag"), Expr::string("yes"))],
            Some(Expr::string("no!")),
        );
        assert_eq!(infer(&case).unwrap(), PlanType::varchar(3));

        let no_default = Expr::case(vec![(Expr::symbol("flag"), Expr::symbol("d"))], None);
        assert_eq!(infer(&no_default).unwrap(), PlanType::Double);

        assert!(matches!(
            infer(&Expr::coalesce(vec![])),
            Err(SemanticError::InvalidExpression(_))
        ));
        assert!(matches!(
            infer(&Expr::case(vec![(Expr::symbol("i"), Expr::long(1))], None)),
            Err(SemanticError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn function_calls() {
        assert_eq!(
            infer(&Expr::call("length", vec![Expr::symbol("name")])).unwrap(),
            PlanType::BigInt
        );
        assert_eq!(
            infer(&Expr::call("ABS", vec![Expr::symbol("i")])).unwrap(),
            PlanType::Integer
        );
        assert!(matches!(
            infer(&Expr::call("no_such_function", vec![])),
            Err(SemanticError::Function(ResolveError::NotFound { .. }))
        ));
    }

    #[test]
    fn deprecated_function_warns() {
        let metadata = Metadata::with_builtins();
        let mut warnings = WarningCollector::default();
        let expr = Expr::call("rand", vec![]);

        let inferred = ExpressionAnalyzer::new(&metadata)
            .infer_types(&Session::new("q", "u"), &expr, &env(), &mut warnings)
            .unwrap();

        assert_eq!(inferred[&NodeRef::of(&expr)], PlanType::Double);
        assert_eq!(warnings.warnings().len(), 1);
        assert_eq!(warnings.warnings()[0].code, WarningCode::DeprecatedFunction);
        assert!(warnings.warnings()[0].message.contains("rand()"));
    }

    #[test]
    fn every_node_is_typed() {
        let metadata = Metadata::with_builtins();
        let left = Expr::symbol("i");
        let expr = left.clone().add(Expr::long(1)).gt(Expr::symbol("b"));

        let inferred = ExpressionAnalyzer::new(&metadata)
            .infer_types(&Session::new("q", "u"), &expr, &env(), &mut WarningCollector::default())
            .unwrap();

        // gt, add, i, 1, b
        assert_eq!(inferred.len(), 5);
        assert_eq!(inferred[&NodeRef::of(&expr)], PlanType::Boolean);
        if let Expr::Comparison { left: sum, right, .. } = &expr {
            assert_eq!(inferred[&NodeRef::of(sum.as_ref())], PlanType::Integer);
            assert_eq!(inferred[&NodeRef::of(right.as_ref())], PlanType::BigInt);
        } else {
            panic!("expected a comparison");
        }
        // A structurally equal node outside the tree has no entry
        assert!(!inferred.contains_key(&NodeRef::of(&left)));
    }
}
