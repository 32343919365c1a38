//! Type validation of plan outputs.
//!
//! Walks a plan and verifies that every output variable produced by an
//! aggregation, window, project, or union node carries the type its
//! defining function or expression actually produces.

use planguard_core::TypeSignature;
use tracing::{debug, trace};

use super::checker::Checker;
use super::error::{SanityError, SanityResult};
use crate::analyzer::ExpressionTypeInferencer;
use crate::expr::NodeRef;
use crate::metadata::{FunctionHandle, TypeOracle};
use crate::plan::{
    AggregationNode, AggregationStep, PlanNode, ProjectNode, TypeEnvironment, UnionNode,
    VariableReference, WindowNode,
};
use crate::session::Session;
use crate::warning::WarningCollector;

/// Verifies that plan output variables carry the types actually produced.
///
/// Rules per node kind:
///
/// - Aggregation (`SINGLE`, `FINAL`): each output agrees with the registered
///   return type of its function. `PARTIAL` and `INTERMEDIATE` outputs hold
///   accumulator state and are not checked.
/// - Window: each output agrees with the registered return type of its
///   function and with the call expression's own type.
/// - Project: each output agrees with the type of its expression, looked up
///   in the type environment for bare symbols and inferred otherwise.
/// - Union: each output agrees with every input variable feeding it.
///
/// Sources are validated before the node itself and the first violation
/// is returned. Other node kinds are traversed without a check.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeValidator;

impl TypeValidator {
    /// Creates a type validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validates `plan`.
    ///
    /// # Errors
    ///
    /// Returns [`SanityError::TypeMismatch`] for the first output whose
    /// declared type disagrees with the actual type, or a precondition
    /// error if the plan references unbound variables, unknown functions,
    /// or unresolvable types.
    pub fn validate(
        &self,
        plan: &PlanNode,
        session: &Session,
        oracle: &dyn TypeOracle,
        inferencer: &dyn ExpressionTypeInferencer,
        types: &TypeEnvironment,
        warnings: &mut WarningCollector,
    ) -> SanityResult<()> {
        Visitor { session, oracle, inferencer }.visit(plan, types, warnings)
    }
}

impl Checker for TypeValidator {
    fn name(&self) -> &'static str {
        "TypeValidator"
    }

    fn validate(
        &self,
        plan: &PlanNode,
        session: &Session,
        oracle: &dyn TypeOracle,
        inferencer: &dyn ExpressionTypeInferencer,
        types: &TypeEnvironment,
        warnings: &mut WarningCollector,
    ) -> SanityResult<()> {
        Self::validate(self, plan, session, oracle, inferencer, types, warnings)
    }
}

/// Checks that `actual` is an acceptable type for `variable`.
///
/// Accepted when `actual` is `unknown`, when the resolved actual type is a
/// type-only coercion of the declared type, or when both signatures are
/// equal.
///
/// # Errors
///
/// Returns [`SanityError::TypeMismatch`] when none of the above holds and
/// [`SanityError::UnresolvedType`] when `actual` names no known type.
pub fn verify_type_signature(
    oracle: &dyn TypeOracle,
    variable: &VariableReference,
    actual: &TypeSignature,
) -> SanityResult<()> {
    if actual.is_unknown() {
        return Ok(());
    }

    let actual_type = oracle.resolve(actual).map_err(|source| SanityError::UnresolvedType {
        signature: actual.clone(),
        source,
    })?;
    if oracle.is_type_only_coercion(&actual_type, variable.data_type()) {
        return Ok(());
    }

    let expected = variable.data_type().signature();
    if *actual == expected {
        Ok(())
    } else {
        Err(SanityError::TypeMismatch {
            variable: variable.name().to_string(),
            expected,
            actual: actual.clone(),
        })
    }
}

/// One validation run. The type environment and warning collector are
/// passed to every call rather than stored.
struct Visitor<'a> {
    session: &'a Session,
    oracle: &'a dyn TypeOracle,
    inferencer: &'a dyn ExpressionTypeInferencer,
}

impl Visitor<'_> {
    fn visit(
        &self,
        plan: &PlanNode,
        types: &TypeEnvironment,
        warnings: &mut WarningCollector,
    ) -> SanityResult<()> {
        for source in plan.sources() {
            self.visit(source, types, warnings)?;
        }

        let result = match plan {
            PlanNode::Aggregation { node, .. } => self.check_aggregation(node),
            PlanNode::Window { node, .. } => self.check_window(node),
            PlanNode::Project { node, .. } => self.check_project(node, types, warnings),
            PlanNode::Union { node, .. } => self.check_union(node),
            _ => return Ok(()),
        };

        if let Err(err) = &result {
            debug!(
                query_id = self.session.query_id(),
                node = %plan.id(),
                kind = plan.node_type(),
                error = %err,
                "plan type validation failed"
            );
        }
        result
    }

    fn check_aggregation(&self, node: &AggregationNode) -> SanityResult<()> {
        trace!(node = %node.id, step = %node.step, "checking aggregation output types");
        match node.step {
            AggregationStep::Single => {
                // TODO: check each argument against the function's formal
                // parameter types, as SINGLE consumes raw input rows.
                self.check_function_return_types(
                    node.aggregations.iter().map(|(v, a)| (v, &a.function_handle)),
                )
            }
            AggregationStep::Final => self.check_function_return_types(
                node.aggregations.iter().map(|(v, a)| (v, &a.function_handle)),
            ),
            AggregationStep::Partial | AggregationStep::Intermediate => Ok(()),
        }
    }

    fn check_window(&self, node: &WindowNode) -> SanityResult<()> {
        trace!(node = %node.id, "checking window output types");
        for (variable, function) in &node.functions {
            self.check_function_return_type(variable, &function.function_handle)?;
            verify_type_signature(
                self.oracle,
                variable,
                &function.call.return_type().signature(),
            )?;
        }
        Ok(())
    }

    fn check_project(
        &self,
        node: &ProjectNode,
        types: &TypeEnvironment,
        warnings: &mut WarningCollector,
    ) -> SanityResult<()> {
        trace!(node = %node.id, "checking project output types");
        for (variable, expr) in node.assignments.iter() {
            let actual = if let Some(symbol) = expr.as_symbol() {
                types
                    .type_of(symbol)
                    .ok_or_else(|| SanityError::MissingVariableType {
                        variable: symbol.to_string(),
                    })?
                    .signature()
            } else {
                let inferred = self.inferencer.infer_types(self.session, expr, types, warnings)?;
                inferred
                    .get(&NodeRef::of(expr))
                    .ok_or_else(|| SanityError::MissingExpressionType {
                        expression: expr.to_string(),
                    })?
                    .signature()
            };
            verify_type_signature(self.oracle, variable, &actual)?;
        }
        Ok(())
    }

    fn check_union(&self, node: &UnionNode) -> SanityResult<()> {
        trace!(node = %node.id, "checking union output types");
        for (output, inputs) in &node.variable_mapping {
            for input in inputs {
                verify_type_signature(self.oracle, output, &input.data_type().signature())?;
            }
        }
        Ok(())
    }

    fn check_function_return_types<'n>(
        &self,
        outputs: impl IntoIterator<Item = (&'n VariableReference, &'n FunctionHandle)>,
    ) -> SanityResult<()> {
        for (variable, handle) in outputs {
            self.check_function_return_type(variable, handle)?;
        }
        Ok(())
    }

    fn check_function_return_type(
        &self,
        variable: &VariableReference,
        handle: &FunctionHandle,
    ) -> SanityResult<()> {
        let return_type = self
            .oracle
            .return_type_of(handle)
            .ok_or_else(|| SanityError::UnknownFunction { handle: handle.clone() })?;
        verify_type_signature(self.oracle, variable, &return_type)
    }
}

#[cfg(test)]
mod tests {
    use planguard_core::{PlanType, TypeError, TypeManager};

    use super::*;
    use crate::analyzer::ExpressionAnalyzer;
    use crate::expr::{CallExpression, Expr};
    use crate::metadata::{FunctionRegistry, Metadata};
    use crate::plan::{Aggregation, Assignments, Ordering, PlanBuilder, WindowFunction};

    fn validate(metadata: &Metadata, plan: &PlanNode, types: &TypeEnvironment) -> SanityResult<()> {
        let analyzer = ExpressionAnalyzer::new(metadata);
        TypeValidator::new().validate(
            plan,
            &Session::new("test", "tester"),
            metadata,
            &analyzer,
            types,
            &mut WarningCollector::default(),
        )
    }

    fn handle(name: &str, args: &[PlanType]) -> FunctionHandle {
        FunctionHandle::new(name, args.iter().map(PlanType::signature).collect())
    }

    fn mismatch(variable: &str, expected: &str, actual: &str) -> SanityError {
        SanityError::TypeMismatch {
            variable: variable.to_string(),
            expected: TypeSignature::parse(expected).unwrap(),
            actual: TypeSignature::parse(actual).unwrap(),
        }
    }

    #[test]
    fn verify_accepts_unknown_coercion_and_equality() {
        let metadata = Metadata::with_builtins();
        let v = VariableReference::new("v", PlanType::varchar(10));

        assert!(verify_type_signature(&metadata, &v, &TypeSignature::unknown()).is_ok());
        let narrower = TypeSignature::parse("varchar(5)").unwrap();
        assert!(verify_type_signature(&metadata, &v, &narrower).is_ok());
        let same = TypeSignature::parse("varchar(10)").unwrap();
        assert!(verify_type_signature(&metadata, &v, &same).is_ok());
        assert_eq!(
            verify_type_signature(&metadata, &v, &TypeSignature::parse("varchar(11)").unwrap()),
            Err(mismatch("v", "varchar(10)", "varchar(11)"))
        );
    }

    #[test]
    fn verify_rejects_representation_change() {
        let metadata = Metadata::with_builtins();
        let v = VariableReference::new("v", PlanType::BigInt);
        assert_eq!(
            verify_type_signature(&metadata, &v, &TypeSignature::simple("integer")),
            Err(mismatch("v", "bigint", "integer"))
        );

        let short = VariableReference::new("d", PlanType::decimal(20, 2));
        let actual = TypeSignature::parse("decimal(10,2)").unwrap();
        assert_eq!(
            verify_type_signature(&metadata, &short, &actual),
            Err(mismatch("d", "decimal(20,2)", "decimal(10,2)"))
        );
    }

    #[test]
    fn verify_reports_unresolvable_actual() {
        let metadata = Metadata::with_builtins();
        let v = VariableReference::new("v", PlanType::BigInt);
        assert!(matches!(
            verify_type_signature(&metadata, &v, &TypeSignature::simple("geometry")),
            Err(SanityError::UnresolvedType { .. })
        ));
    }

    #[test]
    fn verify_reports_alias_cycle() {
        let mut types = TypeManager::new();
        types.register_alias("a", TypeSignature::simple("b"));
        types.register_alias("b", TypeSignature::simple("a"));
        let metadata = Metadata::new(FunctionRegistry::with_builtins(), types);
        let v = VariableReference::new("v", PlanType::BigInt);

        assert_eq!(
            verify_type_signature(&metadata, &v, &TypeSignature::simple("a")),
            Err(SanityError::UnresolvedType {
                signature: TypeSignature::simple("a"),
                source: TypeError::UnresolvedAlias("a".to_string()),
            })
        );
    }

    #[test]
    fn project_symbol_uses_environment() {
        let metadata = Metadata::with_builtins();
        let mut builder = PlanBuilder::new();
        let a = builder.variable("a", PlanType::Integer);
        let b = builder.variable("b", PlanType::BigInt);
        let values = builder.values(vec![a]);
        let plan = builder.project(values, Assignments::new().with(b, Expr::symbol("a")));

        assert_eq!(
            validate(&metadata, &plan, builder.types()),
            Err(mismatch("b", "bigint", "integer"))
        );
    }

    #[test]
    fn project_unbound_symbol() {
        let metadata = Metadata::with_builtins();
        let mut builder = PlanBuilder::new();
        let b = builder.variable("b", PlanType::BigInt);
        let values = builder.values(vec![]);
        let plan = builder.project(values, Assignments::new().with(b, Expr::symbol("ghost")));

        assert_eq!(
            validate(&metadata, &plan, builder.types()),
            Err(SanityError::MissingVariableType { variable: "ghost".to_string() })
        );
    }

    #[test]
    fn project_analysis_failure_propagates() {
        let metadata = Metadata::with_builtins();
        let mut builder = PlanBuilder::new();
        let b = builder.variable("b", PlanType::BigInt);
        let values = builder.values(vec![]);
        let plan = builder.project(
            values,
            Assignments::new().with(b, Expr::call("nope", vec![Expr::long(1)])),
        );

        assert!(matches!(
            validate(&metadata, &plan, builder.types()),
            Err(SanityError::Analysis(_))
        ));
    }

    #[test]
    fn final_aggregation_checks_return_type() {
        let metadata = Metadata::with_builtins();
        let mut builder = PlanBuilder::new();
        let x = builder.variable("x", PlanType::Double);
        let total = builder.variable("total", PlanType::BigInt);
        let values = builder.values(vec![x.clone()]);
        let sum = Aggregation::new(handle("sum", &[PlanType::Double]), vec![x.into()]);
        let plan = builder.aggregation(values, vec![], vec![(total, sum)], AggregationStep::Final);

        assert_eq!(
            validate(&metadata, &plan, builder.types()),
            Err(mismatch("total", "bigint", "double"))
        );
    }

    #[test]
    fn aggregation_unknown_function() {
        let metadata = Metadata::with_builtins();
        let mut builder = PlanBuilder::new();
        let v = builder.variable("v", PlanType::BigInt);
        let values = builder.values(vec![]);
        let missing = handle("missing_agg", &[]);
        let plan = builder.aggregation(
            values,
            vec![],
            vec![(v, Aggregation::new(missing.clone(), vec![]))],
            AggregationStep::Single,
        );

        assert_eq!(
            validate(&metadata, &plan, builder.types()),
            Err(SanityError::UnknownFunction { handle: missing })
        );
    }

    #[test]
    fn window_checks_catalog_and_call() {
        let metadata = Metadata::with_builtins();
        let rank = handle("rank", &[]);
        let window = |call_type: PlanType, declared: PlanType| {
            let mut builder = PlanBuilder::new();
            let k = builder.variable("k", PlanType::BigInt);
            let r = builder.variable("r", declared);
            let values = builder.values(vec![k.clone()]);
            let call = CallExpression::new("rank", rank.clone(), call_type, vec![]);
            let plan = builder.window(
                values,
                vec![],
                vec![Ordering::asc(k)],
                vec![(r, WindowFunction::new(rank.clone(), call))],
            );
            validate(&metadata, &plan, builder.types())
        };

        assert!(window(PlanType::BigInt, PlanType::BigInt).is_ok());
        // The catalog says bigint
        assert_eq!(
            window(PlanType::Integer, PlanType::Integer),
            Err(mismatch("r", "integer", "bigint"))
        );
        // The call says integer
        assert_eq!(
            window(PlanType::Integer, PlanType::BigInt),
            Err(mismatch("r", "bigint", "integer"))
        );
    }

    #[test]
    fn sources_are_validated_first() {
        let metadata = Metadata::with_builtins();
        let mut builder = PlanBuilder::new();
        let a = builder.variable("a", PlanType::Integer);
        let inner = builder.variable("inner", PlanType::Boolean);
        let outer = builder.variable("outer", PlanType::Boolean);
        let values = builder.values(vec![a]);
        let lower = builder.project(values, Assignments::new().with(inner, Expr::symbol("a")));
        let upper = builder.project(lower, Assignments::new().with(outer, Expr::symbol("a")));

        // Both projects are wrong; the deeper one is reported
        assert_eq!(
            validate(&metadata, &upper, builder.types()),
            Err(mismatch("inner", "boolean", "integer"))
        );
    }

    #[test]
    fn unchecked_nodes_are_traversed() {
        let metadata = Metadata::with_builtins();
        let mut builder = PlanBuilder::new();
        let a = builder.variable("a", PlanType::Integer);
        let bad = builder.variable("bad", PlanType::Date);
        let values = builder.values(vec![a.clone()]);
        let project = builder.project(values, Assignments::new().with(bad, Expr::symbol("a")));
        let filter = builder.filter(project, Expr::symbol("a").gt(Expr::long(0)));
        let limit = builder.limit(filter, 10);
        let plan = builder.output(limit, vec![("a".to_string(), a)]);

        assert_eq!(
            validate(&metadata, &plan, builder.types()),
            Err(mismatch("bad", "date", "integer"))
        );
    }
}
