//! Property-based tests for the type validator's acceptance rules.

use planguard_core::{PlanType, TypeManager};
use planguard_query::analyzer::ExpressionAnalyzer;
use planguard_query::expr::Expr;
use planguard_query::metadata::{FunctionHandle, Metadata};
use planguard_query::plan::{
    Aggregation, AggregationStep, Assignments, PlanBuilder, PlanNode, TypeEnvironment,
};
use planguard_query::sanity::{SanityError, SanityResult, TypeValidator};
use planguard_query::{Session, WarningCollector};
use proptest::prelude::*;

/// Strategy for generating plan types, weighted toward the families with
/// type-only coercions.
fn arb_plan_type() -> impl Strategy<Value = PlanType> {
    let leaf = prop_oneof![
        Just(PlanType::Unknown),
        Just(PlanType::Boolean),
        Just(PlanType::Integer),
        Just(PlanType::BigInt),
        Just(PlanType::Double),
        Just(PlanType::Date),
        Just(PlanType::unbounded_varchar()),
        (1u32..20).prop_map(PlanType::varchar),
        (1u8..=38).prop_flat_map(|p| (Just(p), 0..=p)).prop_map(|(p, s)| PlanType::decimal(p, s)),
    ];

    leaf.prop_recursive(
        2, // depth
        8, // size
        2, // items per collection
        |inner| {
            prop_oneof![
                inner.clone().prop_map(PlanType::array),
                (inner.clone(), inner).prop_map(|(k, v)| PlanType::map(k, v)),
            ]
        },
    )
}

/// Declared types: anything but the `unknown` wildcard.
fn arb_declared_type() -> impl Strategy<Value = PlanType> {
    arb_plan_type().prop_filter("declared types are concrete", |ty| !ty.is_unknown())
}

/// The acceptance rule for a declared type and the type actually produced.
fn accepts(actual: &PlanType, declared: &PlanType) -> bool {
    actual.is_unknown()
        || TypeManager::new().is_type_only_coercion(actual, declared)
        || actual.signature() == declared.signature()
}

fn validate(plan: &PlanNode, types: &TypeEnvironment) -> SanityResult<()> {
    let metadata = Metadata::with_builtins();
    let analyzer = ExpressionAnalyzer::new(&metadata);
    TypeValidator::new().validate(
        plan,
        &Session::new("proptest", "tester"),
        &metadata,
        &analyzer,
        types,
        &mut WarningCollector::default(),
    )
}

fn project_plan(source: PlanType, declared: PlanType, expr: Expr) -> (PlanNode, TypeEnvironment) {
    let mut builder = PlanBuilder::new();
    let x = builder.variable("x", source);
    let v = builder.variable("v", declared);
    let values = builder.values(vec![x]);
    let plan = builder.project(values, Assignments::new().with(v, expr));
    (plan, builder.into_types())
}

proptest! {
    #[test]
    fn project_symbol_follows_rule(source in arb_plan_type(), declared in arb_declared_type()) {
        let (plan, types) = project_plan(source.clone(), declared.clone(), Expr::symbol("x"));
        let result = validate(&plan, &types);

        if accepts(&source, &declared) {
            prop_assert_eq!(result, Ok(()));
        } else {
            prop_assert_eq!(
                result,
                Err(SanityError::TypeMismatch {
                    variable: "v".to_string(),
                    expected: declared.signature(),
                    actual: source.signature(),
                })
            );
        }
    }

    #[test]
    fn project_expression_follows_rule(source in arb_plan_type(), declared in arb_declared_type()) {
        // COALESCE of a single argument has the argument's type but is not a
        // bare symbol, so it goes through the inferencer
        let expr = Expr::coalesce(vec![Expr::symbol("x")]);
        let (plan, types) = project_plan(source.clone(), declared.clone(), expr);

        prop_assert_eq!(validate(&plan, &types).is_ok(), accepts(&source, &declared));
    }

    #[test]
    fn partial_and_intermediate_always_accept(
        declared in arb_declared_type(),
        intermediate in any::<bool>(),
        known_function in any::<bool>(),
    ) {
        let step =
            if intermediate { AggregationStep::Intermediate } else { AggregationStep::Partial };
        let name = if known_function { "sum" } else { "not_registered" };

        let mut builder = PlanBuilder::new();
        let x = builder.variable("x", PlanType::BigInt);
        let state = builder.variable("state", declared);
        let values = builder.values(vec![x.clone()]);
        let handle = FunctionHandle::new(name, vec![PlanType::BigInt.signature()]);
        let plan = builder.aggregation(
            values,
            vec![],
            vec![(state, Aggregation::new(handle, vec![x.into()]))],
            step,
        );

        prop_assert_eq!(validate(&plan, builder.types()), Ok(()));
    }

    #[test]
    fn final_aggregation_follows_rule(declared in arb_declared_type(), single in any::<bool>()) {
        let step = if single { AggregationStep::Single } else { AggregationStep::Final };

        let mut builder = PlanBuilder::new();
        let x = builder.variable("x", PlanType::BigInt);
        let total = builder.variable("total", declared.clone());
        let values = builder.values(vec![x.clone()]);
        let handle = FunctionHandle::new("sum", vec![PlanType::BigInt.signature()]);
        let plan = builder.aggregation(
            values,
            vec![],
            vec![(total, Aggregation::new(handle, vec![x.into()]))],
            step,
        );

        prop_assert_eq!(
            validate(&plan, builder.types()).is_ok(),
            accepts(&PlanType::BigInt, &declared)
        );
    }

    #[test]
    fn union_follows_rule(
        declared in arb_declared_type(),
        inputs in prop::collection::vec(arb_plan_type(), 1..4),
    ) {
        let mut builder = PlanBuilder::new();
        let output = builder.variable("out", declared.clone());
        let mut sources = Vec::new();
        let mut mapped = Vec::new();
        for (i, input) in inputs.iter().enumerate() {
            let variable = builder.variable(format!("in_{i}"), input.clone());
            sources.push(builder.values(vec![variable.clone()]));
            mapped.push(variable);
        }
        let plan = builder.union(sources, vec![(output, mapped)]);

        let expected = inputs.iter().all(|input| accepts(input, &declared));
        prop_assert_eq!(validate(&plan, builder.types()).is_ok(), expected);
    }

    #[test]
    fn validation_is_idempotent(source in arb_plan_type(), declared in arb_declared_type()) {
        let (plan, types) = project_plan(source, declared, Expr::symbol("x"));
        prop_assert_eq!(validate(&plan, &types), validate(&plan, &types));
    }
}
