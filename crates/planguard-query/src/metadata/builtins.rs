//! Built-in functions.

use planguard_core::PlanType;

use super::function::FunctionMetadata;
use super::registry::FunctionRegistry;

/// Types every generic built-in (`count`, `lag`, ...) is registered for.
fn value_types() -> Vec<PlanType> {
    vec![
        PlanType::Boolean,
        PlanType::TinyInt,
        PlanType::SmallInt,
        PlanType::Integer,
        PlanType::BigInt,
        PlanType::Real,
        PlanType::Double,
        PlanType::unbounded_varchar(),
        PlanType::Varbinary,
        PlanType::Date,
        PlanType::Time,
        PlanType::Timestamp,
        PlanType::Json,
    ]
}

/// Types `min` and `max` are registered for.
fn orderable_types() -> Vec<PlanType> {
    value_types()
        .into_iter()
        .filter(|ty| !matches!(ty, PlanType::Varbinary | PlanType::Json))
        .collect()
}

/// Registers all built-in functions.
pub(crate) fn register_builtins(registry: &mut FunctionRegistry) {
    register_aggregates(registry);
    register_window_functions(registry);
    register_scalars(registry);
}

fn register_aggregates(registry: &mut FunctionRegistry) {
    use PlanType::{BigInt, Boolean, Double, Real};

    registry.register(FunctionMetadata::aggregate("count", &[], &BigInt));
    for ty in value_types() {
        registry.register(FunctionMetadata::aggregate("count", &[ty.clone()], &BigInt));
        registry.register(FunctionMetadata::aggregate("approx_distinct", &[ty.clone()], &BigInt));
        registry.register(FunctionMetadata::aggregate("arbitrary", &[ty.clone()], &ty));
    }
    for ty in orderable_types() {
        registry.register(FunctionMetadata::aggregate("min", &[ty.clone()], &ty));
        registry.register(FunctionMetadata::aggregate("max", &[ty.clone()], &ty));
    }

    registry.register(FunctionMetadata::aggregate("sum", &[BigInt], &BigInt));
    registry.register(FunctionMetadata::aggregate("sum", &[Real], &Real));
    registry.register(FunctionMetadata::aggregate("sum", &[Double], &Double));

    registry.register(FunctionMetadata::aggregate("avg", &[BigInt], &Double));
    registry.register(FunctionMetadata::aggregate("avg", &[Real], &Real));
    registry.register(FunctionMetadata::aggregate("avg", &[Double], &Double));

    registry.register(FunctionMetadata::aggregate("count_if", &[Boolean], &BigInt));
    registry.register(FunctionMetadata::aggregate("bool_and", &[Boolean], &Boolean));
    registry.register(FunctionMetadata::aggregate("bool_or", &[Boolean], &Boolean));
    registry.register(FunctionMetadata::aggregate("stddev", &[Double], &Double));
    registry.register(FunctionMetadata::aggregate("variance", &[Double], &Double));
}

fn register_window_functions(registry: &mut FunctionRegistry) {
    use PlanType::{BigInt, Double};

    registry.register(FunctionMetadata::window("row_number", &[], &BigInt));
    registry.register(FunctionMetadata::window("rank", &[], &BigInt));
    registry.register(FunctionMetadata::window("dense_rank", &[], &BigInt));
    registry.register(FunctionMetadata::window("percent_rank", &[], &Double));
    registry.register(FunctionMetadata::window("cume_dist", &[], &Double));
    registry.register(FunctionMetadata::window("ntile", &[BigInt], &BigInt));

    for ty in value_types() {
        registry.register(FunctionMetadata::window("first_value", &[ty.clone()], &ty));
        registry.register(FunctionMetadata::window("last_value", &[ty.clone()], &ty));
        registry.register(FunctionMetadata::window("lag", &[ty.clone()], &ty));
        registry.register(FunctionMetadata::window("lead", &[ty.clone()], &ty));
    }
}

fn register_scalars(registry: &mut FunctionRegistry) {
    use PlanType::{BigInt, Double, Integer, Real, Timestamp};
    let varchar = PlanType::unbounded_varchar();

    for ty in [Integer, BigInt, Real, Double] {
        registry.register(FunctionMetadata::scalar("abs", &[ty.clone()], &ty));
    }
    registry.register(FunctionMetadata::scalar("round", &[Double], &Double));
    registry.register(FunctionMetadata::scalar("floor", &[Double], &Double));
    registry.register(FunctionMetadata::scalar("ceil", &[Double], &Double));

    registry.register(FunctionMetadata::scalar("lower", &[varchar.clone()], &varchar));
    registry.register(FunctionMetadata::scalar("upper", &[varchar.clone()], &varchar));
    registry.register(FunctionMetadata::scalar("trim", &[varchar.clone()], &varchar));
    registry.register(FunctionMetadata::scalar("length", &[varchar.clone()], &BigInt));
    registry.register(FunctionMetadata::scalar(
        "concat",
        &[varchar.clone(), varchar.clone()],
        &varchar,
    ));
    registry.register(FunctionMetadata::scalar("substr", &[varchar.clone(), BigInt], &varchar));

    registry.register(FunctionMetadata::scalar("now", &[], &Timestamp).nondeterministic());
    registry.register(FunctionMetadata::scalar("random", &[], &Double).nondeterministic());
    registry.register(
        FunctionMetadata::scalar("rand", &[], &Double)
            .nondeterministic()
            .deprecated("use random() instead"),
    );
}
