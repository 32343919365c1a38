//! The checker seam and the sanity checker that runs a list of them.

use tracing::debug;

use super::config::PlanSanityConfig;
use super::error::SanityResult;
use super::single_output::VerifyOnlyOneOutputNode;
use super::type_validator::TypeValidator;
use super::unique_ids::NoDuplicatePlanNodeIds;
use crate::analyzer::ExpressionTypeInferencer;
use crate::metadata::TypeOracle;
use crate::plan::{PlanNode, TypeEnvironment};
use crate::session::Session;
use crate::warning::WarningCollector;

/// A single sanity check over a plan.
pub trait Checker: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Checks `plan`.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    fn validate(
        &self,
        plan: &PlanNode,
        session: &Session,
        oracle: &dyn TypeOracle,
        inferencer: &dyn ExpressionTypeInferencer,
        types: &TypeEnvironment,
        warnings: &mut WarningCollector,
    ) -> SanityResult<()>;
}

/// Runs the configured checkers over intermediate and final plans.
///
/// Intermediate plans are checked after each optimizer pass; final plans
/// additionally carry the structural checks that only hold once planning
/// is complete.
///
/// # Example
///
/// ```
/// use planguard_core::PlanType;
/// use planguard_query::analyzer::ExpressionAnalyzer;
/// use planguard_query::metadata::Metadata;
/// use planguard_query::plan::PlanBuilder;
/// use planguard_query::sanity::{PlanSanityChecker, PlanSanityConfig};
/// use planguard_query::{Session, WarningCollector};
///
/// let metadata = Metadata::with_builtins();
/// let analyzer = ExpressionAnalyzer::new(&metadata);
///
/// let mut builder = PlanBuilder::new();
/// let id = builder.variable("id", PlanType::BigInt);
/// let scan = builder.table_scan("orders", vec![id.clone()]);
/// let plan = builder.output(scan, vec![("id".to_string(), id)]);
///
/// let checker = PlanSanityChecker::new(&PlanSanityConfig::default());
/// let session = Session::new("query_1", "alice");
/// let mut warnings = WarningCollector::default();
/// checker
///     .validate_final_plan(&plan, &session, &metadata, &analyzer, builder.types(), &mut warnings)
///     .unwrap();
/// ```
pub struct PlanSanityChecker {
    intermediate: Vec<Box<dyn Checker>>,
    final_checkers: Vec<Box<dyn Checker>>,
}

impl PlanSanityChecker {
    /// Creates a checker with the checks enabled in `config`.
    #[must_use]
    pub fn new(config: &PlanSanityConfig) -> Self {
        let mut intermediate: Vec<Box<dyn Checker>> = Vec::new();
        let mut final_checkers: Vec<Box<dyn Checker>> = Vec::new();

        if config.validate_unique_node_ids {
            intermediate.push(Box::new(NoDuplicatePlanNodeIds));
            final_checkers.push(Box::new(NoDuplicatePlanNodeIds));
        }
        if config.validate_types {
            intermediate.push(Box::new(TypeValidator::new()));
            final_checkers.push(Box::new(TypeValidator::new()));
        }
        if config.validate_single_output {
            final_checkers.push(Box::new(VerifyOnlyOneOutputNode));
        }

        Self { intermediate, final_checkers }
    }

    /// Creates a checker from explicit checker lists.
    #[must_use]
    pub fn with_checkers(
        intermediate: Vec<Box<dyn Checker>>,
        final_checkers: Vec<Box<dyn Checker>>,
    ) -> Self {
        Self { intermediate, final_checkers }
    }

    /// Returns the names of the intermediate checkers, in run order.
    #[must_use]
    pub fn intermediate_checkers(&self) -> Vec<&'static str> {
        self.intermediate.iter().map(|checker| checker.name()).collect()
    }

    /// Returns the names of the final checkers, in run order.
    #[must_use]
    pub fn final_checkers(&self) -> Vec<&'static str> {
        self.final_checkers.iter().map(|checker| checker.name()).collect()
    }

    /// Runs the intermediate checkers.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate_intermediate_plan(
        &self,
        plan: &PlanNode,
        session: &Session,
        oracle: &dyn TypeOracle,
        inferencer: &dyn ExpressionTypeInferencer,
        types: &TypeEnvironment,
        warnings: &mut WarningCollector,
    ) -> SanityResult<()> {
        run_checkers(&self.intermediate, plan, session, oracle, inferencer, types, warnings)
    }

    /// Runs the final checkers.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate_final_plan(
        &self,
        plan: &PlanNode,
        session: &Session,
        oracle: &dyn TypeOracle,
        inferencer: &dyn ExpressionTypeInferencer,
        types: &TypeEnvironment,
        warnings: &mut WarningCollector,
    ) -> SanityResult<()> {
        run_checkers(&self.final_checkers, plan, session, oracle, inferencer, types, warnings)
    }
}

impl Default for PlanSanityChecker {
    fn default() -> Self {
        Self::new(&PlanSanityConfig::default())
    }
}

impl std::fmt::Debug for PlanSanityChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanSanityChecker")
            .field("intermediate", &self.intermediate_checkers())
            .field("final_checkers", &self.final_checkers())
            .finish()
    }
}

#[allow(clippy::too_many_arguments)]
fn run_checkers(
    checkers: &[Box<dyn Checker>],
    plan: &PlanNode,
    session: &Session,
    oracle: &dyn TypeOracle,
    inferencer: &dyn ExpressionTypeInferencer,
    types: &TypeEnvironment,
    warnings: &mut WarningCollector,
) -> SanityResult<()> {
    for checker in checkers {
        debug!(query_id = session.query_id(), checker = checker.name(), "running plan checker");
        checker.validate(plan, session, oracle, inferencer, types, warnings)?;
    }
    Ok(())
}
