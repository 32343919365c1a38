//! Plan node id uniqueness.

use std::collections::HashSet;

use super::checker::Checker;
use super::error::{SanityError, SanityResult};
use crate::analyzer::ExpressionTypeInferencer;
use crate::metadata::TypeOracle;
use crate::plan::{PlanNode, PlanNodeId, TypeEnvironment};
use crate::session::Session;
use crate::warning::WarningCollector;

/// Rejects plans in which two nodes share an id.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDuplicatePlanNodeIds;

impl NoDuplicatePlanNodeIds {
    /// Checks `plan` for repeated node ids.
    ///
    /// # Errors
    ///
    /// Returns [`SanityError::DuplicatePlanNodeId`] for the first repeat
    /// found in pre-order.
    pub fn check(plan: &PlanNode) -> SanityResult<()> {
        fn collect<'p>(plan: &'p PlanNode, seen: &mut HashSet<&'p PlanNodeId>) -> SanityResult<()> {
            if !seen.insert(plan.id()) {
                return Err(SanityError::DuplicatePlanNodeId { id: plan.id().clone() });
            }
            for source in plan.sources() {
                collect(source, seen)?;
            }
            Ok(())
        }

        collect(plan, &mut HashSet::new())
    }
}

impl Checker for NoDuplicatePlanNodeIds {
    fn name(&self) -> &'static str {
        "NoDuplicatePlanNodeIds"
    }

    fn validate(
        &self,
        plan: &PlanNode,
        _session: &Session,
        _oracle: &dyn TypeOracle,
        _inferencer: &dyn ExpressionTypeInferencer,
        _types: &TypeEnvironment,
        _warnings: &mut WarningCollector,
    ) -> SanityResult<()> {
        Self::check(plan)
    }
}
