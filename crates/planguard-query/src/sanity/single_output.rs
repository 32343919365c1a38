//! Output node placement for final plans.

use super::checker::Checker;
use super::error::{SanityError, SanityResult};
use crate::analyzer::ExpressionTypeInferencer;
use crate::metadata::TypeOracle;
use crate::plan::{PlanNode, TypeEnvironment};
use crate::session::Session;
use crate::warning::WarningCollector;

/// Requires a final plan to have exactly one `Output` node, at the root.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifyOnlyOneOutputNode;

impl VerifyOnlyOneOutputNode {
    /// Checks the placement of `Output` nodes in `plan`.
    ///
    /// # Errors
    ///
    /// Returns [`SanityError::InvalidOutputNode`] if the root is not an
    /// `Output` node or another `Output` node appears below it.
    pub fn check(plan: &PlanNode) -> SanityResult<()> {
        fn count_outputs(plan: &PlanNode) -> usize {
            usize::from(matches!(plan, PlanNode::Output { .. }))
                + plan.sources().into_iter().map(count_outputs).sum::<usize>()
        }

        if !matches!(plan, PlanNode::Output { .. }) {
            return Err(SanityError::InvalidOutputNode(format!(
                "plan root {}[{}] is not an output node",
                plan.node_type(),
                plan.id()
            )));
        }

        let outputs = count_outputs(plan);
        if outputs > 1 {
            return Err(SanityError::InvalidOutputNode(format!(
                "expected one output node, found {outputs}"
            )));
        }
        Ok(())
    }
}

impl Checker for VerifyOnlyOneOutputNode {
    fn name(&self) -> &'static str {
        "VerifyOnlyOneOutputNode"
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

#[cfg(test)]
mod tests {
    use planguard_core::PlanType;

    use super::*;
    use crate::plan::PlanBuilder;

    #[test]
    fn single_root_output() {
        let mut builder = PlanBuilder::new();
        let a = builder.variable("a", PlanType::BigInt);
        let values = builder.values(vec![a.clone()]);
        let plan = builder.output(values, vec![("a".to_string(), a)]);

        assert!(VerifyOnlyOneOutputNode::check(&plan).is_ok());
    }

    #[test]
    fn missing_root_output() {
        let mut builder = PlanBuilder::new();
        let a = builder.variable("a", PlanType::BigInt);
        let plan = builder.values(vec![a]);

        let err = VerifyOnlyOneOutputNode::check(&plan).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid output node: plan root Values[0] is not an output node"
        );
    }

    #[test]
    fn nested_output() {
        let mut builder = PlanBuilder::new();
        let a = builder.variable("a", PlanType::BigInt);
        let values = builder.values(vec![a.clone()]);
        let inner = builder.output(values, vec![("a".to_string(), a.clone())]);
        let plan = builder.output(inner, vec![("a".to_string(), a)]);

        assert_eq!(
            VerifyOnlyOneOutputNode::check(&plan),
            Err(SanityError::InvalidOutputNode("expected one output node, found 2".to_string()))
        );
    }
}
