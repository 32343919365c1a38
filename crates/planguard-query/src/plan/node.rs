//! Plan node.
//!
//! This module defines the `PlanNode` enum that represents the tree
//! structure of a compiled query plan.

// Allow matching arms with identical bodies - intentional for grouping
#![allow(clippy::match_same_arms)]
// Allow missing_const_for_fn - const fn with Vec isn't stable
#![allow(clippy::missing_const_for_fn)]
// Allow unused_self in helper methods
#![allow(clippy::unused_self)]

use std::fmt;

use super::relational::{
    AggregationNode, FilterNode, JoinNode, LimitNode, OutputNode, PlanNodeId, ProjectNode,
    SortNode, TableScanNode, UnionNode, ValuesNode, WindowNode,
};
use super::variable::VariableReference;

/// A compiled query plan.
///
/// This is a tree structure where each node represents an operation and
/// its sources are the inputs to that operation. Large node types are
/// boxed to keep the enum small.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanNode {
    // ========== Leaf Nodes (no inputs) ==========
    /// Table scan.
    TableScan(TableScanNode),

    /// Inline values.
    Values(ValuesNode),

    // ========== Unary Nodes (single input) ==========
    /// Filter.
    Filter {
        /// The filter node.
        node: FilterNode,
        /// The input plan.
        source: Box<PlanNode>,
    },

    /// Projection.
    Project {
        /// The project node.
        node: ProjectNode,
        /// The input plan.
        source: Box<PlanNode>,
    },

    /// Aggregation.
    Aggregation {
        /// The aggregation node.
        node: Box<AggregationNode>,
        /// The input plan.
        source: Box<PlanNode>,
    },

    /// Window functions.
    Window {
        /// The window node.
        node: Box<WindowNode>,
        /// The input plan.
        source: Box<PlanNode>,
    },

    /// Sort.
    Sort {
        /// The sort node.
        node: SortNode,
        /// The input plan.
        source: Box<PlanNode>,
    },

    /// Limit.
    Limit {
        /// The limit node.
        node: LimitNode,
        /// The input plan.
        source: Box<PlanNode>,
    },

    /// Result output, the root of a final plan.
    Output {
        /// The output node.
        node: OutputNode,
        /// The input plan.
        source: Box<PlanNode>,
    },

    // ========== Binary Nodes (two inputs) ==========
    /// Join.
    Join {
        /// The join node.
        node: Box<JoinNode>,
        /// The left input.
        left: Box<PlanNode>,
        /// The right input.
        right: Box<PlanNode>,
    },

    // ========== N-ary Nodes (multiple inputs) ==========
    /// Union all.
    Union {
        /// The union node.
        node: UnionNode,
        /// The inputs, one per branch.
        sources: Vec<PlanNode>,
    },
}

impl PlanNode {
    /// Returns the id of this node.
    #[must_use]
    pub fn id(&self) -> &PlanNodeId {
        match self {
            Self::TableScan(node) => &node.id,
            Self::Values(node) => &node.id,
            Self::Filter { node, .. } => &node.id,
            Self::Project { node, .. } => &node.id,
            Self::Aggregation { node, .. } => &node.id,
            Self::Window { node, .. } => &node.id,
            Self::Sort { node, .. } => &node.id,
            Self::Limit { node, .. } => &node.id,
            Self::Output { node, .. } => &node.id,
            Self::Join { node, .. } => &node.id,
            Self::Union { node, .. } => &node.id,
        }
    }

    /// Returns the inputs of this node.
    #[must_use]
    pub fn sources(&self) -> Vec<&PlanNode> {
        match self {
            // Leaf nodes
            Self::TableScan(_) | Self::Values(_) => vec![],

            // Unary nodes
            Self::Filter { source, .. }
            | Self::Project { source, .. }
            | Self::Aggregation { source, .. }
            | Self::Window { source, .. }
            | Self::Sort { source, .. }
            | Self::Limit { source, .. }
            | Self::Output { source, .. } => vec![source.as_ref()],

            // Binary nodes
            Self::Join { left, right, .. } => vec![left.as_ref(), right.as_ref()],

            // N-ary nodes
            Self::Union { sources, .. } => sources.iter().collect(),
        }
    }

    /// Returns the variables this node produces, in order.
    #[must_use]
    pub fn output_variables(&self) -> Vec<&VariableReference> {
        match self {
            Self::TableScan(node) => node.outputs(),
            Self::Values(node) => node.outputs.iter().collect(),
            Self::Filter { source, .. }
            | Self::Sort { source, .. }
            | Self::Limit { source, .. } => source.output_variables(),
            Self::Project { node, .. } => node.assignments.outputs(),
            Self::Aggregation { node, .. } => node
                .group_by
                .iter()
                .chain(node.aggregations.iter().map(|(variable, _)| variable))
                .collect(),
            Self::Window { node, source } => {
                let mut outputs = source.output_variables();
                outputs.extend(node.functions.iter().map(|(variable, _)| variable));
                outputs
            }
            Self::Output { node, .. } => node.outputs.iter().collect(),
            Self::Join { node, .. } => node.outputs.iter().collect(),
            Self::Union { node, .. } => node.outputs(),
        }
    }

    /// Returns true if this is a leaf node.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::TableScan(_) | Self::Values(_))
    }

    /// Returns the node type name (for display/debugging).
    #[must_use]
    pub fn node_type(&self) -> &'static str {
        match self {
            Self::TableScan(_) => "TableScan",
            Self::Values(_) => "Values",
            Self::Filter { .. } => "Filter",
            Self::Project { .. } => "Project",
            Self::Aggregation { .. } => "Aggregation",
            Self::Window { .. } => "Window",
            Self::Sort { .. } => "Sort",
            Self::Limit { .. } => "Limit",
            Self::Output { .. } => "Output",
            Self::Join { .. } => "Join",
            Self::Union { .. } => "Union",
        }
    }

    /// Returns the number of nodes in this plan.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.sources().iter().map(|source| source.node_count()).sum::<usize>()
    }

    /// Pretty prints the plan as a tree.
    #[must_use]
    pub fn display_tree(&self) -> DisplayTree<'_> {
        DisplayTree { plan: self }
    }
}

impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_tree())
    }
}

/// Helper for tree-style plan display.
pub struct DisplayTree<'a> {
    plan: &'a PlanNode,
}

impl fmt::Display for DisplayTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.plan, "", true)
    }
}

impl DisplayTree<'_> {
    fn fmt_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        plan: &PlanNode,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let connector = if is_last { "└── " } else { "├── " };

        write!(f, "{prefix}{connector}")?;
        self.fmt_node_content(f, plan)?;
        writeln!(f)?;

        let sources = plan.sources();
        let new_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });

        for (i, source) in sources.iter().enumerate() {
            self.fmt_node(f, source, &new_prefix, i == sources.len() - 1)?;
        }

        Ok(())
    }

    fn fmt_node_content(&self, f: &mut fmt::Formatter<'_>, plan: &PlanNode) -> fmt::Result {
        write!(f, "{}[{}]", plan.node_type(), plan.id())?;
        match plan {
            PlanNode::TableScan(node) => {
                write!(f, ": {}", node.table)?;
            }
            PlanNode::Values(node) => {
                write!(f, ": {} rows", node.rows.len())?;
            }
            PlanNode::Filter { node, .. } => {
                write!(f, ": {}", node.predicate)?;
            }
            PlanNode::Project { node, .. } => {
                write!(f, ": ")?;
                for (i, (variable, expr)) in node.assignments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{variable} := {expr}")?;
                }
            }
            PlanNode::Aggregation { node, .. } => {
                write!(f, " {}: ", node.step)?;
                for (i, (variable, aggregation)) in node.aggregations.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{variable} := {aggregation}")?;
                }
                if !node.group_by.is_empty() {
                    write!(f, " GROUP BY ")?;
                    write_list(f, &node.group_by)?;
                }
            }
            PlanNode::Window { node, .. } => {
                write!(f, ": ")?;
                for (i, (variable, function)) in node.functions.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{variable} := {} {}", function.call, function.frame)?;
                }
                if !node.partition_by.is_empty() {
                    write!(f, " PARTITION BY ")?;
                    write_list(f, &node.partition_by)?;
                }
                if !node.order_by.is_empty() {
                    write!(f, " ORDER BY ")?;
                    write_list(f, &node.order_by)?;
                }
            }
            PlanNode::Sort { node, .. } => {
                write!(f, ": ")?;
                write_list(f, &node.order_by)?;
            }
            PlanNode::Limit { node, .. } => {
                write!(f, ": {}", node.count)?;
            }
            PlanNode::Output { node, .. } => {
                write!(f, ": ")?;
                write_list(f, &node.column_names)?;
            }
            PlanNode::Join { node, .. } => {
                write!(f, " {}", node.join_type)?;
                for (i, (left, right)) in node.criteria.iter().enumerate() {
                    write!(f, "{}{left} = {right}", if i == 0 { ": " } else { " AND " })?;
                }
                if let Some(filter) = &node.filter {
                    write!(f, " [filter: {filter}]")?;
                }
            }
            PlanNode::Union { node, .. } => {
                write!(f, ": ")?;
                for (i, (output, inputs)) in node.variable_mapping.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{output} := (")?;
                    write_list(f, inputs)?;
                    write!(f, ")")?;
                }
            }
        }
        Ok(())
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use planguard_core::PlanType;

    use super::*;
    use crate::expr::Expr;
    use crate::plan::Assignments;

    fn var(name: &str) -> VariableReference {
        VariableReference::new(name, PlanType::BigInt)
    }

    fn values(id: &str, outputs: Vec<VariableReference>) -> PlanNode {
        PlanNode::Values(ValuesNode::new(PlanNodeId::new(id), outputs))
    }

    #[test]
    fn sources_and_outputs() {
        let plan = PlanNode::Filter {
            node: FilterNode::new(PlanNodeId::new("1"), Expr::boolean(true)),
            source: Box::new(values("0", vec![var("a"), var("b")])),
        };

        assert_eq!(plan.sources().len(), 1);
        assert_eq!(plan.output_variables(), vec![&var("a"), &var("b")]);
        assert_eq!(plan.id().as_str(), "1");
        assert_eq!(plan.node_type(), "Filter");
        assert_eq!(plan.node_count(), 2);
        assert!(!plan.is_leaf());
    }

    #[test]
    fn union_sources() {
        let plan = PlanNode::Union {
            node: UnionNode::new(
                PlanNodeId::new("2"),
                vec![(var("u"), vec![var("a"), var("b")])],
            ),
            sources: vec![values("0", vec![var("a")]), values("1", vec![var("b")])],
        };

        assert_eq!(plan.sources().len(), 2);
        assert_eq!(plan.output_variables(), vec![&var("u")]);
    }

    #[test]
    fn display_tree() {
        let plan = PlanNode::Project {
            node: ProjectNode::new(
                PlanNodeId::new("1"),
                Assignments::new().with(var("c"), Expr::symbol("a").add(Expr::long(1))),
            ),
            source: Box::new(values("0", vec![var("a")])),
        };

        let output = plan.display_tree().to_string();
        assert!(output.contains("Project[1]: c := "));
        assert!(output.contains("└── Values[0]: 0 rows"));
    }
}
