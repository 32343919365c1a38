//! Plan builder.
//!
//! This module provides programmatic construction of plans with fresh
//! node ids and a type environment that records every declared variable.

use planguard_core::PlanType;

use crate::expr::Expr;

use super::node::PlanNode;
use super::relational::{
    Aggregation, AggregationNode, AggregationStep, Assignments, FilterNode, JoinNode, JoinType,
    LimitNode, Ordering, OutputNode, PlanNodeId, ProjectNode, SortNode, TableScanNode, UnionNode,
    ValuesNode, WindowFunction, WindowNode,
};
use super::variable::{TypeEnvironment, VariableReference};

/// Hands out sequential plan node ids.
#[derive(Debug, Clone, Default)]
pub struct PlanNodeIdAllocator {
    next_id: u64,
}

impl PlanNodeIdAllocator {
    /// Creates an allocator starting at `0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id.
    pub fn next_id(&mut self) -> PlanNodeId {
        let id = PlanNodeId::new(self.next_id.to_string());
        self.next_id += 1;
        id
    }
}

/// Builds plans bottom-up.
///
/// # Example
///
/// ```
/// use planguard_core::PlanType;
/// use planguard_query::plan::{Ordering, PlanBuilder};
///
/// let mut builder = PlanBuilder::new();
/// let name = builder.variable("name", PlanType::varchar(20));
/// let scan = builder.table_scan("users", vec![name.clone()]);
/// let sorted = builder.sort(scan, vec![Ordering::asc(name.clone())]);
/// let plan = builder.output(sorted, vec![("name".to_string(), name)]);
///
/// assert_eq!(plan.node_count(), 3);
/// assert!(builder.types().contains("name"));
/// ```
#[derive(Debug, Default)]
pub struct PlanBuilder {
    ids: PlanNodeIdAllocator,
    types: TypeEnvironment,
}

impl PlanBuilder {
    /// Creates a new plan builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a variable and records its type.
    pub fn variable(&mut self, name: impl Into<String>, data_type: PlanType) -> VariableReference {
        let variable = VariableReference::new(name, data_type);
        self.types.insert_variable(&variable);
        variable
    }

    /// Returns the types of all declared variables.
    #[must_use]
    pub fn types(&self) -> &TypeEnvironment {
        &self.types
    }

    /// Consumes the builder, returning the type environment.
    #[must_use]
    pub fn into_types(self) -> TypeEnvironment {
        self.types
    }

    /// Returns a fresh node id.
    pub fn next_id(&mut self) -> PlanNodeId {
        self.ids.next_id()
    }

    /// Scans a table, reading the column named after each variable.
    pub fn table_scan(
        &mut self,
        table: impl Into<String>,
        outputs: Vec<VariableReference>,
    ) -> PlanNode {
        let assignments = outputs
            .into_iter()
            .map(|variable| {
                let column = variable.name().to_string();
                (variable, column)
            })
            .collect();
        PlanNode::TableScan(TableScanNode::new(self.next_id(), table, assignments))
    }

    /// Inline values with no rows.
    pub fn values(&mut self, outputs: Vec<VariableReference>) -> PlanNode {
        PlanNode::Values(ValuesNode::new(self.next_id(), outputs))
    }

    /// Inline values with rows.
    pub fn values_with_rows(
        &mut self,
        outputs: Vec<VariableReference>,
        rows: Vec<Vec<Expr>>,
    ) -> PlanNode {
        PlanNode::Values(ValuesNode::new(self.next_id(), outputs).with_rows(rows))
    }

    /// Filters the source.
    pub fn filter(&mut self, source: PlanNode, predicate: Expr) -> PlanNode {
        PlanNode::Filter {
            node: FilterNode::new(self.next_id(), predicate),
            source: Box::new(source),
        }
    }

    /// Projects the source.
    pub fn project(&mut self, source: PlanNode, assignments: Assignments) -> PlanNode {
        PlanNode::Project {
            node: ProjectNode::new(self.next_id(), assignments),
            source: Box::new(source),
        }
    }

    /// Aggregates the source.
    pub fn aggregation(
        &mut self,
        source: PlanNode,
        group_by: Vec<VariableReference>,
        aggregations: Vec<(VariableReference, Aggregation)>,
        step: AggregationStep,
    ) -> PlanNode {
        PlanNode::Aggregation {
            node: Box::new(AggregationNode::new(self.next_id(), group_by, aggregations, step)),
            source: Box::new(source),
        }
    }

    /// Computes window functions over the source.
    pub fn window(
        &mut self,
        source: PlanNode,
        partition_by: Vec<VariableReference>,
        order_by: Vec<Ordering>,
        functions: Vec<(VariableReference, WindowFunction)>,
    ) -> PlanNode {
        PlanNode::Window {
            node: Box::new(WindowNode::new(self.next_id(), partition_by, order_by, functions)),
            source: Box::new(source),
        }
    }

    /// Sorts the source.
    pub fn sort(&mut self, source: PlanNode, order_by: Vec<Ordering>) -> PlanNode {
        PlanNode::Sort { node: SortNode::new(self.next_id(), order_by), source: Box::new(source) }
    }

    /// Limits the source.
    pub fn limit(&mut self, source: PlanNode, count: u64) -> PlanNode {
        PlanNode::Limit { node: LimitNode::new(self.next_id(), count), source: Box::new(source) }
    }

    /// Joins two sources. The outputs are the left outputs followed by the
    /// right outputs.
    pub fn join(
        &mut self,
        left: PlanNode,
        right: PlanNode,
        join_type: JoinType,
        criteria: Vec<(VariableReference, VariableReference)>,
    ) -> PlanNode {
        let outputs = left
            .output_variables()
            .into_iter()
            .chain(right.output_variables())
            .cloned()
            .collect();
        PlanNode::Join {
            node: Box::new(JoinNode::new(self.next_id(), join_type, criteria, outputs)),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Unions the sources.
    pub fn union(
        &mut self,
        sources: Vec<PlanNode>,
        variable_mapping: Vec<(VariableReference, Vec<VariableReference>)>,
    ) -> PlanNode {
        PlanNode::Union { node: UnionNode::new(self.next_id(), variable_mapping), sources }
    }

    /// Adds the output root.
    pub fn output(
        &mut self,
        source: PlanNode,
        columns: Vec<(String, VariableReference)>,
    ) -> PlanNode {
        let (column_names, outputs) = columns.into_iter().unzip();
        PlanNode::Output {
            node: OutputNode::new(self.next_id(), column_names, outputs),
            source: Box::new(source),
        }
    }
}
