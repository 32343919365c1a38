//! Relational plan nodes.
//!
//! Each node struct carries its [`PlanNodeId`] and the node-local payload.
//! Children live in [`PlanNode`](super::PlanNode).

// Allow missing_const_for_fn - const fn with Vec isn't stable
#![allow(clippy::missing_const_for_fn)]

use std::fmt;

use crate::expr::{CallExpression, Expr, RowExpression};
use crate::metadata::FunctionHandle;

use super::variable::VariableReference;

/// Identifier of a plan node, unique within a plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlanNodeId(String);

impl PlanNodeId {
    /// Creates an id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlanNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reads rows from a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableScanNode {
    /// Node id.
    pub id: PlanNodeId,
    /// Table name.
    pub table: String,
    /// Output variables with the column each one reads.
    pub assignments: Vec<(VariableReference, String)>,
}

impl TableScanNode {
    /// Creates a table scan.
    #[must_use]
    pub fn new(
        id: PlanNodeId,
        table: impl Into<String>,
        assignments: Vec<(VariableReference, String)>,
    ) -> Self {
        Self { id, table: table.into(), assignments }
    }

    /// Returns the output variables.
    #[must_use]
    pub fn outputs(&self) -> Vec<&VariableReference> {
        self.assignments.iter().map(|(variable, _)| variable).collect()
    }
}

/// Literal rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuesNode {
    /// Node id.
    pub id: PlanNodeId,
    /// Output variables.
    pub outputs: Vec<VariableReference>,
    /// Rows, each with one expression per output.
    pub rows: Vec<Vec<Expr>>,
}

impl ValuesNode {
    /// Creates a values node with no rows.
    #[must_use]
    pub fn new(id: PlanNodeId, outputs: Vec<VariableReference>) -> Self {
        Self { id, outputs, rows: Vec::new() }
    }

    /// Sets the rows.
    #[must_use]
    pub fn with_rows(mut self, rows: Vec<Vec<Expr>>) -> Self {
        self.rows = rows;
        self
    }
}

/// Keeps the rows matching a predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterNode {
    /// Node id.
    pub id: PlanNodeId,
    /// The predicate.
    pub predicate: Expr,
}

impl FilterNode {
    /// Creates a filter node.
    #[must_use]
    pub fn new(id: PlanNodeId, predicate: Expr) -> Self {
        Self { id, predicate }
    }
}

/// Ordered `variable := expression` bindings of a projection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignments {
    entries: Vec<(VariableReference, Expr)>,
}

impl Assignments {
    /// Creates empty assignments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates identity assignments that pass each variable through.
    #[must_use]
    pub fn identity<'a>(variables: impl IntoIterator<Item = &'a VariableReference>) -> Self {
        variables
            .into_iter()
            .map(|variable| (variable.clone(), Expr::symbol(variable.name())))
            .collect()
    }

    /// Adds a binding.
    #[must_use]
    pub fn with(mut self, variable: VariableReference, expr: Expr) -> Self {
        self.put(variable, expr);
        self
    }

    /// Adds a binding in place.
    pub fn put(&mut self, variable: VariableReference, expr: Expr) {
        self.entries.push((variable, expr));
    }

    /// Iterates the bindings in order.
    pub fn iter(&self) -> impl Iterator<Item = (&VariableReference, &Expr)> {
        self.entries.iter().map(|(variable, expr)| (variable, expr))
    }

    /// Returns the bound variables in order.
    #[must_use]
    pub fn outputs(&self) -> Vec<&VariableReference> {
        self.entries.iter().map(|(variable, _)| variable).collect()
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(VariableReference, Expr)> for Assignments {
    fn from_iter<I: IntoIterator<Item = (VariableReference, Expr)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

/// Computes one output column per assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectNode {
    /// Node id.
    pub id: PlanNodeId,
    /// The bindings.
    pub assignments: Assignments,
}

impl ProjectNode {
    /// Creates a project node.
    #[must_use]
    pub fn new(id: PlanNodeId, assignments: Assignments) -> Self {
        Self { id, assignments }
    }
}

/// Which phase of a split aggregation a node performs.
///
/// A single-phase aggregation is `Single`. A split aggregation runs
/// `Partial`, then zero or more `Intermediate`, then `Final`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationStep {
    /// Raw input to partial state.
    Partial,
    /// Partial state to partial state.
    Intermediate,
    /// Partial state to final value.
    Final,
    /// Raw input to final value.
    Single,
}

impl AggregationStep {
    /// Returns true if this step emits final values.
    #[must_use]
    pub fn is_output_final(self) -> bool {
        matches!(self, Self::Final | Self::Single)
    }
}

impl fmt::Display for AggregationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Partial => write!(f, "PARTIAL"),
            Self::Intermediate => write!(f, "INTERMEDIATE"),
            Self::Final => write!(f, "FINAL"),
            Self::Single => write!(f, "SINGLE"),
        }
    }
}

/// One aggregate call of an aggregation node.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// The resolved aggregate function.
    pub function_handle: FunctionHandle,
    /// Typed arguments.
    pub arguments: Vec<RowExpression>,
    /// Whether only distinct argument values are aggregated.
    pub distinct: bool,
    /// Optional boolean variable masking the input rows.
    pub mask: Option<VariableReference>,
}

impl Aggregation {
    /// Creates an aggregation.
    #[must_use]
    pub fn new(function_handle: FunctionHandle, arguments: Vec<RowExpression>) -> Self {
        Self { function_handle, arguments, distinct: false, mask: None }
    }

    /// Aggregates distinct values only.
    #[must_use]
    pub fn with_distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Sets the mask variable.
    #[must_use]
    pub fn with_mask(mut self, mask: VariableReference) -> Self {
        self.mask = Some(mask);
        self
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function_handle.name())?;
        if self.distinct {
            write!(f, "DISTINCT ")?;
        }
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")?;
        if let Some(mask) = &self.mask {
            write!(f, " FILTER ({mask})")?;
        }
        Ok(())
    }
}

/// Groups rows and computes aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationNode {
    /// Node id.
    pub id: PlanNodeId,
    /// Grouping keys.
    pub group_by: Vec<VariableReference>,
    /// Output variable and aggregate call, in order.
    pub aggregations: Vec<(VariableReference, Aggregation)>,
    /// The phase this node performs.
    pub step: AggregationStep,
}

impl AggregationNode {
    /// Creates an aggregation node.
    #[must_use]
    pub fn new(
        id: PlanNodeId,
        group_by: Vec<VariableReference>,
        aggregations: Vec<(VariableReference, Aggregation)>,
        step: AggregationStep,
    ) -> Self {
        Self { id, group_by, aggregations, step }
    }
}

/// Window frame units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameUnits {
    /// Physical row offsets.
    Rows,
    /// Logical ranges of ordering values.
    Range,
}

/// A window frame boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameBound {
    /// `UNBOUNDED PRECEDING`.
    UnboundedPreceding,
    /// `n PRECEDING`.
    Preceding(u64),
    /// `CURRENT ROW`.
    CurrentRow,
    /// `n FOLLOWING`.
    Following(u64),
    /// `UNBOUNDED FOLLOWING`.
    UnboundedFollowing,
}

impl fmt::Display for FrameBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundedPreceding => write!(f, "UNBOUNDED PRECEDING"),
            Self::Preceding(n) => write!(f, "{n} PRECEDING"),
            Self::CurrentRow => write!(f, "CURRENT ROW"),
            Self::Following(n) => write!(f, "{n} FOLLOWING"),
            Self::UnboundedFollowing => write!(f, "UNBOUNDED FOLLOWING"),
        }
    }
}

/// A window frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowFrame {
    /// Frame units.
    pub units: FrameUnits,
    /// Start boundary.
    pub start: FrameBound,
    /// End boundary.
    pub end: FrameBound,
}

impl Default for WindowFrame {
    /// `RANGE BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW`.
    fn default() -> Self {
        Self {
            units: FrameUnits::Range,
            start: FrameBound::UnboundedPreceding,
            end: FrameBound::CurrentRow,
        }
    }
}

impl fmt::Display for WindowFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = match self.units {
            FrameUnits::Rows => "ROWS",
            FrameUnits::Range => "RANGE",
        };
        write!(f, "{units} BETWEEN {} AND {}", self.start, self.end)
    }
}

/// One window function of a window node.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowFunction {
    /// The resolved function.
    pub function_handle: FunctionHandle,
    /// The call, carrying its own return type.
    pub call: CallExpression,
    /// The frame.
    pub frame: WindowFrame,
}

impl WindowFunction {
    /// Creates a window function with the default frame.
    #[must_use]
    pub fn new(function_handle: FunctionHandle, call: CallExpression) -> Self {
        Self { function_handle, call, frame: WindowFrame::default() }
    }

    /// Sets the frame.
    #[must_use]
    pub fn with_frame(mut self, frame: WindowFrame) -> Self {
        self.frame = frame;
        self
    }
}

/// Sort direction of an ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Ascending, nulls last.
    AscNullsLast,
    /// Ascending, nulls first.
    AscNullsFirst,
    /// Descending, nulls last.
    DescNullsLast,
    /// Descending, nulls first.
    DescNullsFirst,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AscNullsLast => write!(f, "ASC NULLS LAST"),
            Self::AscNullsFirst => write!(f, "ASC NULLS FIRST"),
            Self::DescNullsLast => write!(f, "DESC NULLS LAST"),
            Self::DescNullsFirst => write!(f, "DESC NULLS FIRST"),
        }
    }
}

/// An ordering key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ordering {
    /// The variable to order by.
    pub variable: VariableReference,
    /// The direction.
    pub order: SortOrder,
}

impl Ordering {
    /// Orders ascending, nulls last.
    #[must_use]
    pub fn asc(variable: VariableReference) -> Self {
        Self { variable, order: SortOrder::AscNullsLast }
    }

    /// Orders descending, nulls last.
    #[must_use]
    pub fn desc(variable: VariableReference) -> Self {
        Self { variable, order: SortOrder::DescNullsLast }
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.variable, self.order)
    }
}

/// Computes window functions over partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowNode {
    /// Node id.
    pub id: PlanNodeId,
    /// Partition keys.
    pub partition_by: Vec<VariableReference>,
    /// Ordering within each partition.
    pub order_by: Vec<Ordering>,
    /// Output variable and window function, in order.
    pub functions: Vec<(VariableReference, WindowFunction)>,
}

impl WindowNode {
    /// Creates a window node.
    #[must_use]
    pub fn new(
        id: PlanNodeId,
        partition_by: Vec<VariableReference>,
        order_by: Vec<Ordering>,
        functions: Vec<(VariableReference, WindowFunction)>,
    ) -> Self {
        Self { id, partition_by, order_by, functions }
    }
}

/// Sorts rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SortNode {
    /// Node id.
    pub id: PlanNodeId,
    /// Ordering keys.
    pub order_by: Vec<Ordering>,
}

impl SortNode {
    /// Creates a sort node.
    #[must_use]
    pub fn new(id: PlanNodeId, order_by: Vec<Ordering>) -> Self {
        Self { id, order_by }
    }
}

/// Keeps at most `count` rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitNode {
    /// Node id.
    pub id: PlanNodeId,
    /// Maximum number of rows.
    pub count: u64,
}

impl LimitNode {
    /// Creates a limit node.
    #[must_use]
    pub fn new(id: PlanNodeId, count: u64) -> Self {
        Self { id, count }
    }
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    /// Inner join.
    Inner,
    /// Left outer join.
    Left,
    /// Right outer join.
    Right,
    /// Full outer join.
    Full,
    /// Cross join.
    Cross,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inner => write!(f, "INNER"),
            Self::Left => write!(f, "LEFT"),
            Self::Right => write!(f, "RIGHT"),
            Self::Full => write!(f, "FULL"),
            Self::Cross => write!(f, "CROSS"),
        }
    }
}

/// Joins two inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinNode {
    /// Node id.
    pub id: PlanNodeId,
    /// Join type.
    pub join_type: JoinType,
    /// Equi-join key pairs (left, right).
    pub criteria: Vec<(VariableReference, VariableReference)>,
    /// Residual join filter.
    pub filter: Option<Expr>,
    /// Output variables.
    pub outputs: Vec<VariableReference>,
}

impl JoinNode {
    /// Creates a join node.
    #[must_use]
    pub fn new(
        id: PlanNodeId,
        join_type: JoinType,
        criteria: Vec<(VariableReference, VariableReference)>,
        outputs: Vec<VariableReference>,
    ) -> Self {
        Self { id, join_type, criteria, filter: None, outputs }
    }

    /// Sets the residual filter.
    #[must_use]
    pub fn with_filter(mut self, filter: Expr) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// `UNION ALL` of several inputs.
///
/// Each output variable maps to one input variable per source, in source
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionNode {
    /// Node id.
    pub id: PlanNodeId,
    /// Output variable and the input variables feeding it.
    pub variable_mapping: Vec<(VariableReference, Vec<VariableReference>)>,
}

impl UnionNode {
    /// Creates a union node.
    #[must_use]
    pub fn new(
        id: PlanNodeId,
        variable_mapping: Vec<(VariableReference, Vec<VariableReference>)>,
    ) -> Self {
        Self { id, variable_mapping }
    }

    /// Returns the output variables.
    #[must_use]
    pub fn outputs(&self) -> Vec<&VariableReference> {
        self.variable_mapping.iter().map(|(output, _)| output).collect()
    }
}

/// The plan root, naming the result columns.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputNode {
    /// Node id.
    pub id: PlanNodeId,
    /// Result column names.
    pub column_names: Vec<String>,
    /// Variables providing each column.
    pub outputs: Vec<VariableReference>,
}

impl OutputNode {
    /// Creates an output node.
    #[must_use]
    pub fn new(id: PlanNodeId, column_names: Vec<String>, outputs: Vec<VariableReference>) -> Self {
        Self { id, column_names, outputs }
    }
}
