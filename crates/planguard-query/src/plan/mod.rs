//! Query plan.
//!
//! This module defines the compiled plan the sanity checkers walk.
//!
//! # Overview
//!
//! A plan is a tree of [`PlanNode`]s. Every node carries a [`PlanNodeId`]
//! and produces typed [`VariableReference`]s. The declared type of each
//! variable is fixed when the planner creates it; the sanity checkers
//! verify that it agrees with what the defining expression or function
//! actually produces.
//!
//! # Example
//!
//! ```
//! use planguard_core::PlanType;
//! use planguard_query::expr::Expr;
//! use planguard_query::plan::{Assignments, PlanBuilder};
//!
//! // SELECT a + 1 AS c FROM t WHERE a > 0
//! let mut builder = PlanBuilder::new();
//! let a = builder.variable("a", PlanType::BigInt);
//! let c = builder.variable("c", PlanType::BigInt);
//! let scan = builder.table_scan("t", vec![a]);
//! let filter = builder.filter(scan, Expr::symbol("a").gt(Expr::long(0)));
//! let plan = builder.project(
//!     filter,
//!     Assignments::new().with(c, Expr::symbol("a").add(Expr::long(1))),
//! );
//!
//! println!("{}", plan.display_tree());
//! ```

mod builder;
mod node;
mod relational;
mod variable;

pub use builder::{PlanBuilder, PlanNodeIdAllocator};
pub use node::{DisplayTree, PlanNode};
pub use relational::{
    Aggregation, AggregationNode, AggregationStep, Assignments, FilterNode, FrameBound,
    FrameUnits, JoinNode, JoinType, LimitNode, Ordering, OutputNode, PlanNodeId, ProjectNode,
    SortNode, SortOrder, TableScanNode, UnionNode, ValuesNode, WindowFrame, WindowFunction,
    WindowNode,
};
pub use variable::{TypeEnvironment, VariableReference};
