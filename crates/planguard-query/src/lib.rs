//! `planguard` Query
//!
//! Query plan model and the sanity checkers that run over a compiled plan
//! after optimization and before execution.
//!
//! # Overview
//!
//! - [`plan`]: plan nodes, typed variables, and the [`PlanBuilder`](plan::PlanBuilder)
//! - [`expr`]: untyped SQL expressions and typed row expressions
//! - [`metadata`]: function catalog and the [`TypeOracle`](metadata::TypeOracle) seam
//! - [`analyzer`]: expression type inference
//! - [`sanity`]: the [`TypeValidator`](sanity::TypeValidator) and the
//!   [`PlanSanityChecker`](sanity::PlanSanityChecker) that runs it
//!
//! # Example
//!
//! ```
//! use planguard_core::{PlanType, TypeSignature};
//! use planguard_query::analyzer::ExpressionAnalyzer;
//! use planguard_query::expr::Expr;
//! use planguard_query::metadata::Metadata;
//! use planguard_query::plan::{Assignments, PlanBuilder};
//! use planguard_query::sanity::TypeValidator;
//! use planguard_query::{Session, WarningCollector};
//!
//! let metadata = Metadata::with_builtins();
//! let analyzer = ExpressionAnalyzer::new(&metadata);
//!
//! // SELECT CAST(x AS integer) AS v1 FROM (VALUES ...) t(x)
//! let mut builder = PlanBuilder::new();
//! let x = builder.variable("x", PlanType::unbounded_varchar());
//! let v1 = builder.variable("v1", PlanType::Integer);
//! let values = builder.values(vec![x]);
//! let plan = builder.project(
//!     values,
//!     Assignments::new().with(v1, Expr::symbol("x").cast(TypeSignature::simple("integer"))),
//! );
//!
//! let session = Session::new("query_1", "alice");
//! let mut warnings = WarningCollector::default();
//! TypeValidator::new()
//!     .validate(&plan, &session, &metadata, &analyzer, builder.types(), &mut warnings)
//!     .unwrap();
//! ```

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod analyzer;
pub mod expr;
pub mod metadata;
pub mod plan;
pub mod sanity;
pub mod session;
pub mod warning;

pub use session::Session;
pub use warning::{PlanWarning, WarningCode, WarningCollector, WarningCollectorConfig};
