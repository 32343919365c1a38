//! Plan sanity checks.
//!
//! Sanity checks run over a compiled plan after optimization and before
//! execution. They do not repair anything: each one either accepts the plan
//! or reports the first defect it finds.
//!
//! - [`TypeValidator`]: output variables carry the types actually produced
//! - [`NoDuplicatePlanNodeIds`]: node ids are unique
//! - [`VerifyOnlyOneOutputNode`]: a final plan has a single root output
//!
//! [`PlanSanityChecker`] runs the checks enabled in a [`PlanSanityConfig`].

mod checker;
mod config;
mod error;
mod single_output;
mod type_validator;
mod unique_ids;

pub use checker::{Checker, PlanSanityChecker};
pub use config::PlanSanityConfig;
pub use error::{SanityError, SanityResult};
pub use single_output::VerifyOnlyOneOutputNode;
pub use type_validator::{verify_type_signature, TypeValidator};
pub use unique_ids::NoDuplicatePlanNodeIds;
