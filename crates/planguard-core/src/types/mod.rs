//! Type system.
//!
//! - [`PlanType`] is the resolved, semantic form of a type.
//! - [`TypeSignature`] is its structural form, used for comparisons and
//!   as the currency of function catalogs.
//! - [`TypeManager`] converts between the two and owns the coercion rules.

mod manager;
mod plan_type;
mod signature;

pub use manager::TypeManager;
pub use plan_type::{PlanType, RowField, MAX_DECIMAL_PRECISION, MAX_SHORT_DECIMAL_PRECISION};
pub use signature::{TypeSignature, TypeSignatureParameter};

/// Base names of the built-in types.
pub mod standard {
    /// The wildcard type of untyped expressions such as a bare `NULL`.
    pub const UNKNOWN: &str = "unknown";
    /// Boolean.
    pub const BOOLEAN: &str = "boolean";
    /// 8-bit signed integer.
    pub const TINYINT: &str = "tinyint";
    /// 16-bit signed integer.
    pub const SMALLINT: &str = "smallint";
    /// 32-bit signed integer.
    pub const INTEGER: &str = "integer";
    /// 64-bit signed integer.
    pub const BIGINT: &str = "bigint";
    /// 32-bit floating point.
    pub const REAL: &str = "real";
    /// 64-bit floating point.
    pub const DOUBLE: &str = "double";
    /// Fixed precision decimal.
    pub const DECIMAL: &str = "decimal";
    /// Variable-length string.
    pub const VARCHAR: &str = "varchar";
    /// Fixed-length string.
    pub const CHAR: &str = "char";
    /// Binary data.
    pub const VARBINARY: &str = "varbinary";
    /// Calendar date.
    pub const DATE: &str = "date";
    /// Time of day.
    pub const TIME: &str = "time";
    /// Timestamp without time zone.
    pub const TIMESTAMP: &str = "timestamp";
    /// JSON document.
    pub const JSON: &str = "json";
    /// Array of one element type.
    pub const ARRAY: &str = "array";
    /// Map from a key type to a value type.
    pub const MAP: &str = "map";
    /// Row of (optionally named) fields.
    pub const ROW: &str = "row";
}
