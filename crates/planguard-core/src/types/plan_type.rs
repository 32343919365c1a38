//! Resolved data types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::signature::{TypeSignature, TypeSignatureParameter};
use super::standard;

/// Largest precision a decimal may have.
pub const MAX_DECIMAL_PRECISION: u8 = 38;

/// Largest precision of a decimal stored in a single 64-bit word.
pub const MAX_SHORT_DECIMAL_PRECISION: u8 = 18;

/// Data types carried by plan variables and expressions.
///
/// Every type has exactly one [`TypeSignature`]; see [`PlanType::signature`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanType {
    /// Type of expressions whose concrete type cannot be determined,
    /// such as a bare `NULL`. Compatible with every declared type.
    Unknown,
    /// Boolean type.
    Boolean,
    /// 8-bit signed integer.
    TinyInt,
    /// 16-bit signed integer.
    SmallInt,
    /// 32-bit signed integer.
    Integer,
    /// 64-bit signed integer.
    BigInt,
    /// 32-bit floating point.
    Real,
    /// 64-bit floating point.
    Double,
    /// Fixed precision decimal.
    Decimal {
        /// Total digits.
        precision: u8,
        /// Digits after the decimal point.
        scale: u8,
    },
    /// Variable-length string, `None` when unbounded.
    Varchar(Option<u32>),
    /// Fixed-length string.
    Char(u32),
    /// Binary data.
    Varbinary,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Timestamp without time zone.
    Timestamp,
    /// JSON document.
    Json,
    /// Array of an element type.
    Array(Box<PlanType>),
    /// Map from a key type to a value type.
    Map {
        /// Key type.
        key: Box<PlanType>,
        /// Value type.
        value: Box<PlanType>,
    },
    /// Row of fields.
    Row(Vec<RowField>),
}

/// A field of a [`PlanType::Row`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowField {
    /// Field name, absent for anonymous rows.
    pub name: Option<String>,
    /// Field type.
    pub data_type: PlanType,
}

impl RowField {
    /// Creates a named field.
    #[must_use]
    pub fn named(name: impl Into<String>, data_type: PlanType) -> Self {
        Self { name: Some(name.into()), data_type }
    }

    /// Creates an anonymous field.
    #[must_use]
    pub fn anonymous(data_type: PlanType) -> Self {
        Self { name: None, data_type }
    }
}

impl PlanType {
    /// Creates a bounded varchar type.
    #[must_use]
    pub fn varchar(length: u32) -> Self {
        Self::Varchar(Some(length))
    }

    /// Creates an unbounded varchar type.
    #[must_use]
    pub fn unbounded_varchar() -> Self {
        Self::Varchar(None)
    }

    /// Creates a decimal type.
    #[must_use]
    pub fn decimal(precision: u8, scale: u8) -> Self {
        Self::Decimal { precision, scale }
    }

    /// Creates an array type.
    #[must_use]
    pub fn array(element: PlanType) -> Self {
        Self::Array(Box::new(element))
    }

    /// Creates a map type.
    #[must_use]
    pub fn map(key: PlanType, value: PlanType) -> Self {
        Self::Map { key: Box::new(key), value: Box::new(value) }
    }

    /// Returns true for the wildcard `unknown` type.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns true for exact integral types.
    #[must_use]
    pub fn is_integral(&self) -> bool {
        matches!(self, Self::TinyInt | Self::SmallInt | Self::Integer | Self::BigInt)
    }

    /// Returns true for all numeric types.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.is_integral() || matches!(self, Self::Real | Self::Double | Self::Decimal { .. })
    }

    /// Returns true for string types.
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::Varchar(_) | Self::Char(_))
    }

    /// Returns true for decimals that fit a single 64-bit word.
    #[must_use]
    pub fn is_short_decimal(&self) -> bool {
        matches!(self, Self::Decimal { precision, .. } if *precision <= MAX_SHORT_DECIMAL_PRECISION)
    }

    /// Returns the precision and scale of a decimal, or of the decimal an
    /// integral type widens to.
    #[must_use]
    pub fn decimal_parts(&self) -> Option<(u8, u8)> {
        match self {
            Self::Decimal { precision, scale } => Some((*precision, *scale)),
            Self::TinyInt => Some((3, 0)),
            Self::SmallInt => Some((5, 0)),
            Self::Integer => Some((10, 0)),
            Self::BigInt => Some((19, 0)),
            _ => None,
        }
    }

    /// Returns the base name of this type's signature.
    #[must_use]
    pub fn base_name(&self) -> &'static str {
        match self {
            Self::Unknown => standard::UNKNOWN,
            Self::Boolean => standard::BOOLEAN,
            Self::TinyInt => standard::TINYINT,
            Self::SmallInt => standard::SMALLINT,
            Self::Integer => standard::INTEGER,
            Self::BigInt => standard::BIGINT,
            Self::Real => standard::REAL,
            Self::Double => standard::DOUBLE,
            Self::Decimal { .. } => standard::DECIMAL,
            Self::Varchar(_) => standard::VARCHAR,
            Self::Char(_) => standard::CHAR,
            Self::Varbinary => standard::VARBINARY,
            Self::Date => standard::DATE,
            Self::Time => standard::TIME,
            Self::Timestamp => standard::TIMESTAMP,
            Self::Json => standard::JSON,
            Self::Array(_) => standard::ARRAY,
            Self::Map { .. } => standard::MAP,
            Self::Row(_) => standard::ROW,
        }
    }

    /// Returns the nested types of parametric types, in signature order.
    #[must_use]
    pub fn type_parameters(&self) -> Vec<&PlanType> {
        match self {
            Self::Array(element) => vec![element.as_ref()],
            Self::Map { key, value } => vec![key.as_ref(), value.as_ref()],
            Self::Row(fields) => fields.iter().map(|f| &f.data_type).collect(),
            _ => vec![],
        }
    }

    /// Returns the structural signature of this type.
    #[must_use]
    pub fn signature(&self) -> TypeSignature {
        let parameters: Vec<TypeSignatureParameter> = match self {
            Self::Decimal { precision, scale } => {
                vec![i64::from(*precision).into(), i64::from(*scale).into()]
            }
            Self::Varchar(Some(length)) | Self::Char(length) => vec![i64::from(*length).into()],
            Self::Array(element) => vec![element.signature().into()],
            Self::Map { key, value } => vec![key.signature().into(), value.signature().into()],
            Self::Row(fields) => fields
                .iter()
                .map(|field| match &field.name {
                    Some(name) => TypeSignatureParameter::Named {
                        name: name.clone(),
                        signature: field.data_type.signature(),
                    },
                    None => field.data_type.signature().into(),
                })
                .collect(),
            _ => vec![],
        };
        TypeSignature::new(self.base_name(), parameters)
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature())
    }
}
