//! Signature resolution and coercion rules.

use std::collections::HashMap;

use super::plan_type::{PlanType, RowField, MAX_DECIMAL_PRECISION};
use super::signature::{TypeSignature, TypeSignatureParameter};
use super::standard;
use crate::error::{TypeError, TypeResult};

/// Resolves signatures to types and answers coercion questions.
///
/// Besides the standard base names, the manager understands a set of
/// aliases (`int`, `float`, `text`, ...) that resolve to a canonical type.
#[derive(Debug, Clone)]
pub struct TypeManager {
    /// Parameterless alias name to the canonical signature it stands for.
    aliases: HashMap<String, TypeSignature>,
}

impl Default for TypeManager {
    fn default() -> Self {
        let mut manager = Self { aliases: HashMap::new() };
        manager.register_alias("int", TypeSignature::simple(standard::INTEGER));
        manager.register_alias("int8", TypeSignature::simple(standard::BIGINT));
        manager.register_alias("float", TypeSignature::simple(standard::REAL));
        manager.register_alias("float8", TypeSignature::simple(standard::DOUBLE));
        manager.register_alias("bool", TypeSignature::simple(standard::BOOLEAN));
        manager.register_alias("text", TypeSignature::simple(standard::VARCHAR));
        manager.register_alias("string", TypeSignature::simple(standard::VARCHAR));
        manager.register_alias("numeric", TypeSignature::simple(standard::DECIMAL));
        manager
    }
}

impl TypeManager {
    /// Creates a manager with the default aliases.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an alias for a canonical signature.
    ///
    /// If the alias already exists, it is replaced.
    pub fn register_alias(&mut self, alias: impl Into<String>, target: TypeSignature) {
        self.aliases.insert(alias.into().to_ascii_lowercase(), target);
    }

    /// Resolves a signature to a full type.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::UnknownType`] for unregistered base names and
    /// [`TypeError::InvalidParameters`] when the parameters don't fit the base.
    /// Returns [`TypeError::UnresolvedAlias`] when aliases refer to each other
    /// in a cycle.
    pub fn resolve(&self, signature: &TypeSignature) -> TypeResult<PlanType> {
        let signature = self.expand_alias(signature)?;

        let params = signature.parameters();
        let simple = |ty: PlanType| {
            if params.is_empty() {
                Ok(ty)
            } else {
                Err(TypeError::invalid_parameters(signature, "type takes no parameters"))
            }
        };

        match signature.base() {
            standard::UNKNOWN => simple(PlanType::Unknown),
            standard::BOOLEAN => simple(PlanType::Boolean),
            standard::TINYINT => simple(PlanType::TinyInt),
            standard::SMALLINT => simple(PlanType::SmallInt),
            standard::INTEGER => simple(PlanType::Integer),
            standard::BIGINT => simple(PlanType::BigInt),
            standard::REAL => simple(PlanType::Real),
            standard::DOUBLE => simple(PlanType::Double),
            standard::VARBINARY => simple(PlanType::Varbinary),
            standard::DATE => simple(PlanType::Date),
            standard::TIME => simple(PlanType::Time),
            standard::TIMESTAMP => simple(PlanType::Timestamp),
            standard::JSON => simple(PlanType::Json),
            standard::DECIMAL => resolve_decimal(signature),
            standard::VARCHAR => match params {
                [] => Ok(PlanType::Varchar(None)),
                [TypeSignatureParameter::Long(length)] => {
                    Ok(PlanType::Varchar(Some(length_parameter(signature, *length)?)))
                }
                _ => Err(TypeError::invalid_parameters(signature, "expected a single length")),
            },
            standard::CHAR => match params {
                [] => Ok(PlanType::Char(1)),
                [TypeSignatureParameter::Long(length)] => {
                    Ok(PlanType::Char(length_parameter(signature, *length)?))
                }
                _ => Err(TypeError::invalid_parameters(signature, "expected a single length")),
            },
            standard::ARRAY => match params {
                [TypeSignatureParameter::Type(element)] => {
                    Ok(PlanType::array(self.resolve(element)?))
                }
                _ => Err(TypeError::invalid_parameters(signature, "expected one element type")),
            },
            standard::MAP => match params {
                [TypeSignatureParameter::Type(key), TypeSignatureParameter::Type(value)] => {
                    Ok(PlanType::map(self.resolve(key)?, self.resolve(value)?))
                }
                _ => Err(TypeError::invalid_parameters(
                    signature,
                    "expected a key type and a value type",
                )),
            },
            standard::ROW => {
                if params.is_empty() {
                    return Err(TypeError::invalid_parameters(signature, "row needs fields"));
                }
                let fields = params
                    .iter()
                    .map(|param| match param {
                        TypeSignatureParameter::Type(sig) => {
                            Ok(RowField::anonymous(self.resolve(sig)?))
                        }
                        TypeSignatureParameter::Named { name, signature: sig } => {
                            Ok(RowField::named(name.clone(), self.resolve(sig)?))
                        }
                        TypeSignatureParameter::Long(_) => Err(TypeError::invalid_parameters(
                            signature,
                            "row fields must be types",
                        )),
                    })
                    .collect::<TypeResult<Vec<_>>>()?;
                Ok(PlanType::Row(fields))
            }
            other => Err(TypeError::UnknownType(other.to_string())),
        }
    }

    /// Follows parameterless aliases until a non-alias signature is reached.
    fn expand_alias<'s>(&'s self, signature: &'s TypeSignature) -> TypeResult<&'s TypeSignature> {
        let mut current = signature;
        let mut seen: Vec<&str> = Vec::new();
        while current.parameters().is_empty() {
            let Some(target) = self.aliases.get(current.base()) else {
                break;
            };
            if seen.contains(&current.base()) {
                return Err(TypeError::UnresolvedAlias(signature.base().to_string()));
            }
            seen.push(current.base());
            current = target;
        }
        Ok(current)
    }

    /// Returns true if `source` can be used as `result` without changing
    /// its physical representation (e.g. widening a varchar length).
    ///
    /// Identical types are trivially a type-only coercion. Integer to bigint
    /// is not: the values have to be rewritten.
    #[must_use]
    pub fn is_type_only_coercion(&self, source: &PlanType, result: &PlanType) -> bool {
        if source == result {
            return true;
        }

        match (source, result) {
            (PlanType::Varchar(_), PlanType::Varchar(None)) => true,
            (PlanType::Varchar(Some(from)), PlanType::Varchar(Some(to))) => from <= to,
            (
                PlanType::Decimal { precision: from_precision, scale: from_scale },
                PlanType::Decimal { precision: to_precision, scale: to_scale },
            ) => {
                source.is_short_decimal() == result.is_short_decimal()
                    && from_scale == to_scale
                    && from_precision <= to_precision
            }
            // Covariant parametric types
            (PlanType::Array(from), PlanType::Array(to)) => self.is_type_only_coercion(from, to),
            (PlanType::Map { key: from_key, value: from_value }, PlanType::Map { key, value }) => {
                self.is_type_only_coercion(from_key, key)
                    && self.is_type_only_coercion(from_value, value)
            }
            _ => false,
        }
    }

    /// Returns true if values of `source` may be implicitly coerced to `result`.
    #[must_use]
    pub fn can_coerce(&self, source: &PlanType, result: &PlanType) -> bool {
        self.common_super_type(source, result).as_ref() == Some(result)
    }

    /// Returns true if an explicit `CAST` from `source` to `target` is valid.
    #[must_use]
    pub fn can_cast(&self, source: &PlanType, target: &PlanType) -> bool {
        if source.is_unknown() || self.can_coerce(source, target) {
            return true;
        }

        match (source, target) {
            (l, r) if is_castable_scalar(l) && is_castable_scalar(r) => {
                // Scalars cast freely through their text form, except
                // between varbinary and non-string types.
                let binary_mismatch = (matches!(l, PlanType::Varbinary) && !r.is_string())
                    || (matches!(r, PlanType::Varbinary) && !l.is_string());
                let temporal_mismatch = (is_temporal(l)
                    && (r.is_numeric() || *r == PlanType::Boolean))
                    || (is_temporal(r) && (l.is_numeric() || *l == PlanType::Boolean));
                !binary_mismatch && !temporal_mismatch
            }
            (PlanType::Json, PlanType::Array(_) | PlanType::Map { .. } | PlanType::Row(_))
            | (PlanType::Array(_) | PlanType::Map { .. } | PlanType::Row(_), PlanType::Json) => {
                true
            }
            (PlanType::Array(from), PlanType::Array(to)) => self.can_cast(from, to),
            (PlanType::Map { key: from_key, value: from_value }, PlanType::Map { key, value }) => {
                self.can_cast(from_key, key) && self.can_cast(from_value, value)
            }
            (PlanType::Row(from), PlanType::Row(to)) => {
                from.len() == to.len()
                    && from.iter().zip(to).all(|(f, t)| self.can_cast(&f.data_type, &t.data_type))
            }
            _ => false,
        }
    }

    /// Returns the narrowest type both arguments can be implicitly coerced to.
    ///
    /// `unknown` coerces to anything, integral types widen to larger
    /// integrals, decimals, and floating point, and varchars widen to the
    /// longer length.
    #[must_use]
    pub fn common_super_type(&self, left: &PlanType, right: &PlanType) -> Option<PlanType> {
        if left == right {
            return Some(left.clone());
        }

        match (left, right) {
            (PlanType::Unknown, other) | (other, PlanType::Unknown) => Some(other.clone()),

            (l, r) if l.is_integral() && r.is_integral() => {
                Some(if integral_rank(l) >= integral_rank(r) { l.clone() } else { r.clone() })
            }

            (PlanType::Double, r) | (r, PlanType::Double) if r.is_numeric() => {
                Some(PlanType::Double)
            }
            (PlanType::Real, r) | (r, PlanType::Real) if r.is_numeric() => Some(PlanType::Real),

            (PlanType::Decimal { .. }, _) | (_, PlanType::Decimal { .. }) => {
                let (lp, ls) = left.decimal_parts()?;
                let (rp, rs) = right.decimal_parts()?;
                let scale = ls.max(rs);
                let integer_digits = (lp - ls).max(rp - rs);
                let precision = (integer_digits + scale).min(MAX_DECIMAL_PRECISION);
                Some(PlanType::decimal(precision, scale))
            }

            (PlanType::Varchar(l), PlanType::Varchar(r)) => match (l, r) {
                (Some(l), Some(r)) => Some(PlanType::Varchar(Some(*l.max(r)))),
                _ => Some(PlanType::Varchar(None)),
            },
            (PlanType::Char(l), PlanType::Char(r)) => Some(PlanType::Char(*l.max(r))),

            (PlanType::Date, PlanType::Timestamp) | (PlanType::Timestamp, PlanType::Date) => {
                Some(PlanType::Timestamp)
            }

            (PlanType::Array(l), PlanType::Array(r)) => {
                self.common_super_type(l, r).map(PlanType::array)
            }
            (PlanType::Map { key: lk, value: lv }, PlanType::Map { key: rk, value: rv }) => {
                let key = self.common_super_type(lk, rk)?;
                let value = self.common_super_type(lv, rv)?;
                Some(PlanType::map(key, value))
            }

            _ => None,
        }
    }
}

fn resolve_decimal(signature: &TypeSignature) -> TypeResult<PlanType> {
    let (precision, scale) = match signature.parameters() {
        [] => (i64::from(MAX_DECIMAL_PRECISION), 0),
        [TypeSignatureParameter::Long(precision)] => (*precision, 0),
        [TypeSignatureParameter::Long(precision), TypeSignatureParameter::Long(scale)] => {
            (*precision, *scale)
        }
        _ => {
            return Err(TypeError::invalid_parameters(signature, "expected precision and scale"))
        }
    };

    if !(1..=i64::from(MAX_DECIMAL_PRECISION)).contains(&precision) {
        return Err(TypeError::invalid_parameters(
            signature,
            format!("precision must be between 1 and {MAX_DECIMAL_PRECISION}"),
        ));
    }
    if !(0..=precision).contains(&scale) {
        return Err(TypeError::invalid_parameters(
            signature,
            "scale must be between 0 and the precision",
        ));
    }

    // Both values were range checked above
    let precision = u8::try_from(precision)
        .map_err(|_| TypeError::invalid_parameters(signature, "precision out of range"))?;
    let scale = u8::try_from(scale)
        .map_err(|_| TypeError::invalid_parameters(signature, "scale out of range"))?;
    Ok(PlanType::decimal(precision, scale))
}

fn length_parameter(signature: &TypeSignature, length: i64) -> TypeResult<u32> {
    u32::try_from(length)
        .map_err(|_| TypeError::invalid_parameters(signature, format!("invalid length {length}")))
}

fn is_castable_scalar(ty: &PlanType) -> bool {
    !matches!(ty, PlanType::Unknown | PlanType::Array(_) | PlanType::Map { .. } | PlanType::Row(_))
}

fn is_temporal(ty: &PlanType) -> bool {
    matches!(ty, PlanType::Date | PlanType::Time | PlanType::Timestamp)
}

fn integral_rank(ty: &PlanType) -> u8 {
    match ty {
        PlanType::TinyInt => 0,
        PlanType::SmallInt => 1,
        PlanType::Integer => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(text: &str) -> TypeResult<PlanType> {
        TypeManager::new().resolve(&TypeSignature::parse(text).unwrap())
    }

    #[test]
    fn resolve_scalars() {
        assert_eq!(resolve("bigint").unwrap(), PlanType::BigInt);
        assert_eq!(resolve("unknown").unwrap(), PlanType::Unknown);
        assert_eq!(resolve("varchar").unwrap(), PlanType::unbounded_varchar());
        assert_eq!(resolve("varchar(12)").unwrap(), PlanType::varchar(12));
        assert_eq!(resolve("char").unwrap(), PlanType::Char(1));
    }

    #[test]
    fn explicit_casts() {
        let types = TypeManager::new();
        assert!(types.can_cast(&PlanType::unbounded_varchar(), &PlanType::Integer));
        assert!(types.can_cast(&PlanType::Double, &PlanType::BigInt));
        assert!(types.can_cast(&PlanType::Boolean, &PlanType::Integer));
        assert!(types.can_cast(&PlanType::Unknown, &PlanType::Date));
        assert!(types.can_cast(&PlanType::Json, &PlanType::array(PlanType::BigInt)));
        assert!(types.can_cast(
            &PlanType::array(PlanType::varchar(3)),
            &PlanType::array(PlanType::Double)
        ));

        assert!(!types.can_cast(&PlanType::Date, &PlanType::Integer));
        assert!(!types.can_cast(&PlanType::Varbinary, &PlanType::BigInt));
        assert!(!types.can_cast(&PlanType::array(PlanType::BigInt), &PlanType::BigInt));
    }

    #[test]
    fn resolve_decimals() {
        assert_eq!(resolve("decimal").unwrap(), PlanType::decimal(38, 0));
        assert_eq!(resolve("decimal(7)").unwrap(), PlanType::decimal(7, 0));
        assert_eq!(resolve("decimal(7,3)").unwrap(), PlanType::decimal(7, 3));
        assert!(matches!(resolve("decimal(39,0)"), Err(TypeError::InvalidParameters { .. })));
        assert!(matches!(resolve("decimal(4,5)"), Err(TypeError::InvalidParameters { .. })));
    }

    #[test]
    fn resolve_parametric() {
        assert_eq!(
            resolve("map(varchar(3),array(double))").unwrap(),
            PlanType::map(PlanType::varchar(3), PlanType::array(PlanType::Double))
        );
        assert_eq!(
            resolve("row(id bigint,boolean)").unwrap(),
            PlanType::Row(vec![
                RowField::named("id", PlanType::BigInt),
                RowField::anonymous(PlanType::Boolean)
            ])
        );
        assert!(matches!(resolve("array"), Err(TypeError::InvalidParameters { .. })));
        assert!(matches!(resolve("bigint(3)"), Err(TypeError::InvalidParameters { .. })));
    }

    #[test]
    fn resolve_aliases() {
        assert_eq!(resolve("int").unwrap(), PlanType::Integer);
        assert_eq!(resolve("TEXT").unwrap(), PlanType::unbounded_varchar());
        assert!(matches!(
            resolve("geometry"),
            Err(TypeError::UnknownType(name)) if name == "geometry"
        ));

        let mut manager = TypeManager::new();
        manager.register_alias("money", TypeSignature::parse("decimal(19,4)").unwrap());
        assert_eq!(
            manager.resolve(&TypeSignature::simple("money")).unwrap(),
            PlanType::decimal(19, 4)
        );
    }

    #[test]
    fn alias_chains_and_cycles() {
        let mut manager = TypeManager::new();
        manager.register_alias("id", TypeSignature::simple("int8"));
        assert_eq!(manager.resolve(&TypeSignature::simple("id")).unwrap(), PlanType::BigInt);

        manager.register_alias("self_ref", TypeSignature::simple("self_ref"));
        assert_eq!(
            manager.resolve(&TypeSignature::simple("self_ref")),
            Err(TypeError::UnresolvedAlias("self_ref".to_string()))
        );

        manager.register_alias("a", TypeSignature::simple("b"));
        manager.register_alias("b", TypeSignature::simple("a"));
        assert_eq!(
            manager.resolve(&TypeSignature::simple("a")),
            Err(TypeError::UnresolvedAlias("a".to_string()))
        );
        assert!(matches!(
            manager.resolve(&TypeSignature::parse("array(b)").unwrap()),
            Err(TypeError::UnresolvedAlias(name)) if name == "b"
        ));
    }

    #[test]
    fn type_only_coercion_varchar() {
        let m = TypeManager::new();
        assert!(m.is_type_only_coercion(&PlanType::varchar(5), &PlanType::varchar(10)));
        assert!(m.is_type_only_coercion(&PlanType::varchar(5), &PlanType::unbounded_varchar()));
        assert!(!m.is_type_only_coercion(&PlanType::varchar(10), &PlanType::varchar(5)));
        assert!(!m.is_type_only_coercion(&PlanType::unbounded_varchar(), &PlanType::varchar(5)));
    }

    #[test]
    fn type_only_coercion_decimal() {
        let m = TypeManager::new();
        assert!(m.is_type_only_coercion(&PlanType::decimal(10, 2), &PlanType::decimal(12, 2)));
        // Different scale rewrites the unscaled value
        assert!(!m.is_type_only_coercion(&PlanType::decimal(10, 2), &PlanType::decimal(12, 3)));
        // Short to long changes the storage width
        assert!(!m.is_type_only_coercion(&PlanType::decimal(10, 2), &PlanType::decimal(20, 2)));
        assert!(m.is_type_only_coercion(&PlanType::decimal(20, 2), &PlanType::decimal(30, 2)));
    }

    #[test]
    fn type_only_coercion_is_not_widening() {
        let m = TypeManager::new();
        assert!(!m.is_type_only_coercion(&PlanType::Integer, &PlanType::BigInt));
        assert!(!m.is_type_only_coercion(&PlanType::BigInt, &PlanType::Double));
        assert!(!m.is_type_only_coercion(&PlanType::Unknown, &PlanType::BigInt));
    }

    #[test]
    fn type_only_coercion_covariant() {
        let m = TypeManager::new();
        assert!(m.is_type_only_coercion(
            &PlanType::array(PlanType::varchar(3)),
            &PlanType::array(PlanType::unbounded_varchar())
        ));
        assert!(!m.is_type_only_coercion(
            &PlanType::array(PlanType::Integer),
            &PlanType::array(PlanType::BigInt)
        ));
        assert!(m.is_type_only_coercion(
            &PlanType::map(PlanType::varchar(1), PlanType::decimal(5, 1)),
            &PlanType::map(PlanType::varchar(2), PlanType::decimal(6, 1))
        ));
        let row = |ty| PlanType::Row(vec![RowField::anonymous(ty)]);
        assert!(!m.is_type_only_coercion(
            &row(PlanType::varchar(3)),
            &row(PlanType::unbounded_varchar())
        ));
    }

    #[test]
    fn common_super_types() {
        let m = TypeManager::new();
        assert_eq!(
            m.common_super_type(&PlanType::Integer, &PlanType::BigInt),
            Some(PlanType::BigInt)
        );
        assert_eq!(m.common_super_type(&PlanType::Unknown, &PlanType::Date), Some(PlanType::Date));
        assert_eq!(m.common_super_type(&PlanType::Real, &PlanType::Double), Some(PlanType::Double));
        assert_eq!(
            m.common_super_type(&PlanType::Integer, &PlanType::decimal(5, 2)),
            Some(PlanType::decimal(12, 2))
        );
        assert_eq!(
            m.common_super_type(&PlanType::varchar(3), &PlanType::varchar(8)),
            Some(PlanType::varchar(8))
        );
        assert_eq!(m.common_super_type(&PlanType::Boolean, &PlanType::BigInt), None);
        assert!(m.can_coerce(&PlanType::Integer, &PlanType::BigInt));
        assert!(!m.can_coerce(&PlanType::BigInt, &PlanType::Integer));
    }
}
