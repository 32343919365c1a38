//! The type oracle seam.

use planguard_core::{PlanType, TypeResult, TypeSignature};

use super::function::FunctionHandle;
use super::Metadata;

/// Type questions the sanity checkers ask of the catalog.
///
/// Implementations must be safe for concurrent reads so independent plans
/// can be validated on separate threads.
pub trait TypeOracle: Send + Sync {
    /// Returns the registered return type of a function, or `None` if the
    /// handle is not in the catalog.
    fn return_type_of(&self, handle: &FunctionHandle) -> Option<TypeSignature>;

    /// Returns true if `source` is a type-only coercion of `result`: same
    /// representation, different metadata.
    fn is_type_only_coercion(&self, source: &PlanType, result: &PlanType) -> bool;

    /// Resolves a signature to a full type.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature names no known type.
    fn resolve(&self, signature: &TypeSignature) -> TypeResult<PlanType>;
}

impl TypeOracle for Metadata {
    fn return_type_of(&self, handle: &FunctionHandle) -> Option<TypeSignature> {
        self.functions().get(handle).map(|metadata| metadata.return_type.clone())
    }

    fn is_type_only_coercion(&self, source: &PlanType, result: &PlanType) -> bool {
        self.types().is_type_only_coercion(source, result)
    }

    fn resolve(&self, signature: &TypeSignature) -> TypeResult<PlanType> {
        self.types().resolve(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::FunctionMetadata;

    #[test]
    fn metadata_oracle() {
        let mut metadata = Metadata::with_builtins();
        let handle = metadata.functions_mut().register(FunctionMetadata::aggregate(
            "checksum",
            &[PlanType::BigInt],
            &PlanType::Varbinary,
        ));
        let oracle: &dyn TypeOracle = &metadata;

        assert_eq!(oracle.return_type_of(&handle), Some(TypeSignature::simple("varbinary")));
        assert_eq!(oracle.return_type_of(&FunctionHandle::new("missing", vec![])), None);
        assert!(oracle.is_type_only_coercion(&PlanType::varchar(1), &PlanType::varchar(2)));
        assert_eq!(oracle.resolve(&TypeSignature::simple("date")).unwrap(), PlanType::Date);
    }
}
