//! Error conversion glue between layers.
//!
//! The domain layer must not depend on repository or service error types, so
//! conversions from [`TypeConstraintError`] live here.

use crate::domain::types::TypeConstraintError;
use crate::repository::errors::RepositoryError;

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

#[cfg(feature = "cli")]
mod pipeline {
    use super::TypeConstraintError;
    use crate::services::errors::{NormalizationError, SinkError};

    impl From<TypeConstraintError> for NormalizationError {
        fn from(val: TypeConstraintError) -> Self {
            NormalizationError::Constraint(val.to_string())
        }
    }

    impl From<TypeConstraintError> for SinkError {
        fn from(val: TypeConstraintError) -> Self {
            SinkError::InvalidRecord(val.to_string())
        }
    }
}
