use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A foreign key, uniqueness or not-null constraint rejected the write.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    /// The requested row does not exist.
    #[error("not found")]
    NotFound,
    /// Stored or supplied data failed domain validation.
    #[error("validation error: {0}")]
    ValidationError(String),
    /// Schema migrations could not be applied.
    #[error("migration failed: {0}")]
    Migration(String),
    /// A connection could not be obtained from the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    /// Any other database failure.
    #[error("database error: {0}")]
    Database(DieselError),
}

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => Self::NotFound,
            DieselError::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::NotNullViolation
                | DatabaseErrorKind::CheckViolation,
                info,
            ) => Self::ConstraintViolation(info.message().to_string()),
            other => Self::Database(other),
        }
    }
}

/// Convenient alias for results returned from repositories.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
