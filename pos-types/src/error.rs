//! Error types for the payment service.

use crate::domain::PaymentId;

/// Domain-level errors (business rule violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid payment type: {0}")]
    InvalidPaymentType(String),

    #[error("Payment {0} is already confirmed")]
    PaymentAlreadyConfirmed(PaymentId),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Application-level errors returned by the payment service.
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Commit-time failure; carries the underlying cause message.
    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::PaymentAlreadyConfirmed(_) => AppError::Conflict(err.to_string()),
            DomainError::InvalidPaymentType(_) => AppError::InvalidArgument(err.to_string()),
            DomainError::ValidationError(msg) => AppError::InvalidArgument(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Database(e) => AppError::StorageFailure(e),
            RepoError::Transaction(e) => AppError::StorageFailure(e),
            RepoError::Conflict(e) => AppError::Conflict(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_errors_become_storage_failures() {
        let err: AppError = RepoError::Database("UNIQUE constraint failed".into()).into();
        assert!(matches!(err, AppError::StorageFailure(msg) if msg == "UNIQUE constraint failed"));

        let err: AppError = RepoError::Transaction("commit failed".into()).into();
        assert!(matches!(err, AppError::StorageFailure(_)));
    }

    #[test]
    fn test_domain_errors_mapping() {
        let err: AppError = RepoError::Domain(DomainError::ValidationError("bad".into())).into();
        assert!(matches!(err, AppError::InvalidArgument(msg) if msg == "bad"));

        let err: AppError = RepoError::Domain(DomainError::PaymentAlreadyConfirmed(
            PaymentId::new(),
        ))
        .into();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_repo_conflict_and_not_found() {
        assert!(matches!(
            AppError::from(RepoError::Conflict("open payment".into())),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(RepoError::NotFound),
            AppError::NotFound(_)
        ));
    }
}
