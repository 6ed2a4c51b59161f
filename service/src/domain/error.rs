use thiserror::Error;

use publications_common::PublicationStatus;

use crate::domain::authors::AuthorsError;
use crate::domain::repository::RepositoryError;

/// Classified failures of publication operations. Each variant is a
/// distinct kind the HTTP boundary maps to a response status and machine
/// tag; no layer matches on message text.
///
/// `ServiceUnavailable`, `GatewayTimeout` and `Internal` keep their detail
/// out of `Display` so callers see a generic message while the payload is
/// still available for logging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{reason}")]
    InvalidTransition {
        from: PublicationStatus,
        to: PublicationStatus,
        reason: String,
    },

    #[error("{0}")]
    InvalidState(String),

    #[error("Authors Service is unavailable")]
    ServiceUnavailable(String),

    #[error("Authors Service timed out")]
    GatewayTimeout(String),

    #[error("Internal server error")]
    Internal(String),
}

impl From<AuthorsError> for ServiceError {
    fn from(error: AuthorsError) -> Self {
        match error {
            AuthorsError::NotFound(id) => {
                ServiceError::NotFound(format!("Author with ID {id} not found"))
            }
            AuthorsError::InvalidId(_) => {
                ServiceError::Validation("Valid author ID is required".to_string())
            }
            AuthorsError::Timeout { .. } => ServiceError::GatewayTimeout(error.to_string()),
            AuthorsError::Unavailable { .. } | AuthorsError::HealthCheckFailed => {
                ServiceError::ServiceUnavailable(error.to_string())
            }
            AuthorsError::Unexpected(detail) => ServiceError::Internal(detail),
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => {
                ServiceError::NotFound("Publication not found".to_string())
            }
            RepositoryError::Storage(detail) => ServiceError::Internal(detail),
        }
    }
}
