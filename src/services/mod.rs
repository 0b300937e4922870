//! Business workflows sitting between the routes and the repositories.

use thiserror::Error;

use crate::models::auth::AuthenticatedUser;
use crate::repository::errors::RepositoryError;

pub mod api;
pub mod client;
pub mod clients;
pub mod main;
pub mod reachability;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Form(String),

    #[error("type constraint violated: {0}")]
    TypeConstraint(String),

    #[error("repository error: {0}")]
    Repository(RepositoryError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            other => ServiceError::Repository(other),
        }
    }
}

impl ServiceError {
    /// Text safe to show to staff in a flash message or inline alert.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Unauthorized => "You do not have access to this action.".to_string(),
            ServiceError::NotFound => "Client not found.".to_string(),
            ServiceError::Form(message) => message.clone(),
            ServiceError::TypeConstraint(message) => format!("Invalid value: {message}"),
            ServiceError::Repository(RepositoryError::Timeout) => {
                "The admin API did not answer in time.".to_string()
            }
            ServiceError::Repository(RepositoryError::ConnectionError(_)) => {
                "The admin API is unreachable.".to_string()
            }
            ServiceError::Repository(RepositoryError::Remote { message, .. }) => {
                format!("The admin API rejected the request: {message}")
            }
            ServiceError::Repository(_) | ServiceError::Internal(_) => {
                "Unexpected error, please try again.".to_string()
            }
        }
    }
}

pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|r| r == role)
}

/// Fails with [`ServiceError::Unauthorized`] unless the user carries `role`.
pub fn ensure_role(user: &AuthenticatedUser, role: &str) -> ServiceResult<()> {
    if check_role(role, &user.roles) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_records_become_not_found() {
        let err = ServiceError::from(RepositoryError::NotFound);
        assert!(matches!(err, ServiceError::NotFound));

        let err = ServiceError::from(RepositoryError::Remote {
            status: 400,
            message: "Client has bookings".into(),
        });
        assert_eq!(
            err.user_message(),
            "The admin API rejected the request: Client has bookings"
        );
    }

    #[test]
    fn roles_are_matched_exactly() {
        let roles = vec!["bbe".to_string()];
        assert!(check_role("bbe", &roles));
        assert!(!check_role("bbe_admin", &roles));
    }
}
