use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found")]
    NotFound,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return RepositoryError::Timeout;
        }
        if err.is_connect() {
            return RepositoryError::ConnectionError(err.to_string());
        }
        if err.is_decode() {
            return RepositoryError::DecodeError(err.to_string());
        }
        match err.status() {
            Some(status) if status == reqwest::StatusCode::NOT_FOUND => RepositoryError::NotFound,
            Some(status) => RepositoryError::Remote {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => RepositoryError::Unexpected(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::DecodeError(err.to_string())
    }
}
