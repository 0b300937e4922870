//! Form definitions backing the dashboard routes.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod client;
pub mod clients;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid email address.")]
    InvalidEmail,

    #[error("Name cannot be empty.")]
    InvalidName,

    #[error("Unknown integration.")]
    InvalidIntegration,

    #[error("{0} is required for this integration.")]
    MissingCredential(&'static str),

    #[error("Invalid color for {0}.")]
    InvalidColor(&'static str),

    #[error("Invalid currency code: {0}.")]
    InvalidCurrency(String),

    #[error("Invalid URL for {0}.")]
    InvalidUrl(&'static str),

    #[error("Max guests must be a whole number.")]
    InvalidMaxGuests,

    #[error("Select at least one client.")]
    NoClientsSelected,

    #[error("Invalid client identifier.")]
    InvalidClientCuid,

    #[error("Todo text cannot be empty.")]
    EmptyTodo,

    #[error("Choose an image to upload.")]
    MissingImage,

    #[error("Image is larger than 3 MB.")]
    ImageTooLarge,

    #[error("Unsupported image type: {0}.")]
    UnsupportedImageType(String),

    #[error("Could not read the uploaded file.")]
    UnreadableImage,

    #[error("Malformed form data.")]
    Malformed,
}

impl From<TypeConstraintError> for FormError {
    fn from(err: TypeConstraintError) -> Self {
        match err {
            TypeConstraintError::InvalidEmail => FormError::InvalidEmail,
            TypeConstraintError::EmptyString => FormError::InvalidName,
            TypeConstraintError::InvalidCurrency(code) => FormError::InvalidCurrency(code),
            TypeConstraintError::InvalidUrl => FormError::InvalidUrl("URL"),
            TypeConstraintError::InvalidColor(_) => FormError::InvalidColor("color"),
        }
    }
}

/// Trims the value and drops it when nothing is left.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// HTML checkboxes are only submitted when ticked.
pub(crate) fn is_checked(value: &Option<String>) -> bool {
    value
        .as_deref()
        .is_some_and(|v| matches!(v, "on" | "true" | "1"))
}
