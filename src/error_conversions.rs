//! Error conversion glue between layers.
//!
//! The domain layer must not depend on service or repository error types,
//! so the `From` impls that let `?` flow upward live here.

use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::services::ServiceError;
use crate::widgets::WidgetError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<FormError> for ServiceError {
    fn from(val: FormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<WidgetError> for ServiceError {
    fn from(val: WidgetError) -> Self {
        ServiceError::Internal(val.to_string())
    }
}
