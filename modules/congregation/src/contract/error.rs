use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CongregationError {
    #[error("User not found: {id}")]
    UserNotFound { id: i32 },

    #[error("Event not found: {id}")]
    EventNotFound { id: i32 },

    #[error("Email already registered: {email}")]
    EmailTaken { email: String },

    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Internal error")]
    Internal,
}

impl CongregationError {
    pub fn user_not_found(id: i32) -> Self {
        Self::UserNotFound { id }
    }

    pub fn event_not_found(id: i32) -> Self {
        Self::EventNotFound { id }
    }

    pub fn email_taken(email: impl Into<String>) -> Self {
        Self::EmailTaken {
            email: email.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for CongregationError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            UserNotFound { id } => Self::user_not_found(id),
            EventNotFound { id } => Self::event_not_found(id),
            EmailAlreadyExists { email } => Self::email_taken(email),
            Validation { field, message } => Self::validation(field, message),
            Database { .. } => Self::internal(),
        }
    }
}
