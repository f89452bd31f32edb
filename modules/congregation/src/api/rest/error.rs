use axum::http::StatusCode;
use modkit::{Problem, ProblemResponse, ValidationError};

use crate::domain::error::DomainError;

/// Map domain error to RFC 9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    let problem = match e {
        DomainError::UserNotFound { id } => Problem::coded(
            StatusCode::NOT_FOUND,
            "USERS_NOT_FOUND",
            "User not found",
            format!("User with id {id} was not found"),
            instance,
        ),
        DomainError::EventNotFound { id } => Problem::coded(
            StatusCode::NOT_FOUND,
            "EVENTS_NOT_FOUND",
            "Event not found",
            format!("Event with id {id} was not found"),
            instance,
        ),
        DomainError::EmailAlreadyExists { email } => Problem::coded(
            StatusCode::BAD_REQUEST,
            "USERS_EMAIL_CONFLICT",
            "Email already registered",
            format!("Email '{email}' is already registered"),
            instance,
        ),
        DomainError::Validation { field, message } => Problem::coded(
            StatusCode::UNPROCESSABLE_ENTITY,
            "VALIDATION_FAILED",
            "Validation error",
            format!("{field}: {message}"),
            instance,
        )
        .with_errors(vec![ValidationError {
            detail: message.clone(),
            pointer: format!("/{field}"),
        }]),
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            Problem::coded(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                instance,
            )
        }
    };
    ProblemResponse(problem)
}
