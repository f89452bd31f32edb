//! Drop-in replacements for axum's `Json`, `Query` and `Path` extractors.
//!
//! Axum rejects malformed input with plain-text bodies. These wrappers keep
//! the same extraction rules but answer with `application/problem+json`:
//! undecodable bodies, query strings and path segments are 422, a missing
//! or wrong content type is 415, and oversized bodies keep their 413.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
};

use crate::api::problem::{Problem, ProblemResponse};

#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ProblemResponse))]
pub struct Json<T>(pub T);

#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ProblemResponse))]
pub struct Query<T>(pub T);

#[derive(Debug, Clone, Copy, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ProblemResponse))]
pub struct Path<T>(pub T);

fn rejection_problem(status: StatusCode, code: &str, body_text: String) -> ProblemResponse {
    let title = match status {
        StatusCode::UNPROCESSABLE_ENTITY => "Validation error",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "Unsupported media type",
        StatusCode::PAYLOAD_TOO_LARGE => "Payload too large",
        _ => "Bad Request",
    };
    tracing::debug!(status = status.as_u16(), code, "Request rejected: {}", body_text);
    Problem::new(status, title, body_text).with_code(code).into()
}

impl From<JsonRejection> for ProblemResponse {
    fn from(rejection: JsonRejection) -> Self {
        let status = match &rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            other => other.status(),
        };
        rejection_problem(status, "INVALID_BODY", rejection.body_text())
    }
}

impl From<QueryRejection> for ProblemResponse {
    fn from(rejection: QueryRejection) -> Self {
        rejection_problem(
            StatusCode::UNPROCESSABLE_ENTITY,
            "INVALID_QUERY",
            rejection.body_text(),
        )
    }
}

impl From<PathRejection> for ProblemResponse {
    fn from(rejection: PathRejection) -> Self {
        let status = match &rejection {
            PathRejection::FailedToDeserializePathParams(_) => StatusCode::UNPROCESSABLE_ENTITY,
            other => other.status(),
        };
        rejection_problem(status, "INVALID_PATH", rejection.body_text())
    }
}
