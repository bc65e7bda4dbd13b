use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;

use crate::api::rest::layers::current_request_id;
use crate::api::rest::problem::{Problem, ProblemResponse};
use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.example.com/{}", code))
        .with_code(code)
        .with_instance(instance);

    let problem = match current_request_id() {
        Some(id) => problem.with_request_id(id),
        None => problem,
    };

    ProblemResponse(problem)
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::UserNotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "USERS_NOT_FOUND",
            "User not found",
            format!("User with id {} was not found", id),
            instance,
        ),
        DomainError::BlockerNotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "USERS_BLOCKER_NOT_FOUND",
            "Blocker not found",
            format!("Blocker with id {} was not found", id),
            instance,
        ),
        DomainError::BlockedNotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "USERS_BLOCKED_NOT_FOUND",
            "Blocked user not found",
            format!("User to block with id {} was not found", id),
            instance,
        ),
        DomainError::UsernameTaken { username } => from_parts(
            StatusCode::CONFLICT,
            "USERS_USERNAME_CONFLICT",
            "Username already exists",
            format!("Username '{}' is already in use", username),
            instance,
        ),
        DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "USERS_VALIDATION",
            "Validation error",
            format!("{}", e),
            instance,
        ),
        DomainError::InvalidQuery { .. } => {
            tracing::warn!(error = ?e, "Search query rejected");
            from_parts(
                StatusCode::BAD_REQUEST,
                "USERS_INVALID_QUERY",
                "Invalid query",
                "The search request could not be processed",
                instance,
            )
        }
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                instance,
            )
        }
    }
}

pub fn json_rejection(rejection: JsonRejection, instance: &str) -> ProblemResponse {
    let status = match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    from_parts(
        status,
        "USERS_MALFORMED_BODY",
        "Malformed request body",
        rejection.body_text(),
        instance,
    )
}

pub fn query_rejection(rejection: QueryRejection, instance: &str) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "USERS_INVALID_QUERY",
        "Invalid query",
        rejection.body_text(),
        instance,
    )
}

pub fn path_rejection(rejection: PathRejection, instance: &str) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "USERS_INVALID_PATH",
        "Invalid path parameter",
        rejection.body_text(),
        instance,
    )
}
