use thiserror::Error;

/// Errors that are safe to expose to other crates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsersDirectoryError {
    #[error("User not found: {id}")]
    NotFound { id: i32 },

    #[error("User with username '{username}' already exists")]
    Conflict { username: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    #[error("Internal error")]
    Internal,
}

impl UsersDirectoryError {
    pub fn not_found(id: i32) -> Self {
        Self::NotFound { id }
    }

    pub fn conflict(username: String) -> Self {
        Self::Conflict { username }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for UsersDirectoryError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            UserNotFound { id } | BlockerNotFound { id } | BlockedNotFound { id } => {
                Self::not_found(id)
            }
            UsernameTaken { username } => Self::conflict(username),
            Validation { field, message } => Self::validation(format!("{field}: {message}")),
            InvalidQuery { message } => Self::invalid_query(message),
            Database { .. } => Self::internal(),
        }
    }
}
