use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found: {id}")]
    UserNotFound { id: i32 },

    #[error("Blocker user not found: {id}")]
    BlockerNotFound { id: i32 },

    #[error("Blocked user not found: {id}")]
    BlockedNotFound { id: i32 },

    #[error("User with username '{username}' already exists")]
    UsernameTaken { username: String },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn user_not_found(id: i32) -> Self {
        Self::UserNotFound { id }
    }

    pub fn blocker_not_found(id: i32) -> Self {
        Self::BlockerNotFound { id }
    }

    pub fn blocked_not_found(id: i32) -> Self {
        Self::BlockedNotFound { id }
    }

    pub fn username_taken(username: impl Into<String>) -> Self {
        Self::UsernameTaken {
            username: username.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Store failures reached while serving a search are reported as a bad query.
    pub fn into_query_error(self) -> Self {
        match self {
            Self::Database { message } => Self::InvalidQuery { message },
            other => other,
        }
    }
}
