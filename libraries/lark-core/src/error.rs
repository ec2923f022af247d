/// Core error types for Lark
use thiserror::Error;

/// Result type alias using `LarkError`
pub type Result<T> = std::result::Result<T, LarkError>;

/// Core error type for Lark
#[derive(Error, Debug)]
pub enum LarkError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Audio output errors
    #[error("Audio backend error: {0}")]
    Backend(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),
}

impl LarkError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an audio backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for LarkError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}
