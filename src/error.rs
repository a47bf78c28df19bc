//! Application error type shared by services and repositories.

use serde_json::{Value, json};

/// Errors produced by link allocation, lookups and storage.
///
/// Every message-carrying variant also holds a JSON `details` payload with
/// the context that produced it (codes, ids, constraint names), so callers
/// can log or surface it without parsing the message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// A uniqueness constraint rejected the write.
    #[error("{message}")]
    Conflict { message: String, details: Value },

    /// Every short code candidate collided.
    #[error("failed to allocate a unique short code after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },

    #[error("{message}")]
    Storage { message: String, details: Value },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn storage(message: impl Into<String>, details: Value) -> Self {
        Self::Storage {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Short machine-readable name of the variant, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::Conflict { .. } => "conflict",
            AppError::AllocationExhausted { .. } => "allocation_exhausted",
            AppError::Storage { .. } => "storage_failure",
            AppError::Internal { .. } => "internal_error",
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

/// Maps a database error onto [`AppError`].
///
/// Unique violations become [`AppError::Conflict`] so callers can treat them
/// as collisions; everything else is a [`AppError::Storage`] failure.
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        return AppError::conflict(
            "Unique constraint violation",
            json!({ "constraint": db.constraint() }),
        );
    }

    AppError::storage("Database error", json!({ "reason": e.to_string() }))
}
