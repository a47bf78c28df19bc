//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A shortened URL link.
///
/// `code` is unique across all links; storage enforces it with a unique
/// constraint and reports violations as [`crate::AppError::Conflict`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(id: i64, code: String, long_url: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            code,
            long_url,
            created_at,
        }
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub code: String,
    pub long_url: String,
}
