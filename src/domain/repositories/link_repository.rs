//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing short links.
///
/// Implementations must be safe to call from many tasks at once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code already exists. This is
    /// the authoritative uniqueness check; a prior [`Self::find_by_code`] miss
    /// does not guarantee the insert succeeds.
    ///
    /// Returns [`AppError::Storage`] on other storage errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on storage errors.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Lists every link, oldest first.
    ///
    /// Consumed by the link health monitor and the admin CLI.
    async fn list_all(&self) -> Result<Vec<Link>, AppError>;

    /// Counts all links.
    async fn count(&self) -> Result<i64, AppError>;
}
