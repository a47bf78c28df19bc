//! Repository trait for click persistence.

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for click tracking.
///
/// Called concurrently by every click worker, so implementations must
/// serialize access internally if the underlying handle is not shareable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Records a new click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on storage errors, including a missing
    /// referenced link.
    async fn create(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Counts clicks recorded for a link.
    ///
    /// A link without clicks yields `Ok(0)`, never an error.
    async fn count_by_link_id(&self, link_id: i64) -> Result<i64, AppError>;
}
