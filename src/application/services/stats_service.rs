//! Click statistics service.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::domain::entities::Link;
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;

/// A link together with the number of clicks recorded for it.
///
/// Counts are eventually consistent with redirects: events still queued, or
/// dropped under backpressure, are not included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    pub link: Link,
    pub total_clicks: i64,
}

/// Service for retrieving click statistics.
pub struct StatsService<L: LinkRepository + ?Sized, C: ClickRepository + ?Sized> {
    link_repository: Arc<L>,
    click_repository: Arc<C>,
}

impl<L: LinkRepository + ?Sized, C: ClickRepository + ?Sized> StatsService<L, C> {
    /// Creates a new statistics service.
    pub fn new(link_repository: Arc<L>, click_repository: Arc<C>) -> Self {
        Self {
            link_repository,
            click_repository,
        }
    }

    /// Retrieves a link and its total click count by short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    /// Returns [`AppError::Storage`] on storage errors.
    pub async fn get_link_stats(&self, code: &str) -> Result<LinkStats, AppError> {
        let link = self
            .link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))?;

        let total_clicks = self.click_repository.count_by_link_id(link.id).await?;

        Ok(LinkStats { link, total_clicks })
    }

    /// Counts clicks for a link id. Zero when nothing was recorded.
    pub async fn count_clicks(&self, link_id: i64) -> Result<i64, AppError> {
        self.click_repository.count_by_link_id(link_id).await
    }
}
