//! Redirect resolution with asynchronous click tracking.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::domain::click_event::ClickEvent;
use crate::domain::click_queue::ClickQueue;
use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Client metadata captured from a redirect request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

/// Resolves short codes for redirects and records the click.
///
/// The click is handed to the [`ClickQueue`] without waiting, so redirect
/// latency never depends on how fast clicks are persisted. If the queue is
/// full the click is dropped and the redirect still succeeds.
pub struct RedirectService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    click_queue: Arc<ClickQueue>,
}

impl<L: LinkRepository + ?Sized> RedirectService<L> {
    pub fn new(link_repository: Arc<L>, click_queue: Arc<ClickQueue>) -> Self {
        Self {
            link_repository,
            click_queue,
        }
    }

    /// Looks up `code` and enqueues a click event for it.
    ///
    /// Returns the link so the caller can redirect to `long_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches; no click is recorded.
    /// Returns [`AppError::Storage`] on storage errors.
    pub async fn resolve(&self, code: &str, client: ClientInfo) -> Result<Link, AppError> {
        let link = self
            .link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))?;

        let event = ClickEvent::new(link.id, client.ip, client.user_agent.as_deref());
        if !self.click_queue.try_enqueue(event) {
            debug!(code, link_id = link.id, "Click not recorded");
        }

        Ok(link)
    }
}
