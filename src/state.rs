//! Shared services wired over one pair of repositories and one click queue.

use std::sync::Arc;

use crate::application::services::{AllocationSettings, LinkService, RedirectService, StatsService};
use crate::domain::click_queue::ClickQueue;
use crate::domain::repositories::{ClickRepository, LinkRepository};

/// Services shared by every entry point (server, admin CLI, tests).
///
/// Cloning is cheap; all fields are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub click_queue: Arc<ClickQueue>,
    pub link_service: Arc<LinkService<dyn LinkRepository>>,
    pub redirect_service: Arc<RedirectService<dyn LinkRepository>>,
    pub stats_service: Arc<StatsService<dyn LinkRepository, dyn ClickRepository>>,
}

impl AppState {
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        click_repository: Arc<dyn ClickRepository>,
        click_queue: Arc<ClickQueue>,
        allocation: AllocationSettings,
    ) -> Self {
        Self {
            link_service: Arc::new(LinkService::new(link_repository.clone(), allocation)),
            redirect_service: Arc::new(RedirectService::new(
                link_repository.clone(),
                click_queue.clone(),
            )),
            stats_service: Arc::new(StatsService::new(link_repository, click_repository)),
            click_queue,
        }
    }
}
