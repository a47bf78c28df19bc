//! Process-local storage implementing both repository traits.
//!
//! Used by tests and for running the pipeline without a database. Data is
//! lost when the process exits.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use serde_json::json;
use std::collections::HashMap;

use crate::domain::entities::{Click, Link, NewClick, NewLink};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;

#[derive(Default)]
struct LinkTable {
    by_code: HashMap<String, Link>,
    next_id: i64,
}

#[derive(Default)]
struct ClickTable {
    rows: Vec<Click>,
    next_id: i64,
}

/// In-memory link and click storage.
///
/// Enforces the same constraints as the PostgreSQL schema: unique codes
/// (violations are [`AppError::Conflict`]) and clicks referencing an existing
/// link.
#[derive(Default)]
pub struct InMemoryStore {
    links: RwLock<LinkTable>,
    clicks: Mutex<ClickTable>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded click, in insertion order.
    pub fn clicks(&self) -> Vec<Click> {
        self.clicks.lock().rows.clone()
    }
}

#[async_trait]
impl LinkRepository for InMemoryStore {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut table = self.links.write();

        if table.by_code.contains_key(&new_link.code) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "links_code_key", "code": new_link.code }),
            ));
        }

        table.next_id += 1;
        let link = Link::new(table.next_id, new_link.code, new_link.long_url, Utc::now());
        table.by_code.insert(link.code.clone(), link.clone());

        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.links.read().by_code.get(code).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Link>, AppError> {
        let mut links: Vec<Link> = self.links.read().by_code.values().cloned().collect();
        links.sort_by_key(|link| link.id);
        Ok(links)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.links.read().by_code.len() as i64)
    }
}

#[async_trait]
impl ClickRepository for InMemoryStore {
    async fn create(&self, new_click: NewClick) -> Result<Click, AppError> {
        let link_exists = self
            .links
            .read()
            .by_code
            .values()
            .any(|link| link.id == new_click.link_id);

        if !link_exists {
            return Err(AppError::storage(
                "Foreign key violation",
                json!({ "constraint": "link_clicks_link_id_fkey", "link_id": new_click.link_id }),
            ));
        }

        let mut table = self.clicks.lock();
        table.next_id += 1;
        let click = Click::new(
            table.next_id,
            new_click.link_id,
            new_click.clicked_at,
            new_click.user_agent,
            new_click.ip,
        );
        table.rows.push(click.clone());

        Ok(click)
    }

    async fn count_by_link_id(&self, link_id: i64) -> Result<i64, AppError> {
        let count = self
            .clicks
            .lock()
            .rows
            .iter()
            .filter(|click| click.link_id == link_id)
            .count();

        Ok(count as i64)
    }
}
